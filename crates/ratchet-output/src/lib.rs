//! Reporting sinks for ratchet results.
//!
//! Provides three [`Reporter`](ratchet_core::report::Reporter) implementations:
//! - **TAP** (default): Test Anything Protocol, readable by `prove` and CI harnesses
//! - **JSON** (`--format json`): One structured document written at the end
//! - **Memory**: Keeps every event for inspection by tests and embedders

pub mod json;
pub mod memory;
pub mod tap;

pub use json::JsonReporter;
pub use memory::MemoryReporter;
pub use tap::TapReporter;
