//! Source file discovery for ratchet.
//!
//! Turns the roots given on the command line into the list of files to lint:
//! - [`detect`] — Classifies a path as source by extension or `#!` shebang
//! - [`walker`] — Walks directory roots, applies the exclusion pattern

pub mod detect;
pub mod walker;

pub use detect::SourceDetector;
pub use walker::{default_roots, discover, DiscoverError, DiscoverOptions};
