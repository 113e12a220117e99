//! Enforcement for ratchet: decides, per file, whether the current lint
//! result is an improvement, a regression, or first contact.
//!
//! - [`evaluate`] — Verdicts from current vs. recorded violation counts
//! - [`engine`] — The [`LintEngine`](engine::LintEngine) seam and an external-command adapter
//! - [`session`] — Loads history, processes files, reports, persists once at teardown
//! - [`types`] — Per-file outcomes, session summary, errors

pub mod types;
pub mod evaluate;
pub mod engine;
pub mod session;
