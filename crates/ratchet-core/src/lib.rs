//! Core types, history persistence, and configuration for ratchet.
//!
//! This crate provides the foundational pieces shared by every ratchet crate:
//! - [`types`] — Violations, history entries, the in-memory [`History`](types::History) map
//! - [`fingerprint`] — Content digests used to skip re-analysis of unchanged files
//! - [`store`] — The [`HistorySource`](store::HistorySource) trait and an in-memory implementation
//! - [`history`] — JSON file-backed history with atomic overwrite
//! - [`report`] — The [`Reporter`](report::Reporter) contract for test-style result sinks
//! - [`config`] — Configuration loading from `.ratchet.json`

pub mod config;
pub mod fingerprint;
pub mod history;
pub mod report;
pub mod store;
pub mod types;
