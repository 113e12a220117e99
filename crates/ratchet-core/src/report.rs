//! Test-style reporting contract.
//!
//! Ratchet produces one [`Report`] per processed file and, in batch mode, a
//! single plan announcement before any result. Rendering is left to the
//! [`Reporter`] implementation (TAP, JSON, in-memory).

use serde::Serialize;

/// Outcome of one file, as seen by a reporting sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Report {
    Pass {
        name: String,
    },
    Fail {
        name: String,
        diagnostics: Vec<String>,
    },
    /// Failing, but anticipated: does not break the run.
    ExpectedFail {
        name: String,
        diagnostics: Vec<String>,
        reason: String,
    },
}

impl Report {
    pub fn name(&self) -> &str {
        match self {
            Report::Pass { name } | Report::Fail { name, .. } | Report::ExpectedFail { name, .. } => {
                name
            }
        }
    }

    pub fn diagnostics(&self) -> &[String] {
        match self {
            Report::Pass { .. } => &[],
            Report::Fail { diagnostics, .. } | Report::ExpectedFail { diagnostics, .. } => {
                diagnostics
            }
        }
    }

    /// True for `Fail` only; expected failures do not count.
    pub fn is_hard_failure(&self) -> bool {
        matches!(self, Report::Fail { .. })
    }
}

/// Sink for per-file results.
pub trait Reporter {
    /// Announce how many results will follow.
    fn plan(&mut self, count: usize);

    /// Emit one result.
    fn report(&mut self, report: Report);

    /// Number of hard failures seen so far, from any producer.
    fn hard_failures(&self) -> usize;

    /// True while no hard failure has been reported.
    fn is_passing(&self) -> bool {
        self.hard_failures() == 0
    }

    /// Flush buffered output. Called once after the last result.
    fn finish(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
