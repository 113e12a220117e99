//! Verdicts from violation counts.
//!
//! Only counts are compared. A file that swaps one violation for a different
//! one keeps the same count and is not flagged; "no worse" is acceptable.

use ratchet_core::report::Report;
use ratchet_core::types::{HistoryEntry, Violation};
use serde::Serialize;

/// Expected-failure reason when no history file existed at session start.
pub const FIRST_RUN_REASON: &str = "no history file";

/// Outcome of comparing a file's current violations with its history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    /// No violations.
    Clean,
    /// More violations than recorded (`delta < 0`).
    Regressed {
        delta: i64,
        current: usize,
        prior: usize,
        /// No baseline existed yet, so the regression is expected.
        first_run: bool,
    },
    /// Same or fewer violations than recorded (`delta >= 0`), but not zero.
    Improved {
        delta: i64,
        current: usize,
        prior: usize,
    },
}

/// How a verdict is surfaced to the reporting sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    Pass,
    Fail,
    ExpectedFail(String),
}

impl Verdict {
    /// False only for a regression against a real baseline.
    pub fn is_ok(&self) -> bool {
        !matches!(
            self,
            Verdict::Regressed {
                first_run: false,
                ..
            }
        )
    }

    /// `prior - current`; zero for `Clean`.
    pub fn delta(&self) -> i64 {
        match self {
            Verdict::Clean => 0,
            Verdict::Regressed { delta, .. } | Verdict::Improved { delta, .. } => *delta,
        }
    }

    pub fn disposition(&self) -> Disposition {
        match self {
            Verdict::Clean => Disposition::Pass,
            Verdict::Regressed {
                first_run: true, ..
            } => Disposition::ExpectedFail(FIRST_RUN_REASON.to_string()),
            Verdict::Regressed { .. } => Disposition::Fail,
            Verdict::Improved { current, .. } => {
                Disposition::ExpectedFail(format!("{} violation(s) left to fix", current))
            }
        }
    }
}

/// Violation count recorded for a file; zero when the file has no entry.
pub fn prior_count(prior: Option<&HistoryEntry>) -> usize {
    prior.map_or(0, HistoryEntry::count)
}

/// Compare `current` against the recorded entry.
///
/// - zero current violations is always `Clean`
/// - `delta = prior_count - current`; negative is `Regressed`, otherwise `Improved`
/// - a file without an entry has a baseline of zero
pub fn evaluate(current: &[Violation], prior: Option<&HistoryEntry>, first_run: bool) -> Verdict {
    if current.is_empty() {
        return Verdict::Clean;
    }
    let prior = prior_count(prior);
    let delta = prior as i64 - current.len() as i64;
    if delta < 0 {
        Verdict::Regressed {
            delta,
            current: current.len(),
            prior,
            first_run,
        }
    } else {
        Verdict::Improved {
            delta,
            current: current.len(),
            prior,
        }
    }
}

/// Diagnostic lines for a verdict: a header, then every current violation.
pub fn diagnostics(path: &str, verdict: &Verdict, violations: &[Violation]) -> Vec<String> {
    let header = match verdict {
        Verdict::Clean => return Vec::new(),
        Verdict::Regressed {
            current,
            first_run: true,
            ..
        } => format!(
            "{}: {} violation(s) recorded as the starting baseline",
            path, current
        ),
        Verdict::Regressed { current, prior, .. } => format!(
            "{}: {} violation(s), history allows {}",
            path, current, prior
        ),
        Verdict::Improved {
            current, delta: 0, ..
        } => format!("{}: {} violation(s) remaining (same as last run)", path, current),
        Verdict::Improved { current, delta, .. } => format!(
            "{}: {} violation(s) remaining ({} fewer than last run)",
            path, current, delta
        ),
    };
    let mut lines = Vec::with_capacity(violations.len() + 1);
    lines.push(header);
    lines.extend(violations.iter().map(|v| format!("  {}", v)));
    lines
}

/// Build the report for a verdict.
pub fn to_report(name: String, path: &str, verdict: &Verdict, violations: &[Violation]) -> Report {
    match verdict.disposition() {
        Disposition::Pass => Report::Pass { name },
        Disposition::Fail => Report::Fail {
            name,
            diagnostics: diagnostics(path, verdict, violations),
        },
        Disposition::ExpectedFail(reason) => Report::ExpectedFail {
            name,
            diagnostics: diagnostics(path, verdict, violations),
            reason,
        },
    }
}
