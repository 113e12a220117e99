use ratchet_core::types::HistoryError;
use serde::Serialize;

use crate::evaluate::Verdict;

/// Per-file lifecycle. `Recorded` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileState {
    NotStarted,
    Fingerprinted,
    Evaluated,
    Recorded,
    Failed,
}

/// What happened to one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileOutcome {
    /// History key for the file.
    pub path: String,
    pub state: FileState,
    /// `None` when the file failed before evaluation.
    pub verdict: Option<Verdict>,
    /// Violations were taken from history without calling the engine.
    pub reused: bool,
    /// False for hard regressions and infrastructure failures.
    pub ok: bool,
}

impl FileOutcome {
    pub(crate) fn failed(path: String) -> Self {
        Self {
            path,
            state: FileState::Failed,
            verdict: None,
            reused: false,
            ok: false,
        }
    }
}

/// Running counters for a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub files: usize,
    pub clean: usize,
    pub improved: usize,
    pub regressed: usize,
    /// First-run regressions, reported as expected failures.
    pub todo: usize,
    pub failed: usize,
    /// Files whose violations were reused because the content was unchanged.
    pub reused: usize,
}

impl SessionSummary {
    pub(crate) fn record(&mut self, outcome: &FileOutcome) {
        self.files += 1;
        if outcome.reused {
            self.reused += 1;
        }
        match &outcome.verdict {
            None => self.failed += 1,
            Some(Verdict::Clean) => self.clean += 1,
            Some(Verdict::Improved { .. }) => self.improved += 1,
            Some(Verdict::Regressed {
                first_run: true, ..
            }) => self.todo += 1,
            Some(Verdict::Regressed { .. }) => self.regressed += 1,
        }
    }
}

/// Result of session teardown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Teardown {
    /// History was written with this many entries.
    Persisted { files: usize },
    /// History was left untouched.
    Skipped(String),
}

impl Teardown {
    pub fn is_persisted(&self) -> bool {
        matches!(self, Teardown::Persisted { .. })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("cannot load history from {location}: {source}")]
    Load {
        location: String,
        #[source]
        source: HistoryError,
    },

    #[error("cannot persist history to {location}: {source}")]
    Persist {
        location: String,
        #[source]
        source: HistoryError,
    },
}
