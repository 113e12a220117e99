use std::sync::{Arc, Mutex, MutexGuard};

use crate::types::{History, HistoryError};

/// Durable location for per-file lint history.
///
/// A session loads once at start and persists at most once at teardown.
/// Implementations never merge: `persist` replaces whatever was stored.
pub trait HistorySource {
    /// Load the persisted history.
    ///
    /// `Ok(None)` means nothing was ever persisted (first run). A store that
    /// exists but cannot be decoded must return `HistoryError::Corrupt`.
    fn load(&self) -> Result<Option<History>, HistoryError>;

    /// Replace the persisted history with `history`.
    fn persist(&mut self, history: &History) -> Result<(), HistoryError>;

    /// Human-readable location, used in messages.
    fn location(&self) -> String;
}

#[derive(Debug, Default)]
struct MemoryState {
    stored: Option<History>,
    persist_count: usize,
}

/// In-memory history source.
///
/// Clones share the same state, so a caller can hand one clone to a session
/// and inspect what was persisted through another.
#[derive(Debug, Clone, Default)]
pub struct MemoryHistory {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryHistory {
    /// An empty source: loading yields `None` (first run).
    pub fn new() -> Self {
        Self::default()
    }

    /// A source that already holds `history`.
    pub fn with_history(history: History) -> Self {
        let source = Self::default();
        source.lock().stored = Some(history);
        source
    }

    /// The currently persisted history, if any.
    pub fn snapshot(&self) -> Option<History> {
        self.lock().stored.clone()
    }

    /// How many times `persist` has been called.
    pub fn persist_count(&self) -> usize {
        self.lock().persist_count
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl HistorySource for MemoryHistory {
    fn load(&self) -> Result<Option<History>, HistoryError> {
        Ok(self.lock().stored.clone())
    }

    fn persist(&mut self, history: &History) -> Result<(), HistoryError> {
        let mut state = self.lock();
        state.stored = Some(history.clone());
        state.persist_count += 1;
        Ok(())
    }

    fn location(&self) -> String {
        "<memory>".to_string()
    }
}
