use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A single violation as reported by the lint engine.
///
/// The text (message, location, policy name) is owned by the engine. Ratchet
/// never interprets it: violation lists are compared by length only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Violation(String);

impl Violation {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Violation {
    fn from(text: &str) -> Self {
        Self(text.to_string())
    }
}

impl From<String> for Violation {
    fn from(text: String) -> Self {
        Self(text)
    }
}

/// Last-known lint result for one file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HistoryEntry {
    pub violations: Vec<Violation>,
    /// Digest of the file content the violations were recorded against.
    /// Empty when unknown.
    #[serde(default)]
    pub fingerprint: String,
}

impl HistoryEntry {
    pub fn new(violations: Vec<Violation>, fingerprint: impl Into<String>) -> Self {
        Self {
            violations,
            fingerprint: fingerprint.into(),
        }
    }

    /// Number of recorded violations.
    pub fn count(&self) -> usize {
        self.violations.len()
    }

    /// True when this entry was recorded against content with the given digest.
    /// An unknown (empty) fingerprint never matches.
    pub fn matches_fingerprint(&self, fingerprint: &str) -> bool {
        !self.fingerprint.is_empty() && self.fingerprint == fingerprint
    }
}

/// Mapping from file path to its last-known result.
///
/// Keys are unique by path string. Iteration order is sorted by path, which
/// keeps the persisted file stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    entries: BTreeMap<String, HistoryEntry>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, path: &str) -> Option<&HistoryEntry> {
        self.entries.get(path)
    }

    /// Write or overwrite the entry for `path`, returning the previous one.
    pub fn record(&mut self, path: impl Into<String>, entry: HistoryEntry) -> Option<HistoryEntry> {
        self.entries.insert(path.into(), entry)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, HistoryEntry> {
        self.entries.iter()
    }

    /// Sum of violation counts across all files.
    pub fn total_violations(&self) -> usize {
        self.entries.values().map(HistoryEntry::count).sum()
    }

    pub(crate) fn from_map(entries: BTreeMap<String, HistoryEntry>) -> Self {
        Self { entries }
    }

    pub(crate) fn as_map(&self) -> &BTreeMap<String, HistoryEntry> {
        &self.entries
    }
}

impl FromIterator<(String, HistoryEntry)> for History {
    fn from_iter<I: IntoIterator<Item = (String, HistoryEntry)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = (&'a String, &'a HistoryEntry);
    type IntoIter = btree_map::Iter<'a, String, HistoryEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Errors raised while reading, fingerprinting, or writing history.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("history file {} is corrupt: {reason}", .path.display())]
    Corrupt { path: PathBuf, reason: String },

    #[error("failed to write history to {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize history: {0}")]
    Serialize(#[from] serde_json::Error),
}
