//! File-backed history store.
//!
//! History lives in a single JSON document (default `.ratchet-history.json`
//! in the working directory):
//!
//! ```json
//! { "version": 1, "files": { "lib/Foo.pm": { "violations": ["..."], "fingerprint": "..." } } }
//! ```
//!
//! A missing file is the normal first-run condition and loads as `None`.
//! Writes go to a sibling temporary file that is renamed over the target, so
//! an interrupted write never leaves a truncated store behind.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::store::HistorySource;
use crate::types::{History, HistoryEntry, HistoryError};

/// Default history file name, relative to the working directory.
pub const DEFAULT_HISTORY_FILE: &str = ".ratchet-history.json";

/// Current on-disk format version.
pub const HISTORY_FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct HistoryDocumentRef<'a> {
    version: u32,
    files: &'a BTreeMap<String, HistoryEntry>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct HistoryDocument {
    version: u32,
    files: BTreeMap<String, HistoryEntry>,
}

/// Decode a history document. `path` is only used for error messages.
///
/// Anything that is not a versioned document of entries is `Corrupt`; a
/// foreign JSON file must never be mistaken for an empty baseline.
pub fn decode_history(content: &str, path: &Path) -> Result<History, HistoryError> {
    let corrupt = |reason: String| HistoryError::Corrupt {
        path: path.to_path_buf(),
        reason,
    };
    let doc: HistoryDocument = match serde_json::from_str(content) {
        Ok(doc) => doc,
        Err(e) if e.is_syntax() || e.is_eof() => return Err(corrupt(e.to_string())),
        Err(e) => return Err(corrupt(format!("not a ratchet history document: {}", e))),
    };
    if doc.version != HISTORY_FORMAT_VERSION {
        return Err(corrupt(format!(
            "unsupported history format version {} (expected {})",
            doc.version, HISTORY_FORMAT_VERSION
        )));
    }
    Ok(History::from_map(doc.files))
}

/// Encode a history document as pretty JSON, files sorted by path.
pub fn encode_history(history: &History) -> Result<String, HistoryError> {
    let doc = HistoryDocumentRef {
        version: HISTORY_FORMAT_VERSION,
        files: history.as_map(),
    };
    let mut json = serde_json::to_string_pretty(&doc)?;
    json.push('\n');
    Ok(json)
}

/// Load history from `path`. Returns `Ok(None)` when the file does not exist.
pub fn load_history(path: &Path) -> Result<Option<History>, HistoryError> {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no history file; first run");
            return Ok(None);
        }
        Err(source) => {
            return Err(HistoryError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    let history = decode_history(&content, path)?;
    tracing::debug!(path = %path.display(), files = history.len(), "loaded history");
    Ok(Some(history))
}

/// Overwrite `path` with `history`.
///
/// The document is written to `<name>.tmp-<pid>` next to the target and then
/// renamed into place.
pub fn persist_history(path: &Path, history: &History) -> Result<(), HistoryError> {
    let write_err = |source| HistoryError::Write {
        path: path.to_path_buf(),
        source,
    };
    let json = encode_history(history)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
    }

    let tmp_path = temp_path_for(path);
    if let Err(e) = fs::write(&tmp_path, json) {
        let _ = fs::remove_file(&tmp_path);
        return Err(write_err(e));
    }
    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(write_err(e));
    }
    tracing::debug!(path = %path.display(), files = history.len(), "persisted history");
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "history".to_string());
    path.with_file_name(format!("{}.tmp-{}", name, std::process::id()))
}

/// History stored in a JSON file on disk.
#[derive(Debug, Clone)]
pub struct FileHistory {
    path: PathBuf,
}

impl FileHistory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistorySource for FileHistory {
    fn load(&self) -> Result<Option<History>, HistoryError> {
        load_history(&self.path)
    }

    fn persist(&mut self, history: &History) -> Result<(), HistoryError> {
        persist_history(&self.path, history)
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
#[path = "history_tests.rs"]
mod tests;
