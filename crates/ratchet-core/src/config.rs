//! Configuration file loading for ratchet.
//!
//! Reads `.ratchet.json` from the working directory and provides typed access
//! to all settings. A missing file yields defaults; a file that exists but
//! cannot be parsed is an error, since running with a silently different
//! history location would mask regressions.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::history::DEFAULT_HISTORY_FILE;

/// Config file name looked up in the working directory.
pub const CONFIG_FILE: &str = ".ratchet.json";

/// Top-level ratchet configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatchetConfig {
    /// Regex; discovered paths matching it are not linted.
    #[serde(default, alias = "skipFilesLike")]
    pub skip_files_like: Option<String>,
    /// Reuse recorded violations for files whose content digest is unchanged.
    #[serde(default, alias = "useChecksum")]
    pub use_checksum: bool,
    /// History location, relative to the working directory.
    #[serde(default, alias = "historyFile")]
    pub history_file: Option<String>,
    /// Worker threads for fingerprinting and engine calls.
    #[serde(default = "default_jobs")]
    pub jobs: usize,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub discover: DiscoverConfig,
}

/// External lint engine invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_program")]
    pub program: String,
    #[serde(default = "default_args")]
    pub args: Vec<String>,
    /// Exit codes that mean "ran fine" (with or without violations).
    #[serde(default = "default_ok_exit_codes")]
    pub ok_exit_codes: Vec<i32>,
    /// Forwarded to the engine untouched, as `--<key> <value>`.
    #[serde(default)]
    pub options: BTreeMap<String, String>,
}

/// Source-file classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoverConfig {
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    /// Substring looked for in a `#!` first line.
    #[serde(default = "default_shebang_marker")]
    pub shebang_marker: String,
}

fn default_jobs() -> usize {
    1
}
fn default_program() -> String {
    "perlcritic".to_string()
}
fn default_args() -> Vec<String> {
    ["--quiet", "--nocolor", "--verbose", "%f:%l:%c: %m [%p]\\n"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
fn default_ok_exit_codes() -> Vec<i32> {
    vec![0, 2]
}
fn default_extensions() -> Vec<String> {
    ["PL", "pl", "pm", "t"].iter().map(|s| s.to_string()).collect()
}
fn default_shebang_marker() -> String {
    "perl".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: default_args(),
            ok_exit_codes: default_ok_exit_codes(),
            options: BTreeMap::new(),
        }
    }
}

impl Default for DiscoverConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            shebang_marker: default_shebang_marker(),
        }
    }
}

impl Default for RatchetConfig {
    fn default() -> Self {
        Self {
            skip_files_like: None,
            use_checksum: false,
            history_file: None,
            jobs: default_jobs(),
            engine: EngineConfig::default(),
            discover: DiscoverConfig::default(),
        }
    }
}

/// Errors from loading or interpreting configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid skip_files_like pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid engine option '{0}': expected key=value")]
    EngineOption(String),
}

impl RatchetConfig {
    /// Load `.ratchet.json` from `dir`. Returns defaults if the file doesn't exist.
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        Self::load_file(&dir.join(CONFIG_FILE))
    }

    /// Load configuration from an explicit path. Returns defaults if the
    /// file doesn't exist.
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file; using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Resolve the history file location against `base`.
    pub fn history_path(&self, base: &Path) -> PathBuf {
        let file = self
            .history_file
            .as_deref()
            .filter(|f| !f.is_empty())
            .unwrap_or(DEFAULT_HISTORY_FILE);
        base.join(file)
    }

    /// Compile the exclusion pattern, if one is configured.
    pub fn skip_pattern(&self) -> Result<Option<Regex>, ConfigError> {
        match self.skip_files_like.as_deref() {
            None | Some("") => Ok(None),
            Some(pattern) => Regex::new(pattern)
                .map(Some)
                .map_err(|source| ConfigError::Pattern {
                    pattern: pattern.to_string(),
                    source,
                }),
        }
    }

    /// Effective worker count, never zero.
    pub fn effective_jobs(&self) -> usize {
        self.jobs.max(1)
    }
}

/// Split a `key=value` engine option.
pub fn parse_engine_option(raw: &str) -> Result<(String, String), ConfigError> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(ConfigError::EngineOption(raw.to_string())),
    }
}
