use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use ratchet_core::config::DiscoverConfig;

/// Longest first line inspected for a shebang.
const MAX_SHEBANG_LEN: u64 = 256;

/// Decides whether a path is a source file for the configured language.
#[derive(Debug, Clone)]
pub struct SourceDetector {
    extensions: Vec<String>,
    shebang_marker: String,
}

impl Default for SourceDetector {
    fn default() -> Self {
        Self::from_config(&DiscoverConfig::default())
    }
}

impl SourceDetector {
    pub fn new(extensions: Vec<String>, shebang_marker: impl Into<String>) -> Self {
        Self {
            extensions,
            shebang_marker: shebang_marker.into(),
        }
    }

    pub fn from_config(cfg: &DiscoverConfig) -> Self {
        Self::new(cfg.extensions.clone(), cfg.shebang_marker.clone())
    }

    /// True when the extension matches (case-sensitive, so `.PL` and `.pl`
    /// are listed separately) or the first line is a matching shebang.
    pub fn is_source(&self, path: &Path) -> bool {
        if self.has_source_extension(path) {
            return true;
        }
        self.has_source_shebang(path)
    }

    pub fn has_source_extension(&self, path: &Path) -> bool {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => self.extensions.iter().any(|e| e == ext),
            None => false,
        }
    }

    pub fn has_source_shebang(&self, path: &Path) -> bool {
        if self.shebang_marker.is_empty() {
            return false;
        }
        let file = match File::open(path) {
            Ok(f) => f,
            Err(_) => return false,
        };
        let mut first_line = Vec::new();
        let mut reader = BufReader::new(file).take(MAX_SHEBANG_LEN);
        if reader.read_until(b'\n', &mut first_line).is_err() {
            return false;
        }
        first_line.starts_with(b"#!")
            && String::from_utf8_lossy(&first_line).contains(&self.shebang_marker)
    }
}

/// Editor backups and swap files are never linted.
pub fn is_backup_file(path: &Path) -> bool {
    let name = match path.file_name().and_then(|n| n.to_str()) {
        Some(n) => n,
        None => return false,
    };
    name.ends_with('~')
        || name.ends_with(".bak")
        || name.ends_with(".swp")
        || (name.starts_with('#') && name.ends_with('#'))
}
