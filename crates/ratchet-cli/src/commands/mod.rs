pub mod check;
pub mod completion;
pub mod files;
pub mod history;
pub mod reset;

use std::path::{Path, PathBuf};

use ratchet_core::config::{RatchetConfig, CONFIG_FILE};

/// Working directory plus its loaded configuration.
pub(crate) struct Workspace {
    pub root: PathBuf,
    pub config: RatchetConfig,
}

impl Workspace {
    /// Resolve the working directory and load configuration.
    ///
    /// Errors are printed as `ratchet <cmd>: ...`; the `Err` value is the
    /// exit code.
    pub(crate) fn open(
        cmd: &str,
        config: Option<&Path>,
        history_file: Option<&str>,
    ) -> Result<Self, i32> {
        let root = match std::env::current_dir() {
            Ok(p) => p,
            Err(e) => {
                eprintln!("ratchet {}: failed to get current directory: {}", cmd, e);
                return Err(2);
            }
        };
        let config_path = match config {
            Some(p) => root.join(p),
            None => root.join(CONFIG_FILE),
        };
        let mut config = match RatchetConfig::load_file(&config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("ratchet {}: {}", cmd, e);
                return Err(2);
            }
        };
        if let Some(file) = history_file {
            config.history_file = Some(file.to_string());
        }
        tracing::debug!(root = %root.display(), config = %config_path.display(), "workspace opened");
        Ok(Self { root, config })
    }

    pub(crate) fn history_path(&self) -> PathBuf {
        self.config.history_path(&self.root)
    }

    /// Roots to discover from: the given paths, or the default roots.
    pub(crate) fn roots(&self, paths: Vec<PathBuf>) -> Vec<PathBuf> {
        if paths.is_empty() {
            ratchet_discover::default_roots(&self.root)
        } else {
            paths
        }
    }

    /// Express `path` relative to the working directory when it lies inside it,
    /// so history keys do not depend on how the path was spelled.
    pub(crate) fn relative(&self, path: PathBuf) -> PathBuf {
        match path.strip_prefix(&self.root) {
            Ok(rel) if !rel.as_os_str().is_empty() => rel.to_path_buf(),
            _ => path,
        }
    }
}
