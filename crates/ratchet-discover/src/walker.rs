use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use ratchet_core::config::{ConfigError, RatchetConfig};
use regex::Regex;

use crate::detect::{is_backup_file, SourceDetector};

/// Version-control directories skipped even when they are not hidden.
const VCS_DIRS: &[&str] = &["CVS", "RCS", "_darcs", "SCCS"];

/// Per-project ignore file, in `.gitignore` syntax.
pub const IGNORE_FILE: &str = ".ratchetignore";

#[derive(Debug, thiserror::Error)]
pub enum DiscoverError {
    #[error("no such file or directory: {}", .0.display())]
    NotFound(PathBuf),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// What to collect and what to leave out.
#[derive(Debug, Clone, Default)]
pub struct DiscoverOptions {
    pub detector: SourceDetector,
    /// Paths whose string form matches are excluded.
    pub skip: Option<Regex>,
}

impl DiscoverOptions {
    pub fn from_config(cfg: &RatchetConfig) -> Result<Self, DiscoverError> {
        Ok(Self {
            detector: SourceDetector::from_config(&cfg.discover),
            skip: cfg.skip_pattern()?,
        })
    }

    fn is_skipped(&self, path: &Path) -> bool {
        match &self.skip {
            Some(re) => re.is_match(&path.to_string_lossy()),
            None => false,
        }
    }
}

/// Roots used when none are given: `blib` if present, else `lib`, else `.`.
pub fn default_roots(base: &Path) -> Vec<PathBuf> {
    for candidate in ["blib", "lib"] {
        if base.join(candidate).is_dir() {
            return vec![PathBuf::from(candidate)];
        }
    }
    vec![PathBuf::from(".")]
}

/// Collect source files under `roots`.
///
/// A root that is a file is taken as-is, without classification. Directory
/// roots are walked, skipping hidden entries, VCS directories, backup files,
/// and anything listed in `.gitignore` / `.ratchetignore`. The exclusion
/// pattern applies to every result. Output is sorted and de-duplicated.
pub fn discover(roots: &[PathBuf], opts: &DiscoverOptions) -> Result<Vec<PathBuf>, DiscoverError> {
    let mut found = BTreeSet::new();

    for root in roots {
        if root.is_file() {
            if !opts.is_skipped(root) {
                found.insert(root.clone());
            }
            continue;
        }
        if !root.is_dir() {
            return Err(DiscoverError::NotFound(root.clone()));
        }

        let walker = WalkBuilder::new(root)
            .hidden(true)
            .git_ignore(true)
            .git_global(false)
            .git_exclude(true)
            .add_custom_ignore_filename(IGNORE_FILE)
            .filter_entry(|entry| {
                let is_vcs_dir = entry.file_type().is_some_and(|ft| ft.is_dir())
                    && entry
                        .file_name()
                        .to_str()
                        .is_some_and(|name| VCS_DIRS.contains(&name));
                !is_vcs_dir
            })
            .build();

        for result in walker {
            let entry = match result {
                Ok(e) => e,
                Err(e) => {
                    tracing::debug!(error = %e, "skipping unreadable entry");
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }
            let path = entry.into_path();
            if is_backup_file(&path) || opts.is_skipped(&path) {
                continue;
            }
            if opts.detector.is_source(&path) {
                found.insert(path);
            }
        }
    }

    tracing::debug!(files = found.len(), "discovered source files");
    Ok(found.into_iter().collect())
}
