/// Shared test helpers for all ratchet integration tests.
///
/// Import from any integration test file with:
///   `#[path = "common/mod.rs"] mod common;`
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::atomic::{AtomicUsize, Ordering};

use ratchet_core::types::Violation;
use ratchet_enforce::engine::{EngineError, LintEngine};
use tempfile::TempDir;

/// Lines containing this marker count as violations.
pub const MARKER: &str = "VIOLATION";

/// Create a project directory from `(relative_path, content)` pairs.
///
/// Hold the TempDir to keep the directory alive.
#[allow(dead_code)]
pub fn create_project(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (path, content) in files {
        write_file(dir.path(), path, content);
    }
    dir
}

#[allow(dead_code)]
pub fn write_file(root: &Path, path: &str, content: &str) {
    let full = root.join(path);
    if let Some(parent) = full.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&full, content).unwrap();
}

/// In-process lint engine: one violation per line containing [`MARKER`].
#[derive(Default)]
pub struct MarkerEngine {
    calls: AtomicUsize,
}

#[allow(dead_code)]
impl MarkerEngine {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl LintEngine for MarkerEngine {
    fn critique(&self, path: &Path) -> Result<Vec<Violation>, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let content = fs::read_to_string(path).map_err(|e| EngineError::Output(e.to_string()))?;
        Ok(content
            .lines()
            .enumerate()
            .filter(|(_, line)| line.contains(MARKER))
            .map(|(i, line)| Violation::new(format!("{}:{}:1: {}", path.display(), i + 1, line.trim())))
            .collect())
    }

    fn name(&self) -> &str {
        "marker"
    }
}

/// `.ratchet.json` that lints with `grep` for [`MARKER`] instead of perlcritic.
#[allow(dead_code)]
pub fn marker_engine_config() -> serde_json::Value {
    serde_json::json!({
        "engine": {
            "program": "sh",
            "args": ["-c", format!("grep -n {} \"$0\" || true", MARKER)],
            "ok_exit_codes": [0]
        }
    })
}

/// Get path to compiled ratchet binary.
///
/// Builds the binary if it doesn't exist yet.
#[allow(dead_code)]
pub fn ratchet_bin() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove 'deps'
    path.push("ratchet");
    if !path.exists() {
        let status = Command::new("cargo")
            .args(["build", "-p", "ratchet-cli"])
            .status()
            .expect("Failed to build ratchet");
        assert!(status.success(), "Failed to build ratchet binary");
    }
    path
}

/// Run `ratchet <args>` in `dir` with a clean environment for ratchet settings.
#[allow(dead_code)]
pub fn run_ratchet(dir: &Path, args: &[&str]) -> Output {
    Command::new(ratchet_bin())
        .args(args)
        .current_dir(dir)
        .env_remove("RATCHET_CONFIG")
        .env_remove("RATCHET_HISTORY_FILE")
        .env_remove("RATCHET_LOG")
        .output()
        .unwrap()
}
