use std::path::{Path, PathBuf};

use ratchet_core::history::FileHistory;
use ratchet_core::report::Reporter;
use ratchet_discover::{discover, DiscoverOptions};
use ratchet_enforce::engine::CommandEngine;
use ratchet_enforce::session::{Session, SessionOptions};
use ratchet_enforce::types::{SessionSummary, Teardown};
use ratchet_output::{JsonReporter, TapReporter};

use super::Workspace;
use crate::cli_args::{OutputFormat, RunOverrides};

/// Run `ratchet check` -- lint discovered files and gate on regressions.
///
/// Exit codes: 0 when no file regressed, 1 when at least one did (or a file
/// could not be linted), 2 for configuration, history, or output errors.
pub fn run(
    config: Option<&Path>,
    history_file: Option<&str>,
    paths: Vec<PathBuf>,
    format: OutputFormat,
    overrides: RunOverrides,
) -> i32 {
    let mut ws = match Workspace::open("check", config, history_file) {
        Ok(ws) => ws,
        Err(code) => return code,
    };
    if let Err(e) = overrides.apply(&mut ws.config) {
        eprintln!("ratchet check: {}", e);
        return 2;
    }

    let opts = match DiscoverOptions::from_config(&ws.config) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("ratchet check: {}", e);
            return 2;
        }
    };
    let roots = ws.roots(paths);
    let files: Vec<PathBuf> = match discover(&roots, &opts) {
        Ok(found) => found.into_iter().map(|p| ws.relative(p)).collect(),
        Err(e) => {
            eprintln!("ratchet check: {}", e);
            return 2;
        }
    };
    tracing::debug!(files = files.len(), "files to lint");

    let engine = CommandEngine::from_config(&ws.config.engine);
    let source = FileHistory::new(ws.history_path());
    let options = SessionOptions::from_config(&ws.config);

    match format {
        OutputFormat::Tap => {
            let mut reporter = TapReporter::stdio();
            execute(&mut reporter, source, &engine, &files, options, true)
        }
        OutputFormat::Json => {
            let mut reporter = JsonReporter::stdout();
            execute(&mut reporter, source, &engine, &files, options, false)
        }
    }
}

fn execute(
    reporter: &mut dyn Reporter,
    source: FileHistory,
    engine: &CommandEngine,
    files: &[PathBuf],
    options: SessionOptions,
    print_summary: bool,
) -> i32 {
    let mut session = match Session::start(Box::new(source), engine, &mut *reporter, options) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("ratchet check: {}", e);
            return 2;
        }
    };
    let all_ok = session.run_all(files);
    let summary = session.summary().clone();
    let teardown = session.finish();

    if let Err(e) = reporter.finish() {
        eprintln!("ratchet check: failed to write results: {}", e);
        return 2;
    }
    if print_summary {
        eprintln!("ratchet check: {}", summary_line(&summary));
    }
    match teardown {
        Ok(Teardown::Persisted { files }) => {
            tracing::info!(files, "history updated");
        }
        Ok(Teardown::Skipped(reason)) => {
            eprintln!("ratchet check: history not updated: {}", reason);
        }
        Err(e) => {
            eprintln!("ratchet check: {}", e);
            return 2;
        }
    }

    if all_ok {
        0
    } else {
        1
    }
}

fn summary_line(s: &SessionSummary) -> String {
    let mut line = format!(
        "{} file(s): {} clean, {} improved, {} regressed",
        s.files, s.clean, s.improved, s.regressed
    );
    if s.todo > 0 {
        line.push_str(&format!(", {} baselined", s.todo));
    }
    if s.failed > 0 {
        line.push_str(&format!(", {} failed", s.failed));
    }
    if s.reused > 0 {
        line.push_str(&format!(" ({} unchanged, not re-linted)", s.reused));
    }
    line
}
