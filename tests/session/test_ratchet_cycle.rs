// Multi-run behavior: baseline, regression, improvement, checksum reuse.

use std::fs;
use std::path::{Path, PathBuf};

use ratchet_core::history::{load_history, FileHistory, DEFAULT_HISTORY_FILE};
use ratchet_core::report::Report;
use ratchet_discover::{discover, DiscoverOptions};
use ratchet_enforce::session::{history_key, Session, SessionOptions};
use ratchet_enforce::types::{SessionSummary, Teardown};
use ratchet_output::MemoryReporter;

use crate::common::{create_project, write_file, MarkerEngine};

struct Run {
    ok: bool,
    summary: SessionSummary,
    teardown: Teardown,
    reporter: MemoryReporter,
}

fn lint(root: &Path, files: &[PathBuf], engine: &MarkerEngine, options: SessionOptions) -> Run {
    let mut reporter = MemoryReporter::new();
    let source = FileHistory::new(root.join(DEFAULT_HISTORY_FILE));
    let mut session = Session::start(Box::new(source), engine, &mut reporter, options).unwrap();
    let ok = session.run_all(files);
    let summary = session.summary().clone();
    let teardown = session.finish().unwrap();
    Run {
        ok,
        summary,
        teardown,
        reporter,
    }
}

fn project() -> tempfile::TempDir {
    create_project(&[
        (
            "lib/App.pm",
            "package App;\nopen FH, '<', $f; # VIOLATION bareword\nprint FH 1; # VIOLATION\n1;\n",
        ),
        ("lib/App/Util.pm", "package App::Util;\nuse strict;\n1;\n"),
        ("bin/app", "#!/usr/bin/perl\nmy $x = `ls`; # VIOLATION backticks\n"),
        ("README", "VIOLATION in prose is not linted\n"),
    ])
}

fn sources(root: &Path) -> Vec<PathBuf> {
    discover(
        &[root.join("lib"), root.join("bin")],
        &DiscoverOptions::default(),
    )
    .unwrap()
}

fn report_for<'r>(run: &'r Run, root: &Path, rel: &str) -> &'r Report {
    let name = format!("lint {}", history_key(&root.join(rel)));
    run.reporter
        .report_named(&name)
        .unwrap_or_else(|| panic!("no report named {name}"))
}

#[test]
fn test_first_run_baselines_everything() {
    let dir = project();
    let files = sources(dir.path());
    assert_eq!(files.len(), 3);

    let engine = MarkerEngine::default();
    let run = lint(dir.path(), &files, &engine, SessionOptions::default());
    assert!(run.ok);
    assert_eq!(run.teardown, Teardown::Persisted { files: 3 });
    assert_eq!(run.summary.todo, 2);
    assert_eq!(run.summary.clean, 1);
    assert_eq!(run.reporter.planned(), Some(3));

    let history = load_history(&dir.path().join(DEFAULT_HISTORY_FILE))
        .unwrap()
        .unwrap();
    assert_eq!(history.total_violations(), 3);
    assert_eq!(
        history
            .lookup(&history_key(&dir.path().join("lib/App.pm")))
            .unwrap()
            .count(),
        2
    );
}

#[test]
fn test_regression_then_fix() {
    let dir = project();
    let files = sources(dir.path());
    let engine = MarkerEngine::default();
    lint(dir.path(), &files, &engine, SessionOptions::default());

    // One new violation in a previously clean module.
    write_file(
        dir.path(),
        "lib/App/Util.pm",
        "package App::Util;\nuse strict;\neval $code; # VIOLATION stringy eval\n1;\n",
    );
    let run = lint(dir.path(), &files, &engine, SessionOptions::default());
    assert!(!run.ok);
    assert_eq!(run.summary.regressed, 1);
    assert_eq!(run.summary.improved, 2);
    let util = report_for(&run, dir.path(), "lib/App/Util.pm");
    assert!(util.is_hard_failure());
    assert!(util.diagnostics()[0].ends_with("1 violation(s), history allows 0"));

    // Fixing both App.pm violations is progress, and the rest stays tolerated.
    write_file(dir.path(), "lib/App.pm", "package App;\nuse strict;\n1;\n");
    let run = lint(dir.path(), &files, &engine, SessionOptions::default());
    assert!(run.ok);
    assert!(matches!(
        report_for(&run, dir.path(), "lib/App.pm"),
        Report::Pass { .. }
    ));
}

#[test]
fn test_checksum_reuse_across_runs() {
    let dir = project();
    let files = sources(dir.path());
    let engine = MarkerEngine::default();
    let options = SessionOptions {
        use_checksum: true,
        jobs: 1,
    };

    lint(dir.path(), &files, &engine, options);
    assert_eq!(engine.calls(), 3);

    let run = lint(dir.path(), &files, &engine, options);
    assert!(run.ok);
    assert_eq!(engine.calls(), 3);
    assert_eq!(run.summary.reused, 3);
    // Reused violations are reported exactly as recorded.
    assert_eq!(report_for(&run, dir.path(), "lib/App.pm").diagnostics().len(), 3);

    write_file(dir.path(), "bin/app", "#!/usr/bin/perl\nprint `ls`; # VIOLATION\n");
    let run = lint(dir.path(), &files, &engine, options);
    assert_eq!(engine.calls(), 4);
    assert_eq!(run.summary.reused, 2);
}

#[test]
fn test_history_holds_only_the_latest_file_set() {
    let dir = project();
    let files = sources(dir.path());
    let engine = MarkerEngine::default();
    lint(dir.path(), &files, &engine, SessionOptions::default());

    let lib_only: Vec<PathBuf> = files
        .iter()
        .filter(|p| p.starts_with(dir.path().join("lib")))
        .cloned()
        .collect();
    lint(dir.path(), &lib_only, &engine, SessionOptions::default());

    let history = load_history(&dir.path().join(DEFAULT_HISTORY_FILE))
        .unwrap()
        .unwrap();
    assert_eq!(history.len(), 2);
    assert!(!history.contains(&history_key(&dir.path().join("bin/app"))));
}

#[test]
fn test_unreadable_file_does_not_block_history() {
    let dir = project();
    let mut files = sources(dir.path());
    files.push(dir.path().join("lib/Gone.pm"));
    let engine = MarkerEngine::default();

    let run = lint(dir.path(), &files, &engine, SessionOptions::default());
    assert!(!run.ok);
    assert_eq!(run.summary.failed, 1);
    assert_eq!(run.teardown, Teardown::Persisted { files: 3 });
    assert!(report_for(&run, dir.path(), "lib/Gone.pm").diagnostics()[0].contains("cannot read file"));
}

#[test]
fn test_parallel_jobs_write_same_history() {
    let sequential = project();
    let parallel = project();
    let engine = MarkerEngine::default();

    lint(
        sequential.path(),
        &sources(sequential.path()),
        &engine,
        SessionOptions::default(),
    );
    lint(
        parallel.path(),
        &sources(parallel.path()),
        &engine,
        SessionOptions {
            use_checksum: false,
            jobs: 3,
        },
    );

    let count = |root: &Path| {
        let h = load_history(&root.join(DEFAULT_HISTORY_FILE)).unwrap().unwrap();
        (h.len(), h.total_violations())
    };
    assert_eq!(count(sequential.path()), count(parallel.path()));
    assert!(fs::metadata(parallel.path().join(DEFAULT_HISTORY_FILE)).is_ok());
}
