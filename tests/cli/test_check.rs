// Tests for `ratchet check` -- runs the binary against a project with a grep-based engine.

use std::fs;

use crate::common::{create_project, marker_engine_config, run_ratchet, write_file};

fn project() -> tempfile::TempDir {
    let dir = create_project(&[
        ("lib/App.pm", "package App;\nopen FH, $f; # VIOLATION\n1;\n"),
        ("lib/App/Clean.pm", "package App::Clean;\n1;\n"),
    ]);
    fs::write(
        dir.path().join(".ratchet.json"),
        marker_engine_config().to_string(),
    )
    .unwrap();
    dir
}

#[test]
fn test_first_run_passes_with_todo() {
    let dir = project();
    let out = run_ratchet(dir.path(), &["check"]);
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert_eq!(out.status.code(), Some(0), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert!(stdout.starts_with("1..2\n"), "stdout: {stdout}");
    // Paths sort by component, so `lib/App/` precedes `lib/App.pm`.
    assert!(stdout.contains("ok 1 - lint lib/App/Clean.pm\n"));
    assert!(stdout.contains("not ok 2 - lint lib/App.pm # TODO no history file"));
    assert!(dir.path().join(".ratchet-history.json").exists());
}

#[test]
fn test_regression_fails_the_run() {
    let dir = project();
    run_ratchet(dir.path(), &["check"]);
    write_file(
        dir.path(),
        "lib/App/Clean.pm",
        "package App::Clean;\nprint `id`; # VIOLATION\n1;\n",
    );
    let out = run_ratchet(dir.path(), &["check"]);
    let stdout = String::from_utf8_lossy(&out.stdout);
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert_eq!(out.status.code(), Some(1));
    assert!(stdout.contains("not ok 1 - lint lib/App/Clean.pm\n"));
    assert!(stderr.contains("lib/App/Clean.pm: 1 violation(s), history allows 0"));
    assert!(stderr.contains("1 regressed"));
}

#[test]
fn test_json_format() {
    let dir = project();
    let out = run_ratchet(dir.path(), &["check", "--format", "json"]);
    assert_eq!(out.status.code(), Some(0));
    let doc: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(doc["plan"], 2);
    assert_eq!(doc["summary"]["todo"], 1);
    assert_eq!(doc["results"][1]["name"], "lint lib/App.pm");
    assert_eq!(doc["results"][1]["status"], "expected_fail");
}

#[test]
fn test_explicit_file_argument() {
    let dir = project();
    let out = run_ratchet(dir.path(), &["check", "lib/App/Clean.pm"]);
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert_eq!(out.status.code(), Some(0));
    assert_eq!(stdout, "1..1\nok 1 - lint lib/App/Clean.pm\n");
}

#[test]
fn test_history_file_override() {
    let dir = project();
    let out = run_ratchet(dir.path(), &["check", "--history-file", "ci/baseline.json"]);
    assert_eq!(out.status.code(), Some(0));
    assert!(dir.path().join("ci/baseline.json").exists());
    assert!(!dir.path().join(".ratchet-history.json").exists());
}

#[test]
fn test_corrupt_history_exits_before_plan() {
    let dir = project();
    fs::write(dir.path().join(".ratchet-history.json"), "not json").unwrap();
    let out = run_ratchet(dir.path(), &["check"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(out.stdout.is_empty());
    assert!(String::from_utf8_lossy(&out.stderr).contains("corrupt"));
    assert_eq!(
        fs::read_to_string(dir.path().join(".ratchet-history.json")).unwrap(),
        "not json"
    );
}

#[test]
fn test_missing_engine_is_per_file_failure() {
    let dir = project();
    let out = run_ratchet(
        dir.path(),
        &["check", "--engine", "ratchet-test-no-such-linter"],
    );
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("lint engine failed"));
    assert!(stderr.contains("2 failed"));
}

#[test]
fn test_invalid_config_exits_2() {
    let dir = project();
    fs::write(dir.path().join(".ratchet.json"), "{ broken").unwrap();
    let out = run_ratchet(dir.path(), &["check"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).starts_with("ratchet check: failed to parse"));
}

#[test]
fn test_invalid_skip_pattern_exits_2() {
    let dir = project();
    let out = run_ratchet(dir.path(), &["check", "--skip-files-like", "(unclosed"]);
    assert_eq!(out.status.code(), Some(2));
}
