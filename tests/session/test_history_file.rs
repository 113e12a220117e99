// On-disk history behavior seen through a session.

use std::fs;

use ratchet_core::history::{FileHistory, DEFAULT_HISTORY_FILE};
use ratchet_core::types::HistoryError;
use ratchet_enforce::session::{history_key, Session, SessionOptions};
use ratchet_enforce::types::{SessionError, Teardown};
use ratchet_output::MemoryReporter;

use crate::common::{create_project, MarkerEngine};

#[test]
fn test_document_is_versioned_and_sorted() {
    let dir = create_project(&[
        ("lib/Z.pm", "1; # VIOLATION\n"),
        ("lib/A.pm", "1;\n"),
    ]);
    let engine = MarkerEngine::default();
    let mut reporter = MemoryReporter::new();
    let history_path = dir.path().join(DEFAULT_HISTORY_FILE);
    let mut session = Session::start(
        Box::new(FileHistory::new(&history_path)),
        &engine,
        &mut reporter,
        SessionOptions::default(),
    )
    .unwrap();
    session.run_all(&[dir.path().join("lib/Z.pm"), dir.path().join("lib/A.pm")]);
    session.finish().unwrap();

    let raw = fs::read_to_string(&history_path).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(doc["version"], 1);
    let keys: Vec<&String> = doc["files"].as_object().unwrap().keys().collect();
    let a = history_key(&dir.path().join("lib/A.pm"));
    let z = history_key(&dir.path().join("lib/Z.pm"));
    assert_eq!(keys, vec![&a, &z]);
    assert_eq!(doc["files"][&z]["violations"].as_array().unwrap().len(), 1);
    assert_eq!(doc["files"][&a]["fingerprint"].as_str().unwrap().len(), 64);
}

#[test]
fn test_unversioned_document_is_not_a_baseline() {
    let dir = create_project(&[("lib/A.pm", "1; # VIOLATION\n")]);
    let key = history_key(&dir.path().join("lib/A.pm"));
    let mut files = serde_json::Map::new();
    files.insert(
        key,
        serde_json::json!({ "violations": ["old one"], "fingerprint": "" }),
    );
    let doc = serde_json::json!({ "files": serde_json::Value::Object(files) }).to_string();
    let history_path = dir.path().join(DEFAULT_HISTORY_FILE);
    fs::write(&history_path, &doc).unwrap();

    let engine = MarkerEngine::default();
    let mut reporter = MemoryReporter::new();
    let result = Session::start(
        Box::new(FileHistory::new(&history_path)),
        &engine,
        &mut reporter,
        SessionOptions::default(),
    );
    let corrupt = matches!(
        result,
        Err(SessionError::Load {
            source: HistoryError::Corrupt { .. },
            ..
        })
    );
    drop(result);
    assert!(corrupt);
    assert_eq!(engine.calls(), 0);
    assert_eq!(fs::read_to_string(&history_path).unwrap(), doc);
}

#[test]
fn test_corrupt_history_is_fatal_and_preserved() {
    let dir = create_project(&[("lib/A.pm", "1;\n")]);
    let history_path = dir.path().join(DEFAULT_HISTORY_FILE);
    fs::write(&history_path, "{\"version\": 1, \"files\": [").unwrap();

    let engine = MarkerEngine::default();
    let mut reporter = MemoryReporter::new();
    let result = Session::start(
        Box::new(FileHistory::new(&history_path)),
        &engine,
        &mut reporter,
        SessionOptions::default(),
    );
    let corrupt = matches!(
        result,
        Err(SessionError::Load {
            source: HistoryError::Corrupt { .. },
            ..
        })
    );
    drop(result);
    assert!(corrupt);
    assert!(reporter.events().is_empty());
    assert_eq!(
        fs::read_to_string(&history_path).unwrap(),
        "{\"version\": 1, \"files\": ["
    );
}

#[test]
fn test_unhealthy_session_keeps_previous_bytes() {
    let dir = create_project(&[("lib/A.pm", "1; # VIOLATION\n")]);
    let history_path = dir.path().join(DEFAULT_HISTORY_FILE);
    let engine = MarkerEngine::default();

    let mut first = MemoryReporter::new();
    let mut session = Session::start(
        Box::new(FileHistory::new(&history_path)),
        &engine,
        &mut first,
        SessionOptions::default(),
    )
    .unwrap();
    session.run_all(&[dir.path().join("lib/A.pm")]);
    session.finish().unwrap();
    let before = fs::read(&history_path).unwrap();

    fs::write(dir.path().join("lib/A.pm"), "1;\n").unwrap();
    let mut second = MemoryReporter::new();
    let mut session = Session::start(
        Box::new(FileHistory::new(&history_path)),
        &engine,
        &mut second,
        SessionOptions::default(),
    )
    .unwrap();
    session.run_all(&[dir.path().join("lib/A.pm")]);
    session.mark_unhealthy("upstream build failed");
    assert!(matches!(session.finish().unwrap(), Teardown::Skipped(_)));

    assert_eq!(fs::read(&history_path).unwrap(), before);
}
