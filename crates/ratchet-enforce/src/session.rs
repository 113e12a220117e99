//! Session controller.
//!
//! A [`Session`] loads the prior history once, processes files one at a time
//! (or fans fingerprinting and engine calls out over a worker pool), reports
//! one result per file, and persists the accumulated results exactly once at
//! teardown, when the session is healthy.
//!
//! Teardown happens in [`Session::finish`]. A session dropped without
//! `finish` runs the same gated teardown, unless the thread is unwinding.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use ratchet_core::config::RatchetConfig;
use ratchet_core::fingerprint::fingerprint_file;
use ratchet_core::report::{Report, Reporter};
use ratchet_core::store::HistorySource;
use ratchet_core::types::{History, HistoryEntry, HistoryError, Violation};

use crate::engine::{EngineError, LintEngine};
use crate::evaluate::{evaluate, to_report};
use crate::types::{FileOutcome, FileState, SessionError, SessionSummary, Teardown};

/// Knobs that change how files are processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    /// Reuse recorded violations when the content fingerprint is unchanged.
    pub use_checksum: bool,
    /// Worker threads for `run_all`; 1 processes files strictly in sequence.
    pub jobs: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            use_checksum: false,
            jobs: 1,
        }
    }
}

impl SessionOptions {
    pub fn from_config(cfg: &RatchetConfig) -> Self {
        Self {
            use_checksum: cfg.use_checksum,
            jobs: cfg.effective_jobs(),
        }
    }
}

/// History key for a path: forward slashes, no leading `./`.
pub fn history_key(path: &Path) -> String {
    let raw = path.to_string_lossy().replace('\\', "/");
    let mut key = raw.as_str();
    while let Some(rest) = key.strip_prefix("./") {
        key = rest;
    }
    key.to_string()
}

/// Test name reported for a file.
pub fn test_name(key: &str) -> String {
    format!("lint {}", key)
}

/// Result of the side-effect-free half of per-file processing.
enum Analysis {
    Ready {
        violations: Vec<Violation>,
        fingerprint: String,
        reused: bool,
    },
    Unreadable(HistoryError),
    EngineFailed(EngineError),
}

/// Read-only view shared with worker threads.
struct Analyzer<'s> {
    prior: Option<&'s History>,
    engine: &'s dyn LintEngine,
    use_checksum: bool,
}

impl Analyzer<'_> {
    fn analyze(&self, path: &Path, key: &str) -> Analysis {
        let fingerprint = match fingerprint_file(path) {
            Ok(fp) => fp,
            Err(e) => return Analysis::Unreadable(e),
        };
        tracing::trace!(path = key, state = ?FileState::Fingerprinted, "file transition");

        if self.use_checksum {
            if let Some(entry) = self.prior.and_then(|h| h.lookup(key)) {
                if entry.matches_fingerprint(&fingerprint) {
                    tracing::debug!(path = key, "content unchanged; reusing recorded violations");
                    return Analysis::Ready {
                        violations: entry.violations.clone(),
                        fingerprint,
                        reused: true,
                    };
                }
            }
        }

        tracing::debug!(path = key, engine = self.engine.name(), "running lint engine");
        match self.engine.critique(path) {
            Ok(violations) => Analysis::Ready {
                violations,
                fingerprint,
                reused: false,
            },
            Err(e) => {
                tracing::debug!(path = key, engine = self.engine.name(), error = %e, "lint engine failed");
                Analysis::EngineFailed(e)
            }
        }
    }
}

/// One lint run over a set of files.
pub struct Session<'a> {
    source: Box<dyn HistorySource + Send + 'a>,
    engine: &'a dyn LintEngine,
    reporter: &'a mut dyn Reporter,
    options: SessionOptions,
    prior: Option<History>,
    current: History,
    /// Hard failures this session reported itself.
    own_hard_failures: usize,
    unhealthy: Option<String>,
    summary: SessionSummary,
    finished: bool,
}

impl<'a> Session<'a> {
    /// Load prior history and open a session.
    ///
    /// A missing store starts a first run. A store that exists but cannot be
    /// decoded aborts before any file is processed.
    pub fn start(
        source: Box<dyn HistorySource + Send + 'a>,
        engine: &'a dyn LintEngine,
        reporter: &'a mut dyn Reporter,
        options: SessionOptions,
    ) -> Result<Self, SessionError> {
        let prior = source.load().map_err(|e| SessionError::Load {
            location: source.location(),
            source: e,
        })?;
        match &prior {
            Some(h) => {
                tracing::debug!(location = %source.location(), files = h.len(), "loaded history")
            }
            None => tracing::info!(location = %source.location(), "no history file; first run"),
        }
        Ok(Self {
            source,
            engine,
            reporter,
            options,
            prior,
            current: History::new(),
            own_hard_failures: 0,
            unhealthy: None,
            summary: SessionSummary::default(),
            finished: false,
        })
    }

    /// True when no history existed at session start.
    pub fn is_first_run(&self) -> bool {
        self.prior.is_none()
    }

    /// Results accumulated so far; this is what teardown persists.
    pub fn current(&self) -> &History {
        &self.current
    }

    pub fn summary(&self) -> &SessionSummary {
        &self.summary
    }

    /// Veto persistence for this session.
    pub fn mark_unhealthy(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        tracing::debug!(%reason, "session marked unhealthy");
        self.unhealthy.get_or_insert(reason);
    }

    /// Why teardown would skip persistence, if it would.
    ///
    /// Failures this session reported (regressions, unreadable files, engine
    /// errors) do not count; only failures from other producers sharing the
    /// reporter do.
    pub fn unhealthy_reason(&self) -> Option<String> {
        if let Some(reason) = &self.unhealthy {
            return Some(reason.clone());
        }
        let foreign = self
            .reporter
            .hard_failures()
            .saturating_sub(self.own_hard_failures);
        if foreign > 0 {
            return Some(format!(
                "{} failure(s) reported outside this session",
                foreign
            ));
        }
        None
    }

    pub fn is_healthy(&self) -> bool {
        self.unhealthy_reason().is_none()
    }

    /// Process one file without announcing a plan.
    pub fn run_file(&mut self, path: &Path) -> FileOutcome {
        let key = history_key(path);
        let analysis = self.analyzer().analyze(path, &key);
        self.conclude(key, analysis)
    }

    /// Announce the plan, then process every path in order.
    ///
    /// Returns true when every file is ok. With `jobs > 1`, fingerprinting
    /// and engine calls run on a worker pool first; results are still
    /// evaluated, recorded and reported in input order.
    pub fn run_all(&mut self, paths: &[PathBuf]) -> bool {
        self.reporter.plan(paths.len());
        let keys: Vec<String> = paths.iter().map(|p| history_key(p)).collect();

        let analyses = if self.options.jobs > 1 && paths.len() > 1 {
            self.analyze_parallel(paths, &keys)
        } else {
            None
        };

        let mut all_ok = true;
        match analyses {
            Some(analyses) => {
                for (key, analysis) in keys.into_iter().zip(analyses) {
                    all_ok &= self.conclude(key, analysis).ok;
                }
            }
            None => {
                for (path, key) in paths.iter().zip(keys) {
                    let analysis = self.analyzer().analyze(path, &key);
                    all_ok &= self.conclude(key, analysis).ok;
                }
            }
        }
        all_ok
    }

    /// Persist once if healthy and anything was processed, then close.
    pub fn finish(mut self) -> Result<Teardown, SessionError> {
        self.teardown()
    }

    fn analyzer(&self) -> Analyzer<'_> {
        Analyzer {
            prior: self.prior.as_ref(),
            engine: self.engine,
            use_checksum: self.options.use_checksum,
        }
    }

    /// `None` when the pool cannot be built; the caller falls back to
    /// sequential processing.
    fn analyze_parallel(&self, paths: &[PathBuf], keys: &[String]) -> Option<Vec<Analysis>> {
        let pool = match rayon::ThreadPoolBuilder::new()
            .num_threads(self.options.jobs)
            .build()
        {
            Ok(pool) => pool,
            Err(e) => {
                tracing::warn!(error = %e, "cannot start worker pool; running sequentially");
                return None;
            }
        };
        tracing::debug!(jobs = self.options.jobs, files = paths.len(), "analyzing in parallel");
        let analyzer = self.analyzer();
        Some(pool.install(|| {
            paths
                .par_iter()
                .zip(keys.par_iter())
                .map(|(path, key)| analyzer.analyze(path, key))
                .collect()
        }))
    }

    fn conclude(&mut self, key: String, analysis: Analysis) -> FileOutcome {
        let name = test_name(&key);
        let outcome = match analysis {
            Analysis::Unreadable(err) => {
                let detail = match &err {
                    HistoryError::Io { source, .. } => source.to_string(),
                    other => other.to_string(),
                };
                self.report_failure(name, format!("{}: cannot read file: {}", key, detail));
                FileOutcome::failed(key)
            }
            Analysis::EngineFailed(err) => {
                self.report_failure(name, format!("{}: lint engine failed: {}", key, err));
                FileOutcome::failed(key)
            }
            Analysis::Ready {
                violations,
                fingerprint,
                reused,
            } => {
                let first_run = self.is_first_run();
                let prior = self.prior.as_ref().and_then(|h| h.lookup(&key));
                let verdict = evaluate(&violations, prior, first_run);
                tracing::trace!(path = %key, state = ?FileState::Evaluated, "file transition");

                let report = to_report(name, &key, &verdict, &violations);
                self.current
                    .record(key.clone(), HistoryEntry::new(violations, fingerprint));
                self.emit(report);
                FileOutcome {
                    path: key,
                    state: FileState::Recorded,
                    ok: verdict.is_ok(),
                    verdict: Some(verdict),
                    reused,
                }
            }
        };
        tracing::debug!(path = %outcome.path, state = ?outcome.state, ok = outcome.ok, "file done");
        self.summary.record(&outcome);
        outcome
    }

    fn report_failure(&mut self, name: String, message: String) {
        tracing::warn!("{}", message);
        self.emit(Report::Fail {
            name,
            diagnostics: vec![message],
        });
    }

    fn emit(&mut self, report: Report) {
        if report.is_hard_failure() {
            self.own_hard_failures += 1;
        }
        self.reporter.report(report);
    }

    fn teardown(&mut self) -> Result<Teardown, SessionError> {
        self.finished = true;
        if let Some(reason) = self.unhealthy_reason() {
            tracing::info!(%reason, "history not persisted");
            return Ok(Teardown::Skipped(reason));
        }
        if self.current.is_empty() {
            let reason = "no files were processed".to_string();
            tracing::debug!(%reason, "history not persisted");
            return Ok(Teardown::Skipped(reason));
        }
        self.source
            .persist(&self.current)
            .map_err(|e| SessionError::Persist {
                location: self.source.location(),
                source: e,
            })?;
        tracing::debug!(
            location = %self.source.location(),
            files = self.current.len(),
            "history persisted"
        );
        Ok(Teardown::Persisted {
            files: self.current.len(),
        })
    }
}

impl Drop for Session<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        if std::thread::panicking() {
            tracing::warn!("session dropped while panicking; history not persisted");
            return;
        }
        if let Err(e) = self.teardown() {
            tracing::warn!(error = %e, "persisting history on drop failed");
        }
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
