//! Lint engine seam.
//!
//! The session only needs `critique(path) -> violations`. [`CommandEngine`]
//! satisfies it by running an external linter and treating every non-empty
//! stdout line as one violation.

use std::collections::BTreeMap;
use std::path::Path;
use std::process::Command;

use ratchet_core::config::EngineConfig;
use ratchet_core::types::Violation;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to run '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{program}' exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("unusable engine output: {0}")]
    Output(String),
}

/// Produces the violations for one file.
///
/// Called from worker threads when the session runs with more than one job.
pub trait LintEngine: Send + Sync {
    fn critique(&self, path: &Path) -> Result<Vec<Violation>, EngineError>;

    /// Short name attached to the session's engine log events.
    fn name(&self) -> &str {
        "engine"
    }
}

/// Runs `<program> [--<key> <value>...] [args...] <path>`.
#[derive(Debug, Clone)]
pub struct CommandEngine {
    program: String,
    args: Vec<String>,
    ok_exit_codes: Vec<i32>,
    options: BTreeMap<String, String>,
}

impl CommandEngine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            ok_exit_codes: vec![0],
            options: BTreeMap::new(),
        }
    }

    pub fn from_config(cfg: &EngineConfig) -> Self {
        Self {
            program: cfg.program.clone(),
            args: cfg.args.clone(),
            ok_exit_codes: cfg.ok_exit_codes.clone(),
            options: cfg.options.clone(),
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn with_ok_exit_codes(mut self, codes: Vec<i32>) -> Self {
        self.ok_exit_codes = codes;
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Forwarded options as command-line arguments, in key order.
    /// An empty value forwards the bare flag.
    pub fn option_args(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(self.options.len() * 2);
        for (key, value) in &self.options {
            let flag = if key.starts_with('-') {
                key.clone()
            } else {
                format!("--{}", key)
            };
            out.push(flag);
            if !value.is_empty() {
                out.push(value.clone());
            }
        }
        out
    }
}

impl LintEngine for CommandEngine {
    fn critique(&self, path: &Path) -> Result<Vec<Violation>, EngineError> {
        tracing::debug!(program = %self.program, path = %path.display(), "running lint engine");
        let output = Command::new(&self.program)
            .args(self.option_args())
            .args(&self.args)
            .arg(path)
            .output()
            .map_err(|source| EngineError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let code = output.status.code();
        if !code.is_some_and(|c| self.ok_exit_codes.contains(&c)) {
            return Err(EngineError::Failed {
                program: self.program.clone(),
                status: code.map_or_else(|| "a signal".to_string(), |c| format!("status {}", c)),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8(output.stdout)
            .map_err(|e| EngineError::Output(format!("stdout is not UTF-8: {}", e)))?;
        Ok(parse_violations(&stdout))
    }

    fn name(&self) -> &str {
        &self.program
    }
}

/// One violation per non-empty line. perlcritic's `source OK` line, printed
/// when `--quiet` is absent, is not a violation.
pub fn parse_violations(stdout: &str) -> Vec<Violation> {
    stdout
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty() && !line.ends_with(" source OK"))
        .map(Violation::from)
        .collect()
}
