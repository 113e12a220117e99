use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use ratchet_core::config::{parse_engine_option, ConfigError, RatchetConfig};

#[derive(Parser, Debug)]
#[command(
    name = "ratchet",
    version,
    about = "Incremental lint gate: fail only when a file gets worse than last time"
)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: .ratchet.json in the working directory)
    #[arg(long, global = true, env = "RATCHET_CONFIG")]
    pub config: Option<PathBuf>,

    /// History file location, overriding the config
    #[arg(long, global = true, env = "RATCHET_HISTORY_FILE")]
    pub history_file: Option<String>,

    /// Log debug events to stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Lint files and compare against the recorded history
    Check {
        /// Files or directories (default: blib, else lib, else .)
        paths: Vec<PathBuf>,
        /// Result format written to stdout
        #[arg(long, value_enum, default_value_t = OutputFormat::Tap)]
        format: OutputFormat,
        #[command(flatten)]
        overrides: RunOverrides,
    },

    /// List the files `check` would lint
    Files {
        /// Files or directories (default: blib, else lib, else .)
        paths: Vec<PathBuf>,
        /// Exclude paths matching this regex
        #[arg(long)]
        skip_files_like: Option<String>,
    },

    /// Show the recorded history
    History {
        /// Print the raw history document
        #[arg(long)]
        json: bool,
    },

    /// Delete the history file; the next check is a first run
    Reset {
        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum OutputFormat {
    Tap,
    Json,
}

/// Flags that override `.ratchet.json` for one `check` run.
#[derive(Args, Debug, Default, Clone)]
pub(crate) struct RunOverrides {
    /// Reuse recorded violations for files whose content is unchanged
    #[arg(long)]
    pub use_checksum: bool,
    /// Exclude paths matching this regex
    #[arg(long)]
    pub skip_files_like: Option<String>,
    /// Worker threads for engine calls
    #[arg(long, short = 'j')]
    pub jobs: Option<usize>,
    /// Lint engine program
    #[arg(long)]
    pub engine: Option<String>,
    /// Engine argument (repeatable; replaces the configured arguments)
    #[arg(long = "engine-arg", value_name = "ARG", allow_hyphen_values = true)]
    pub engine_args: Vec<String>,
    /// Engine option forwarded as --KEY VALUE (repeatable)
    #[arg(long = "engine-option", value_name = "KEY=VALUE")]
    pub engine_options: Vec<String>,
}

impl RunOverrides {
    pub(crate) fn apply(&self, cfg: &mut RatchetConfig) -> Result<(), ConfigError> {
        if self.use_checksum {
            cfg.use_checksum = true;
        }
        if let Some(pattern) = &self.skip_files_like {
            cfg.skip_files_like = Some(pattern.clone());
        }
        if let Some(jobs) = self.jobs {
            cfg.jobs = jobs;
        }
        if let Some(program) = &self.engine {
            cfg.engine.program = program.clone();
        }
        if !self.engine_args.is_empty() {
            cfg.engine.args = self.engine_args.clone();
        }
        for raw in &self.engine_options {
            let (key, value) = parse_engine_option(raw)?;
            cfg.engine.options.insert(key, value);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "cli_args_tests.rs"]
mod tests;
