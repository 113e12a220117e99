//! ratchet CLI -- incremental lint gate.
//!
//! This binary provides the `ratchet` command: `check` lints files and fails
//! only on regressions against the recorded history, `files` lists what would
//! be linted, `history` and `reset` inspect and clear the record. See
//! `ratchet --help` for usage.

use clap::Parser;

mod cli_args;
mod commands;

use cli_args::{Cli, Commands};

/// Environment variable holding a tracing filter directive.
const LOG_ENV: &str = "RATCHET_LOG";

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = cli.config.as_deref();
    let history_file = cli.history_file.as_deref();

    let exit_code = match cli.command {
        Commands::Check {
            paths,
            format,
            overrides,
        } => commands::check::run(config, history_file, paths, format, overrides),
        Commands::Files {
            paths,
            skip_files_like,
        } => commands::files::run(config, paths, skip_files_like),
        Commands::History { json } => commands::history::run(config, history_file, json),
        Commands::Reset { yes } => commands::reset::run(config, history_file, yes),
        Commands::Completion { shell } => commands::completion::run(shell),
    };

    std::process::exit(exit_code);
}

/// Log to stderr. `RATCHET_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .try_init();
}
