use std::io::Write;

use clap::CommandFactory;
use clap_complete::{generate, Shell};

use crate::cli_args::Cli;

/// Run `ratchet completion <shell>`. The shell is already validated by clap.
pub fn run(shell: Shell) -> i32 {
    write_completion(shell, &mut std::io::stdout());
    0
}

/// Write the completion script for `shell`, named after the binary.
fn write_completion(shell: Shell, out: &mut dyn Write) {
    let mut cmd = Cli::command();
    let bin = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin, out);
}
