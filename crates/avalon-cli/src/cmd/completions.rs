use clap::CommandFactory;

use crate::Cli;

/// Write shell completions for the given shell to stdout.
pub fn completions(shell: clap_complete::Shell) {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "avalon", &mut std::io::stdout());
}
