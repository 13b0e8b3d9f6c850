//! Shell completions command implementation.

use std::io;

use clap::CommandFactory;
use clap_complete::{Generator, generate, shells};

use crate::cli::{Cli, Shell};
use crate::error::Result;

/// Write completions for `shell` to stdout.
pub fn execute(shell: &Shell) -> Result<()> {
    match shell {
        Shell::Bash => print(shells::Bash),
        Shell::Zsh => print(shells::Zsh),
        Shell::Fish => print(shells::Fish),
        Shell::PowerShell => print(shells::PowerShell),
        Shell::Elvish => print(shells::Elvish),
    }
    Ok(())
}

fn print(generator: impl Generator) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(generator, &mut cmd, name, &mut io::stdout());
}
