//! CLI definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

/// docsync - Keep a hosted documentation project in sync with local files
#[derive(Parser, Debug)]
#[command(name = "docsync", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file path (default: ./syncConfig.json)
    #[arg(long, global = true, env = "DOCSYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Show what would be sent without contacting the write endpoints
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download the remote project into local files and a registry
    Init {
        /// Use the production project instead of staging
        #[arg(long)]
        production: bool,

        /// Directory the content tree is written to
        #[arg(long, default_value = ".")]
        output: PathBuf,

        /// Overwrite an existing registry
        #[arg(long)]
        force: bool,
    },

    /// Push the local registry to the remote project
    Upload {
        /// Use the production project instead of staging
        #[arg(long)]
        production: bool,

        /// Build the registry from a content tree described by this
        /// build-settings file instead of the saved registry
        #[arg(long)]
        tree: Option<PathBuf>,
    },

    /// Create or update the config file
    Config {
        /// Staging project slug
        #[arg(long)]
        staging: Option<String>,

        /// Production project slug
        #[arg(long)]
        production: Option<String>,

        /// API base URL
        #[arg(long)]
        api_base: Option<String>,

        /// Maximum requests in flight per phase
        #[arg(long)]
        concurrency: Option<usize>,
    },

    /// Delete remote resources the local registry no longer tracks
    CleanRemote {
        /// Use the production project instead of staging
        #[arg(long)]
        production: bool,

        /// Also delete resources that exist only locally
        #[arg(long)]
        aggressive: bool,
    },

    /// Show what differs between the local registry and the remote project
    Status {
        /// Use the production project instead of staging
        #[arg(long)]
        production: bool,
    },

    /// Print version information
    Version,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "docsync",
            "clean-remote",
            "--aggressive",
            "--dry-run",
            "-vv",
            "--config",
            "site/syncConfig.json",
        ]);
        assert!(cli.dry_run);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, Some(PathBuf::from("site/syncConfig.json")));
        assert!(matches!(
            cli.command,
            Commands::CleanRemote {
                production: false,
                aggressive: true
            }
        ));
    }
}
