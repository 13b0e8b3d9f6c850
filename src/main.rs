//! docsync CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use docsync::cli::commands::{self, GlobalOpts};
use docsync::cli::commands::config::ConfigArgs;
use docsync::cli::{Cli, Commands};
use docsync::error::Error;

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.json {
                eprintln!("{}", e.to_structured_json());
            } else if !cli.quiet {
                if let Some(hint) = e.hint() {
                    eprintln!("Error: {e}\n  Hint: {hint}");
                } else {
                    eprintln!("Error: {e}");
                }
            }
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    if quiet {
        return;
    }

    // RUST_LOG wins over -v
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug,hyper=info,reqwest=info"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn run(cli: &Cli) -> Result<(), Error> {
    let opts = GlobalOpts {
        config: cli.config.as_deref(),
        json: cli.json,
        quiet: cli.quiet,
        dry_run: cli.dry_run,
    };

    match &cli.command {
        Commands::Init {
            production,
            output,
            force,
        } => commands::init::execute(&opts, *production, output, *force),
        Commands::Upload { production, tree } => {
            commands::upload::execute(&opts, *production, tree.as_deref())
        }
        Commands::Config {
            staging,
            production,
            api_base,
            concurrency,
        } => commands::config::execute(
            &opts,
            ConfigArgs {
                staging: staging.clone(),
                production: production.clone(),
                api_base: api_base.clone(),
                concurrency: *concurrency,
            },
        ),
        Commands::CleanRemote {
            production,
            aggressive,
        } => commands::clean_remote::execute(&opts, *production, *aggressive),
        Commands::Status { production } => commands::status::execute(&opts, *production),
        Commands::Version => commands::version::execute(cli.json),
        Commands::Completions { shell } => commands::completions::execute(shell),
    }
}
