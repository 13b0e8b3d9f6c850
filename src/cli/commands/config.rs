//! Config command implementation.

use std::path::PathBuf;

use serde::Serialize;

use crate::config::{SyncConfig, resolve_config_path};
use crate::error::{Error, Result};

use super::GlobalOpts;

#[derive(Serialize)]
struct ConfigOutput<'a> {
    path: PathBuf,
    created: bool,
    dry_run: bool,
    config: &'a SyncConfig,
}

/// Values passed on the command line; `None` keeps the stored value.
#[derive(Debug, Default)]
pub struct ConfigArgs {
    pub staging: Option<String>,
    pub production: Option<String>,
    pub api_base: Option<String>,
    pub concurrency: Option<usize>,
}

/// Create or update the config file.
///
/// # Errors
///
/// Returns an error if the existing file cannot be parsed, an argument is
/// invalid, or the file cannot be written.
pub fn execute(opts: &GlobalOpts<'_>, args: ConfigArgs) -> Result<()> {
    let path = resolve_config_path(opts.config);
    let created = !path.exists();

    let mut config = SyncConfig::load_or_default(&path)?;
    config.merge(args.staging, args.production, args.api_base);
    if let Some(concurrency) = args.concurrency {
        if concurrency == 0 {
            return Err(Error::InvalidArgument(
                "--concurrency must be at least 1".to_string(),
            ));
        }
        config.concurrency = Some(concurrency);
    }

    if !opts.dry_run {
        config.save(&path)?;
    }

    if opts.json {
        let output = ConfigOutput {
            path,
            created,
            dry_run: opts.dry_run,
            config: &config,
        };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }
    if opts.quiet {
        return Ok(());
    }

    let verb = match (opts.dry_run, created) {
        (true, true) => "Would create",
        (true, false) => "Would update",
        (false, true) => "Created",
        (false, false) => "Updated",
    };
    println!("{verb} config: {}", path.display());
    println!(
        "  Staging:    {}",
        config.project_names.staging.as_deref().unwrap_or("(not set)")
    );
    println!(
        "  Production: {}",
        config.project_names.production.as_deref().unwrap_or("(not set)")
    );
    if let Some(api_base) = &config.api_base {
        println!("  API base:   {api_base}");
    }
    if let Some(concurrency) = config.concurrency {
        println!("  Concurrency: {concurrency}");
    }
    Ok(())
}
