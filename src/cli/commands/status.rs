//! Status command implementation.
//!
//! Read-only: compares the saved registry with the remote project and
//! lists what an upload would create and what a clean would delete.

use colored::Colorize;
use serde::Serialize;

use crate::error::Result;
use crate::registry::{Diff, Section, SectionKeys};
use crate::sync::Downloader;

use super::{GlobalOpts, connect, load_registry, load_settings, runtime};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusOutput<'a> {
    project: &'a str,
    environment: &'a str,
    in_sync: bool,
    #[serde(flatten)]
    diff: &'a Diff,
}

/// Execute the status command.
///
/// # Errors
///
/// Returns an error if the config or registry is missing or the remote
/// snapshot cannot be fetched.
pub fn execute(opts: &GlobalOpts<'_>, production: bool) -> Result<()> {
    let settings = load_settings(opts, production)?;
    let registry = load_registry(&settings.registry_path)?;

    let transport = connect(&settings)?;
    let diff = runtime()?.block_on(async {
        let downloader = Downloader::new(&transport, &settings);
        downloader.remote_registry().await.map(|remote| registry.diff(remote))
    })?;

    if opts.json {
        let output = StatusOutput {
            project: &settings.project_name,
            environment: settings.environment.as_str(),
            in_sync: diff.is_empty(),
            diff: &diff,
        };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }
    if opts.quiet {
        return Ok(());
    }

    println!(
        "{} {} ({})",
        "Project:".bold(),
        settings.project_name,
        settings.environment
    );
    println!();

    if diff.is_empty() {
        println!("{}", "Local registry matches the remote project.".green());
        return Ok(());
    }

    print_keys("Local only (upload creates)", &diff.added, "+");
    print_keys("Remote only (clean-remote deletes)", &diff.deleted, "-");
    Ok(())
}

fn print_keys(title: &str, keys: &SectionKeys, marker: &str) {
    if keys.is_empty() {
        return;
    }
    println!("{} ({})", title.bold().underline(), keys.len());
    for section in Section::ALL {
        for key in keys.get(section) {
            let line = format!("  {marker} {} {key}", section.kind());
            if marker == "+" {
                println!("{}", line.green());
            } else {
                println!("{}", line.red());
            }
        }
    }
    println!();
}
