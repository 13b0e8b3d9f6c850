//! Clean-remote command implementation.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::ResourceKey;
use crate::registry::Section;
use crate::sync::{CleanReport, Cleaner, Downloader};

use super::{GlobalOpts, connect, load_registry, load_settings, runtime};

#[derive(Serialize)]
struct Candidate {
    section: Section,
    #[serde(flatten)]
    key: ResourceKey,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CleanOutput<'a> {
    project: &'a str,
    aggressive: bool,
    dry_run: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    candidates: Option<Vec<Candidate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<&'a CleanReport>,
}

/// Execute the clean-remote command.
///
/// Only versions present in the local registry are examined.
///
/// # Errors
///
/// Returns an error if the registry cannot be loaded, the remote snapshot
/// cannot be fetched, or any delete fails.
pub fn execute(opts: &GlobalOpts<'_>, production: bool, aggressive: bool) -> Result<()> {
    let settings = load_settings(opts, production)?;
    let registry = load_registry(&settings.registry_path)?;

    let progress = opts.progress();
    progress.header(&format!(
        "Cleaning: {} ({})",
        settings.project_name, settings.environment
    ));

    let transport = connect(&settings)?;
    let rt = runtime()?;
    let versions = registry.versions();

    if opts.dry_run {
        let candidates = rt.block_on(async {
            let downloader =
                Downloader::new(&transport, &settings).with_versions(versions.iter().copied());
            Cleaner::new(&transport, &downloader, &settings)
                .aggressive(aggressive)
                .candidates(&registry)
                .await
        })?;

        if opts.json {
            let output = CleanOutput {
                project: &settings.project_name,
                aggressive,
                dry_run: true,
                candidates: Some(
                    candidates
                        .into_iter()
                        .map(|(section, key)| Candidate { section, key })
                        .collect(),
                ),
                report: None,
            };
            println!("{}", serde_json::to_string(&output)?);
        } else if !opts.quiet {
            if candidates.is_empty() {
                println!("Nothing to delete.");
            }
            for (section, key) in &candidates {
                println!("  Would delete {} {key}", section.kind());
            }
        }
        return Ok(());
    }

    let report = rt.block_on(async {
        let downloader =
            Downloader::new(&transport, &settings).with_versions(versions.iter().copied());
        Cleaner::new(&transport, &downloader, &settings)
            .aggressive(aggressive)
            .clean_all(&registry)
            .await
    })?;

    if opts.json {
        let output = CleanOutput {
            project: &settings.project_name,
            aggressive,
            dry_run: false,
            candidates: None,
            report: Some(&report),
        };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        progress.deletes("Deleted", &report.deleted);
    }

    match report.failed_count() {
        0 => Ok(()),
        failed => Err(Error::PartialFailure {
            failed,
            total: report.deleted.len(),
        }),
    }
}
