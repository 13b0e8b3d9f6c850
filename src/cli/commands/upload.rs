//! Upload command implementation.

use std::path::Path;

use serde::Serialize;
use tracing::warn;

use crate::error::{Error, Result};
use crate::model::{Entry, Resource};
use crate::progress::Progress;
use crate::registry::RegistryBuilder;
use crate::sync::{Downloader, UploadPlan, UploadSummary, Uploader};

use super::{GlobalOpts, connect, load_registry, load_settings, runtime};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadOutput<'a> {
    project: &'a str,
    environment: &'a str,
    dry_run: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    plan: Option<&'a UploadPlan>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<&'a UploadSummary>,
}

/// Execute the upload command.
///
/// # Errors
///
/// Returns an error if the registry cannot be loaded or built, the remote
/// snapshot cannot be fetched, or any resource fails to upload.
pub fn execute(opts: &GlobalOpts<'_>, production: bool, tree: Option<&Path>) -> Result<()> {
    let settings = load_settings(opts, production)?;

    let mut registry = match tree {
        Some(tree) => RegistryBuilder::new()?.build_from_file(&std::path::absolute(tree)?)?,
        None => load_registry(&settings.registry_path)?,
    };
    if registry.project_name() != settings.project_name {
        warn!(
            registry = registry.project_name(),
            configured = %settings.project_name,
            "Registry belongs to another project; uploading to the configured one"
        );
    }

    let progress = opts.progress();
    progress.header(&format!(
        "Uploading: {} ({})",
        settings.project_name, settings.environment
    ));

    let transport = connect(&settings)?;
    let rt = runtime()?;

    if opts.dry_run {
        let plan = rt.block_on(async {
            let downloader = Downloader::new(&transport, &settings);
            Uploader::new(&transport, &downloader, &settings).plan(&registry).await
        })?;

        if opts.json {
            let output = UploadOutput {
                project: &settings.project_name,
                environment: settings.environment.as_str(),
                dry_run: true,
                plan: Some(&plan),
                summary: None,
            };
            println!("{}", serde_json::to_string(&output)?);
        } else if !opts.quiet {
            print_planned("Doc categories", &plan.categories);
            print_planned("Docs", &plan.docs);
            print_planned("Custom pages", &plan.custom_pages);
        }
        return Ok(());
    }

    let summary = rt.block_on(async {
        let downloader = Downloader::new(&transport, &settings);
        Uploader::new(&transport, &downloader, &settings)
            .upload_all(&mut registry)
            .await
    })?;

    // Slugs and ids assigned by the server are kept even on partial failure.
    if tree.is_none() {
        registry.save(&settings.registry_path)?;
    }

    if opts.json {
        let output = UploadOutput {
            project: &settings.project_name,
            environment: settings.environment.as_str(),
            dry_run: false,
            plan: None,
            summary: Some(&summary),
        };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        report(&progress, &summary);
    }

    if summary.is_clean() {
        Ok(())
    } else {
        Err(Error::PartialFailure {
            failed: summary.failed_count(),
            total: summary.total_count(),
        })
    }
}

fn report(progress: &Progress, summary: &UploadSummary) {
    progress.batch("Doc categories", &summary.categories);
    progress.batch("Docs", &summary.docs);
    progress.batch("Custom pages", &summary.custom_pages);
    progress.batch("Custom content", &summary.custom_content);
    progress.orders("Category order", &summary.category_order);
    progress.orders("Doc order", &summary.doc_order);
}

fn print_planned<T: Resource>(title: &str, entries: &[Entry<T>]) {
    println!("{title}:");
    if entries.is_empty() {
        println!("  (none)");
    }
    for entry in entries {
        let verb = entry.method.map_or("SKIP", |m| m.verb());
        println!("  {verb:<6} {entry}");
    }
}
