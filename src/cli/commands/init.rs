//! Initialize a local registry from the remote project.
//!
//! Downloads every version, writes each body to its own file under the
//! output directory, and saves the registry with paths in place of the
//! inline content.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{Error, Result};
use crate::extract::ContentExtractor;
use crate::sync::Downloader;

use super::{GlobalOpts, connect, load_settings, runtime};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InitOutput {
    project: String,
    environment: String,
    registry: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    build_settings: Option<PathBuf>,
    versions: Vec<String>,
    categories: usize,
    docs: usize,
    custom_pages: usize,
    dry_run: bool,
}

/// Execute the init command.
///
/// # Errors
///
/// Returns an error if the config is missing, a registry already exists
/// (without `force`), the remote project cannot be downloaded, or the
/// files cannot be written.
pub fn execute(opts: &GlobalOpts<'_>, production: bool, output: &Path, force: bool) -> Result<()> {
    let settings = load_settings(opts, production)?;
    if settings.registry_path.exists() && !force && !opts.dry_run {
        return Err(Error::AlreadyInitialized {
            path: settings.registry_path,
        });
    }

    let progress = opts.progress();
    progress.header(&format!("Downloading: {}", settings.project_name));

    let transport = connect(&settings)?;
    let mut registry = runtime()?.block_on(async {
        let downloader = Downloader::new(&transport, &settings);
        downloader.remote_registry().await.cloned()
    })?;

    let build_settings = if opts.dry_run {
        None
    } else {
        let extractor = ContentExtractor::new(&settings.base_dir, output);
        let build_settings = extractor.extract(&mut registry)?;
        registry.save(&settings.registry_path)?;
        Some(build_settings)
    };

    let result = InitOutput {
        project: settings.project_name.clone(),
        environment: settings.environment.to_string(),
        registry: settings.registry_path.clone(),
        build_settings,
        versions: registry.versions().iter().map(ToString::to_string).collect(),
        categories: registry.all_doc_categories().len(),
        docs: registry.all_docs().len(),
        custom_pages: registry.all_custom_pages().len(),
        dry_run: opts.dry_run,
    };

    if opts.json {
        println!("{}", serde_json::to_string(&result)?);
        return Ok(());
    }
    if opts.quiet {
        return Ok(());
    }

    if opts.dry_run {
        println!("Would initialize: {}", result.registry.display());
    } else {
        println!("Initialized: {}", result.registry.display());
    }
    println!("  Project:      {} ({})", result.project, result.environment);
    println!("  Versions:     {}", result.versions.join(", "));
    println!("  Categories:   {}", result.categories);
    println!("  Docs:         {}", result.docs);
    println!("  Custom pages: {}", result.custom_pages);
    if let Some(path) = &result.build_settings {
        println!("  Tree:         {}", settings.base_dir.join(path).display());
    }
    Ok(())
}
