//! Command implementations.

pub mod clean_remote;
pub mod completions;
pub mod config;
pub mod init;
pub mod status;
pub mod upload;
pub mod version;

use std::path::Path;

use crate::auth;
use crate::config::{Environment, SyncConfig, SyncSettings, resolve_config_path};
use crate::error::{Error, Result};
use crate::progress::Progress;
use crate::registry::Registry;
use crate::transport::HttpTransport;

/// Options every command receives from the global flags.
#[derive(Debug, Clone, Copy)]
pub struct GlobalOpts<'a> {
    pub config: Option<&'a Path>,
    pub json: bool,
    pub quiet: bool,
    pub dry_run: bool,
}

impl GlobalOpts<'_> {
    #[must_use]
    pub const fn progress(&self) -> Progress {
        Progress::new(!self.json && !self.quiet)
    }
}

/// Load the config file and resolve settings for one environment.
fn load_settings(opts: &GlobalOpts<'_>, production: bool) -> Result<SyncSettings> {
    let config_path = resolve_config_path(opts.config);
    SyncConfig::load(&config_path)?.settings(Environment::from_flag(production), &config_path)
}

/// Load the saved registry, pointing at `init` when there is none.
fn load_registry(path: &Path) -> Result<Registry> {
    if !path.exists() {
        return Err(Error::InvalidRegistry(format!(
            "{} not found. Run: docsync init",
            path.display()
        )));
    }
    Registry::load(path)
}

/// Authenticated HTTP transport for the configured host.
fn connect(settings: &SyncSettings) -> Result<HttpTransport> {
    let credential = auth::resolve()?;
    HttpTransport::new(settings.api_base.clone(), credential)
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Error::Other(format!("Failed to create async runtime: {e}")))
}
