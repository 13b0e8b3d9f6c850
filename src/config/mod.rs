//! Configuration management.
//!
//! Project-level settings live in `syncConfig.json` next to the registry:
//!
//! ```json
//! {
//!   "projectNames": { "production": "acme", "staging": "acme-staging" },
//!   "apiBase": "https://dash.readme.io",
//!   "concurrency": 15,
//!   "registryPath": "syncRegistry.json"
//! }
//! ```
//!
//! The file is read once per command and turned into a [`SyncSettings`]
//! value that the downloader, uploader and cleaner receive explicitly.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::transport::batch::DEFAULT_CONCURRENCY;
use crate::transport::http::DEFAULT_API_BASE;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "syncConfig.json";

/// Default registry file name, relative to the config file.
pub const REGISTRY_FILE: &str = "syncRegistry.json";

/// Which of the two configured projects a command targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub const fn from_flag(production: bool) -> Self {
        if production {
            Self::Production
        } else {
            Self::Staging
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Staging => "staging",
            Self::Production => "production",
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectNames {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub production: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staging: Option<String>,
}

/// Contents of `syncConfig.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncConfig {
    #[serde(default)]
    pub project_names: ProjectNames,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,

    /// Maximum requests in flight per phase.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry_path: Option<PathBuf>,
}

impl SyncConfig {
    /// Load the config file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotInitialized`] if the file does not exist, or
    /// [`Error::Config`] if it cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::NotInitialized {
                path: path.to_path_buf(),
            });
        }

        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config file: {e}")))?;

        serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config file: {e}")))
    }

    /// Load the config file, or start from defaults when it is absent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if an existing file cannot be parsed.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Err(Error::NotInitialized { .. }) => Ok(Self::default()),
            other => other,
        }
    }

    /// Save the config file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("Failed to create config directory: {e}")))?;
        }

        let mut content = serde_json::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {e}")))?;
        content.push('\n');

        fs::write(path, content)
            .map_err(|e| Error::Config(format!("Failed to write config file: {e}")))?;

        debug!(path = %path.display(), "Config saved");
        Ok(())
    }

    /// Merge command-line values over the stored ones.
    pub fn merge(
        &mut self,
        staging: Option<String>,
        production: Option<String>,
        api_base: Option<String>,
    ) {
        if staging.is_some() {
            self.project_names.staging = staging;
        }
        if production.is_some() {
            self.project_names.production = production;
        }
        if api_base.is_some() {
            self.api_base = api_base;
        }
    }

    #[must_use]
    pub fn project_name(&self, env: Environment) -> Option<&str> {
        match env {
            Environment::Staging => self.project_names.staging.as_deref(),
            Environment::Production => self.project_names.production.as_deref(),
        }
        .filter(|name| !name.trim().is_empty())
    }

    /// Resolve the explicit settings for one environment.
    ///
    /// Relative paths are taken relative to the directory holding the
    /// config file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if no project is configured for `env`,
    /// or the concurrency limit is zero.
    pub fn settings(&self, env: Environment, config_path: &Path) -> Result<SyncSettings> {
        let project_name = self.project_name(env).ok_or_else(|| {
            Error::Config(format!(
                "no {env} project name in {} (set it with `docsync config --{env} <slug>`)",
                config_path.display()
            ))
        })?;

        let concurrency = self.concurrency.unwrap_or(DEFAULT_CONCURRENCY);
        if concurrency == 0 {
            return Err(Error::Config("concurrency must be at least 1".to_string()));
        }

        let base_dir = config_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);

        let registry_path = base_dir.join(
            self.registry_path
                .clone()
                .unwrap_or_else(|| PathBuf::from(REGISTRY_FILE)),
        );

        Ok(SyncSettings {
            project_name: project_name.to_string(),
            environment: env,
            api_base: self
                .api_base
                .clone()
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            concurrency,
            registry_path,
            base_dir,
        })
    }
}

/// Everything a sync run needs to know, resolved up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSettings {
    pub project_name: String,
    pub environment: Environment,
    pub api_base: String,
    pub concurrency: usize,
    pub registry_path: PathBuf,
    /// Directory that relative content paths are resolved against.
    pub base_dir: PathBuf,
}

impl SyncSettings {
    /// Settings for tests and embedders that bypass the config file.
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            project_name: project_name.into(),
            environment: Environment::Staging,
            api_base: DEFAULT_API_BASE.to_string(),
            concurrency: DEFAULT_CONCURRENCY,
            registry_path: PathBuf::from(REGISTRY_FILE),
            base_dir: PathBuf::from("."),
        }
    }

    #[must_use]
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Resolve a content path stored in the registry.
    #[must_use]
    pub fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}

/// Config path from the `--config` flag (or its env var), else the default.
#[must_use]
pub fn resolve_config_path(flag: Option<&Path>) -> PathBuf {
    flag.map_or_else(|| PathBuf::from(CONFIG_FILE), Path::to_path_buf)
}
