//! Builds a [`Registry`] from the live host.
//!
//! One downloader serves one command: the uploader and cleaner share it
//! so the remote snapshot is fetched at most once. Raw section payloads
//! are memoized by `(project, version, section)`; [`Downloader::invalidate`]
//! drops every cached value.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::config::SyncSettings;
use crate::error::Result;
use crate::registry::Registry;
use crate::transport::{ResourceTransport, SectionKind, filters, run_batch};

type SectionKey = (String, String, SectionKind);

pub struct Downloader<'a, T> {
    transport: &'a T,
    project: String,
    concurrency: usize,
    pinned: Option<Vec<String>>,
    versions: OnceCell<Vec<String>>,
    sections: Mutex<HashMap<SectionKey, Value>>,
    snapshot: OnceCell<Registry>,
}

impl<'a, T: ResourceTransport> Downloader<'a, T> {
    pub fn new(transport: &'a T, settings: &SyncSettings) -> Self {
        Self {
            transport,
            project: settings.project_name.clone(),
            concurrency: settings.concurrency,
            pinned: None,
            versions: OnceCell::new(),
            sections: Mutex::new(HashMap::new()),
            snapshot: OnceCell::new(),
        }
    }

    /// Restrict the snapshot to the given versions instead of asking the
    /// host. Versions that exist only remotely are then never seen.
    #[must_use]
    pub fn with_versions<I, S>(mut self, versions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pinned = Some(versions.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn project_name(&self) -> &str {
        &self.project
    }

    /// The project's versions, fetched once.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Transport`] if the version list cannot be fetched.
    pub async fn versions(&self) -> Result<&[String]> {
        if let Some(pinned) = &self.pinned {
            return Ok(pinned);
        }

        let versions = self
            .versions
            .get_or_try_init(|| async {
                info!(project = %self.project, "Fetching versions");
                let fetched = self.transport.fetch_versions(&self.project).await?;
                Ok::<_, crate::Error>(fetched.into_iter().map(|v| v.version).collect())
            })
            .await?;
        Ok(versions)
    }

    /// One raw section payload, memoized.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Transport`] if the section cannot be fetched.
    pub async fn section(&self, version: &str, section: SectionKind) -> Result<Value> {
        let key = (self.project.clone(), version.to_string(), section);
        if let Some(cached) = self.cache().get(&key) {
            debug!(%version, %section, "Section cache hit");
            return Ok(cached.clone());
        }

        let payload = self
            .transport
            .fetch_section(&self.project, version, section)
            .await?;
        self.cache().insert(key, payload.clone());
        Ok(payload)
    }

    fn cache(&self) -> std::sync::MutexGuard<'_, HashMap<SectionKey, Value>> {
        self.sections.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The full remote snapshot, fetched once and shared afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if any version or section cannot be fetched, or a
    /// payload does not have the expected shape.
    pub async fn remote_registry(&self) -> Result<&Registry> {
        self.snapshot.get_or_try_init(|| self.build_snapshot()).await
    }

    async fn build_snapshot(&self) -> Result<Registry> {
        let versions = self.versions().await?.to_vec();
        info!(project = %self.project, versions = versions.len(), "Downloading remote snapshot");

        let mut registry = Registry::new(self.project.clone(), versions.iter().cloned());
        for section in SectionKind::ALL {
            debug!(section = section.label(), "Fetching section");
            let payloads = run_batch(&versions, self.concurrency, |version| async move {
                (version, self.section(version, section).await)
            })
            .await;

            for (version, payload) in payloads {
                let payload = payload?;
                match section {
                    SectionKind::Documentation => {
                        *registry.docs_mut(version)? = filters::documentation(payload)?;
                    }
                    SectionKind::CustomPages => {
                        *registry.pages_mut(version)? = filters::custom_pages(payload)?;
                    }
                    SectionKind::CustomContent => {
                        *registry.content_mut(version)? = filters::custom_content(payload)?;
                    }
                }
            }
        }

        Ok(registry)
    }

    /// Forget every cached value. The next call fetches afresh.
    pub fn invalidate(&mut self) {
        self.versions.take();
        self.snapshot.take();
        self.sections
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}
