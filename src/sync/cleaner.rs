//! Deletes remote resources the local registry no longer tracks.

use tracing::{info, warn};

use crate::config::SyncSettings;
use crate::error::Result;
use crate::model::ResourceKey;
use crate::registry::{Diff, Registry, Section};
use crate::transport::{ResourceTransport, run_batch};

use super::downloader::Downloader;
use super::types::{CleanReport, DeleteOutcome};

pub struct Cleaner<'a, T> {
    transport: &'a T,
    downloader: &'a Downloader<'a, T>,
    settings: &'a SyncSettings,
    aggressive: bool,
}

impl<'a, T: ResourceTransport> Cleaner<'a, T> {
    pub fn new(
        transport: &'a T,
        downloader: &'a Downloader<'a, T>,
        settings: &'a SyncSettings,
    ) -> Self {
        Self {
            transport,
            downloader,
            settings,
            aggressive: false,
        }
    }

    /// Also delete resources that exist only locally. Destructive.
    #[must_use]
    pub fn aggressive(mut self, aggressive: bool) -> Self {
        self.aggressive = aggressive;
        self
    }

    /// What a clean would delete, per section, without sending anything.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote snapshot cannot be fetched.
    pub async fn candidates(&self, registry: &Registry) -> Result<Vec<(Section, ResourceKey)>> {
        let remote = self.downloader.remote_registry().await?;
        let diff = registry.diff(remote);
        Ok([Section::Docs, Section::DocCategories, Section::CustomPages]
            .into_iter()
            .flat_map(|section| {
                self.section_candidates(&diff, section)
                    .into_iter()
                    .map(move |key| (section, key))
            })
            .collect())
    }

    fn section_candidates(&self, diff: &Diff, section: Section) -> Vec<ResourceKey> {
        let mut keys = diff.deleted.get(section).to_vec();
        if self.aggressive {
            keys.extend_from_slice(diff.added.get(section));
        }
        keys
    }

    /// # Errors
    ///
    /// Returns an error if the remote snapshot cannot be fetched.
    pub async fn clean_docs(&self, registry: &Registry) -> Result<Vec<DeleteOutcome>> {
        self.clean_section(registry, Section::Docs).await
    }

    /// # Errors
    ///
    /// Returns an error if the remote snapshot cannot be fetched.
    pub async fn clean_doc_categories(&self, registry: &Registry) -> Result<Vec<DeleteOutcome>> {
        self.clean_section(registry, Section::DocCategories).await
    }

    /// # Errors
    ///
    /// Returns an error if the remote snapshot cannot be fetched.
    pub async fn clean_custom_pages(&self, registry: &Registry) -> Result<Vec<DeleteOutcome>> {
        self.clean_section(registry, Section::CustomPages).await
    }

    /// Docs, then categories, then custom pages.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote snapshot cannot be fetched. Failed
    /// deletes are collected in the report.
    pub async fn clean_all(&self, registry: &Registry) -> Result<CleanReport> {
        info!(project = %registry.project_name(), aggressive = self.aggressive, "Cleaning remote");
        let mut deleted = self.clean_docs(registry).await?;
        deleted.extend(self.clean_doc_categories(registry).await?);
        deleted.extend(self.clean_custom_pages(registry).await?);
        Ok(CleanReport { deleted })
    }

    async fn clean_section(
        &self,
        registry: &Registry,
        section: Section,
    ) -> Result<Vec<DeleteOutcome>> {
        let remote = self.downloader.remote_registry().await?;
        let diff = registry.diff(remote);
        let keys = self.section_candidates(&diff, section);
        info!(section = section.as_str(), count = keys.len(), "Deleting");

        let project = self.settings.project_name.as_str();
        let kind = section.kind();
        Ok(run_batch(keys, self.settings.concurrency, |key| async move {
            let failure = self
                .transport
                .delete_resource(project, &key.version, kind, &key.slug)
                .await
                .err()
                .map(|e| {
                    warn!(%key, error = %e, "Delete failed");
                    e.to_string()
                });
            DeleteOutcome {
                section,
                key,
                failure,
            }
        })
        .await)
    }
}
