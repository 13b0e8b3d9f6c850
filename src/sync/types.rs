//! Result types for sync runs.
//!
//! Per-resource failures are data, not errors: every entry handed to a
//! phase comes back in its [`Batch`], with failed ones marked.

use serde::Serialize;

use crate::model::{Category, CustomContent, CustomPage, Document, Entry, ResourceKey, ResourceKind};
use crate::registry::Section;

/// Every entry a phase processed, in input order.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct Batch<T> {
    pub entries: Vec<Entry<T>>,
}

impl<T> Batch<T> {
    #[must_use]
    pub fn new(entries: Vec<Entry<T>>) -> Self {
        Self { entries }
    }

    pub fn succeeded(&self) -> impl Iterator<Item = &Entry<T>> {
        self.entries.iter().filter(|e| e.failure.is_none())
    }

    pub fn failed(&self) -> impl Iterator<Item = &Entry<T>> {
        self.entries.iter().filter(|e| e.failure.is_some())
    }

    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.failed().count()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> Default for Batch<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

/// Result of one ordering request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderOutcome {
    pub version: String,
    pub kind: ResourceKind,
    /// Entries included in the request.
    pub sent: usize,
    /// Entries left out because they have no server id yet.
    pub skipped: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl OrderOutcome {
    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.failure.is_some()
    }
}

/// Result of one delete request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteOutcome {
    pub section: Section,
    #[serde(flatten)]
    pub key: ResourceKey,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl DeleteOutcome {
    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.failure.is_some()
    }
}

/// Everything `upload_all` did, phase by phase.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadSummary {
    pub categories: Batch<Category>,
    pub docs: Batch<Document>,
    pub custom_pages: Batch<CustomPage>,
    pub custom_content: Batch<CustomContent>,
    pub category_order: Vec<OrderOutcome>,
    pub doc_order: Vec<OrderOutcome>,
}

impl UploadSummary {
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.categories.failed_count()
            + self.docs.failed_count()
            + self.custom_pages.failed_count()
            + self.custom_content.failed_count()
            + self.category_order.iter().filter(|o| o.is_failed()).count()
            + self.doc_order.iter().filter(|o| o.is_failed()).count()
    }

    /// Every resource and ordering request the run attempted.
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.categories.len()
            + self.docs.len()
            + self.custom_pages.len()
            + self.custom_content.len()
            + self.category_order.len()
            + self.doc_order.len()
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed_count() == 0
    }
}

/// Create/update decisions for a dry run. Nothing is sent.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadPlan {
    pub categories: Vec<Entry<Category>>,
    pub docs: Vec<Entry<Document>>,
    pub custom_pages: Vec<Entry<CustomPage>>,
}

/// Everything `clean_all` deleted or failed to delete.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CleanReport {
    pub deleted: Vec<DeleteOutcome>,
}

impl CleanReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &DeleteOutcome> {
        self.deleted.iter().filter(|d| !d.is_failed())
    }

    pub fn failed(&self) -> impl Iterator<Item = &DeleteOutcome> {
        self.deleted.iter().filter(|d| d.is_failed())
    }

    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.failed().count()
    }
}
