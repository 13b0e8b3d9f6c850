//! Remote documentation host access.
//!
//! The sync engine never builds requests itself. It talks to a
//! [`ResourceTransport`], which the CLI backs with [`HttpTransport`] and
//! the engine tests back with an in-memory mock.
//!
//! Every call returns its own outcome. Batching and bounded concurrency
//! live in [`batch`], so a failing call never affects its siblings.

pub mod batch;
pub mod filters;
pub mod http;
#[cfg(test)]
pub mod mock;
pub mod urls;

pub use batch::run_batch;
pub use http::HttpTransport;

use serde::Deserialize;

use crate::model::{Resource, ResourceKind, Version};

/// Errors a single remote call can produce.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The host answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The request never got a response.
    #[error("network error: {0}")]
    Network(String),

    /// The response body could not be parsed.
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Result alias for transport calls.
pub type TransportResult<T> = std::result::Result<T, TransportError>;

/// The per-version sections fetched from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    Documentation,
    CustomPages,
    CustomContent,
}

impl SectionKind {
    pub const ALL: [Self; 3] = [Self::Documentation, Self::CustomPages, Self::CustomContent];

    /// Key used for this section in the persisted registry.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Documentation => "documentation",
            Self::CustomPages => "customPages",
            Self::CustomContent => "customContent",
        }
    }

    /// Human-readable label for progress output.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Documentation => "documentation",
            Self::CustomPages => "custom pages",
            Self::CustomContent => "custom content",
        }
    }
}

impl std::fmt::Display for SectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Server-assigned fields returned by a create or update call.
///
/// Everything else in the response is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerResource {
    pub slug: Option<String>,
    pub title: Option<String>,
    pub excerpt: Option<String>,
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub body: Option<String>,
    /// Some endpoints answer with `id` instead of `_id`. Folded into
    /// `id` by [`ServerResource::from_value`].
    #[serde(rename = "id")]
    pub(crate) plain_id: Option<String>,
}

impl ServerResource {
    /// Parse a response body, keeping only the fields above.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Malformed`] if the value is not an object
    /// or a known field has the wrong type.
    pub fn from_value(value: serde_json::Value) -> TransportResult<Self> {
        if !value.is_object() {
            return Err(TransportError::Malformed(format!(
                "expected an object, got {value}"
            )));
        }
        let mut resource: Self = serde_json::from_value(value)
            .map_err(|e| TransportError::Malformed(e.to_string()))?;
        if resource.id.is_none() {
            resource.id = resource.plain_id.take();
        }
        Ok(resource)
    }

    /// Copy the fields the server returned onto a record.
    ///
    /// Absent and empty slugs and ids leave the record untouched. Excerpt
    /// newlines become spaces.
    pub fn apply_to<R: Resource>(&self, record: &mut R) {
        let excerpt = self.excerpt.as_deref().map(filters::flatten_newlines);
        record.absorb(
            self.slug.as_deref().filter(|s| !s.is_empty()),
            self.title.as_deref(),
            excerpt.as_deref(),
            self.id.as_deref().filter(|s| !s.is_empty()),
        );
    }
}

/// Access to the remote host's resource API.
///
/// `kind` selects the resource family (category, doc, custom page or
/// content). `parent_slug` is only meaningful for documents, which are
/// created under their category.
pub trait ResourceTransport: Send + Sync {
    /// List the project's versions.
    fn fetch_versions(
        &self,
        project: &str,
    ) -> impl std::future::Future<Output = TransportResult<Vec<Version>>> + Send;

    /// Fetch one section of one version, as the host returns it.
    fn fetch_section(
        &self,
        project: &str,
        version: &str,
        section: SectionKind,
    ) -> impl std::future::Future<Output = TransportResult<serde_json::Value>> + Send;

    /// Create a resource. The server picks the slug.
    fn create_resource(
        &self,
        project: &str,
        version: &str,
        kind: ResourceKind,
        parent_slug: Option<&str>,
        body: &serde_json::Value,
    ) -> impl std::future::Future<Output = TransportResult<ServerResource>> + Send;

    /// Update the resource currently addressed by `slug`.
    fn update_resource(
        &self,
        project: &str,
        version: &str,
        kind: ResourceKind,
        slug: &str,
        body: &serde_json::Value,
    ) -> impl std::future::Future<Output = TransportResult<ServerResource>> + Send;

    fn delete_resource(
        &self,
        project: &str,
        version: &str,
        kind: ResourceKind,
        slug: &str,
    ) -> impl std::future::Future<Output = TransportResult<()>> + Send;

    /// Replace the ordering of every resource of `kind` in one version.
    fn set_order(
        &self,
        project: &str,
        version: &str,
        kind: ResourceKind,
        payload: &serde_json::Value,
    ) -> impl std::future::Future<Output = TransportResult<()>> + Send;
}
