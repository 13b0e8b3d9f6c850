//! The capability every resource kind shares.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Discriminant for the resource kinds the remote host exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResourceKind {
    Category,
    Doc,
    CustomPage,
    Content,
    Version,
}

impl ResourceKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::Doc => "doc",
            Self::CustomPage => "customPage",
            Self::Content => "content",
            Self::Version => "version",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a resource is sent to the create or the update endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadMethod {
    /// POST to the collection; the server assigns the slug.
    Create,
    /// PUT to the resource addressed by its slug.
    Update,
}

impl UploadMethod {
    /// HTTP verb used for this method.
    #[must_use]
    pub const fn verb(&self) -> &'static str {
        match self {
            Self::Create => "POST",
            Self::Update => "PUT",
        }
    }
}

impl std::fmt::Display for UploadMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.verb())
    }
}

/// Identity of a resource within one section: slug plus version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceKey {
    pub slug: String,
    pub version: String,
}

impl ResourceKey {
    pub fn new(slug: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            version: version.into(),
        }
    }
}

impl std::fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} <{}>", self.version, self.slug)
    }
}

/// Shared capability of every resource record.
///
/// Records deserialize only the fields they recognize, so building one from
/// an upstream property bag drops anything unknown. Nothing from an API
/// response leaks into persisted state unless a record names it.
pub trait Resource: Clone + Serialize + DeserializeOwned {
    /// The kind of every value of this type.
    const KIND: ResourceKind;

    /// Report this resource's kind.
    fn kind(&self) -> ResourceKind {
        Self::KIND
    }

    /// Server-confirmed (or desired) slug. Empty slugs count as absent.
    fn slug(&self) -> Option<&str>;

    fn title(&self) -> Option<&str> {
        None
    }

    /// Number of child documents, for categories.
    fn page_count(&self) -> Option<usize> {
        None
    }

    /// Take server-assigned fields. Absent values leave the record alone,
    /// and kinds without these fields ignore the call.
    fn absorb(
        &mut self,
        _slug: Option<&str>,
        _title: Option<&str>,
        _excerpt: Option<&str>,
        _id: Option<&str>,
    ) {
    }

    /// Build a record from an arbitrary JSON property bag, keeping only
    /// recognized fields.
    ///
    /// # Errors
    ///
    /// Returns an error if a recognized field has the wrong JSON type.
    fn from_properties(properties: &serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(properties.clone())?)
    }
}

/// Treat `Some("")` the same as `None`.
pub(crate) fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|s| !s.is_empty())
}

/// Overwrite `slot` when `value` is present.
pub(crate) fn assign(slot: &mut Option<String>, value: Option<&str>) {
    if let Some(value) = value {
        *slot = Some(value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_serializes_camel_case() {
        let json = serde_json::to_string(&ResourceKind::CustomPage).unwrap();
        assert_eq!(json, "\"customPage\"");
        assert_eq!(ResourceKind::Doc.to_string(), "doc");
    }

    #[test]
    fn test_method_verbs() {
        assert_eq!(UploadMethod::Create.verb(), "POST");
        assert_eq!(UploadMethod::Update.to_string(), "PUT");
    }

    #[test]
    fn test_non_empty() {
        let empty = String::new();
        let slug = "intro".to_string();
        assert_eq!(non_empty(Some(&empty)), None);
        assert_eq!(non_empty(Some(&slug)), Some("intro"));
        assert_eq!(non_empty(None), None);
    }
}
