//! Stamped resource copies produced by flattening a registry.

use serde::Serialize;

use super::resource::{Resource, ResourceKey, UploadMethod};

/// Where a flattened entry came from inside its version's sections.
///
/// Used to write server responses back onto the stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Category { index: usize },
    Doc { category: usize, index: usize },
    CustomPage { index: usize },
    Content,
}

/// Linkage from a document to the category that owns it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParentCategory {
    #[serde(rename = "categorySlug", skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(rename = "categoryTitle", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "categoryId", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// A resource lifted out of the registry with its context stamped on.
///
/// Entries are owned copies: stamping never touches the registry, so
/// flattening twice always yields the same values.
#[derive(Debug, Clone, Serialize)]
pub struct Entry<T> {
    pub version: String,

    /// Position within the parent list at flatten time.
    #[serde(skip)]
    pub order: usize,

    #[serde(skip)]
    pub position: Position,

    #[serde(flatten)]
    pub parent: Option<ParentCategory>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<UploadMethod>,

    /// Set when this entry's remote operation failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,

    #[serde(flatten)]
    pub resource: T,
}

impl<T: Resource> Entry<T> {
    pub fn new(version: impl Into<String>, order: usize, position: Position, resource: T) -> Self {
        Self {
            version: version.into(),
            order,
            position,
            parent: None,
            method: None,
            failure: None,
            resource,
        }
    }

    #[must_use]
    pub fn with_parent(mut self, parent: ParentCategory) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn slug(&self) -> Option<&str> {
        self.resource.slug()
    }

    /// Slug of the owning category, for documents.
    pub fn parent_slug(&self) -> Option<&str> {
        self.parent
            .as_ref()
            .and_then(|p| p.slug.as_deref())
            .filter(|s| !s.is_empty())
    }

    /// Diff identity, if the entry has a slug.
    pub fn key(&self) -> Option<ResourceKey> {
        self.slug().map(|slug| ResourceKey::new(slug, &self.version))
    }

    pub fn is_failed(&self) -> bool {
        self.failure.is_some()
    }

    pub fn mark_failed(&mut self, reason: impl Into<String>) {
        self.failure = Some(reason.into());
    }
}

impl<T: Resource> std::fmt::Display for Entry<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut parts = Vec::new();
        if let Some(method) = self.method {
            parts.push(format!("{method}:"));
        }
        parts.push(self.version.clone());
        if self.resource.title().is_some() || self.slug().is_some() {
            parts.push("-".to_string());
        }
        if let Some(title) = self.resource.title() {
            parts.push(title.to_string());
        }
        if let Some(slug) = self.slug() {
            parts.push(format!("<{slug}>"));
        }
        if let Some(count) = self.resource.page_count() {
            parts.push(format!("({count} docs)"));
        }
        f.write_str(&parts.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, Document};

    #[test]
    fn test_display_full() {
        let category = Category::new("Getting Started")
            .with_slug("getting-started")
            .with_pages(vec![Document::new("A"), Document::new("B")]);
        let mut entry = Entry::new("v1.0", 0, Position::Category { index: 0 }, category);
        entry.method = Some(UploadMethod::Update);

        assert_eq!(
            entry.to_string(),
            "PUT: v1.0 - Getting Started <getting-started> (2 docs)"
        );
    }

    #[test]
    fn test_display_unresolved_doc() {
        let entry = Entry::new(
            "v2.0",
            3,
            Position::Doc { category: 0, index: 3 },
            Document::new("Draft"),
        );
        assert_eq!(entry.to_string(), "v2.0 - Draft");
        assert_eq!(entry.key(), None);
    }

    #[test]
    fn test_serialize_stamps() {
        let entry = Entry::new(
            "v1.0",
            0,
            Position::Doc { category: 0, index: 0 },
            Document::new("Intro").with_slug("intro"),
        )
        .with_parent(ParentCategory {
            slug: Some("basics".into()),
            title: Some("Basics".into()),
            id: None,
        });

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["version"], "v1.0");
        assert_eq!(json["categorySlug"], "basics");
        assert_eq!(json["slug"], "intro");
        assert!(json.get("categoryId").is_none());
    }
}
