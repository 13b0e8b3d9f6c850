//! Documentation page.

use serde::{Deserialize, Serialize};

use super::resource::{Resource, ResourceKind, assign, non_empty};

/// A markdown document inside a category.
///
/// `body` holds a path to the markdown file, not the text itself, so the
/// registry stays small and the content can be edited as a normal file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Absent until the server has assigned or confirmed one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,

    /// Path to the markdown body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    /// Host-specific page type (e.g. `basic`, `link`).
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<String>,

    /// Position within the parent category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<usize>,

    /// Server-internal id.
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl Document {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    #[must_use]
    pub fn with_body(mut self, path: impl Into<String>) -> Self {
        self.body = Some(path.into());
        self
    }
}

impl Resource for Document {
    const KIND: ResourceKind = ResourceKind::Doc;

    fn slug(&self) -> Option<&str> {
        non_empty(self.slug.as_ref())
    }

    fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    fn absorb(
        &mut self,
        slug: Option<&str>,
        title: Option<&str>,
        excerpt: Option<&str>,
        id: Option<&str>,
    ) {
        assign(&mut self.slug, slug);
        assign(&mut self.title, title);
        assign(&mut self.excerpt, excerpt);
        assign(&mut self.id, id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_properties_drops_unknown_fields() {
        let doc = Document::from_properties(&json!({
            "title": "Getting Started",
            "slug": "getting-started",
            "excerpt": "First steps",
            "_id": "abc123",
            "createdAt": "2015-01-01",
            "githubsync": "",
            "hidden": false,
        }))
        .unwrap();

        assert_eq!(doc.slug(), Some("getting-started"));
        assert_eq!(doc.id.as_deref(), Some("abc123"));

        let exported = serde_json::to_value(&doc).unwrap();
        let keys: Vec<_> = exported.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["title", "slug", "excerpt", "_id"]);
    }

    #[test]
    fn test_empty_slug_is_unresolved() {
        let doc = Document::new("Draft").with_slug("");
        assert_eq!(doc.slug(), None);
        assert_eq!(doc.kind(), ResourceKind::Doc);
    }
}
