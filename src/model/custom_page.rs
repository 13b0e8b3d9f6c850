//! Standalone custom page.

use serde::{Deserialize, Serialize};

use super::resource::{Resource, ResourceKind, assign, non_empty};

/// A custom HTML page that lives outside the documentation tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomPage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,

    /// Path to the markdown body, when the page is written in markdown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    /// Path to the HTML body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,

    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl CustomPage {
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
    pub fn with_html(mut self, path: impl Into<String>) -> Self {
        self.html = Some(path.into());
        self
    }
}

impl Resource for CustomPage {
    const KIND: ResourceKind = ResourceKind::CustomPage;

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
        _excerpt: Option<&str>,
        id: Option<&str>,
    ) {
        assign(&mut self.slug, slug);
        assign(&mut self.title, title);
        assign(&mut self.id, id);
    }
}
