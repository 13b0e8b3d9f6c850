//! Documentation category.

use serde::{Deserialize, Serialize};

use super::document::Document;
use super::resource::{Resource, ResourceKind, assign, non_empty};

/// A category groups an ordered list of documents.
///
/// Order is positional: `pages[i]` is the i-th document shown under the
/// category. The explicit `order` fields are kept in step with positions
/// by the tree loader and by flattening.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<usize>,

    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default)]
    pub pages: Vec<Document>,
}

impl Category {
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
    pub fn with_pages(mut self, pages: Vec<Document>) -> Self {
        self.pages = pages;
        self
    }

    /// Rewrite every page's `order` to match its position.
    pub fn renumber_pages(&mut self) {
        for (i, page) in self.pages.iter_mut().enumerate() {
            page.order = Some(i);
        }
    }
}

impl Resource for Category {
    const KIND: ResourceKind = ResourceKind::Category;

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

    fn page_count(&self) -> Option<usize> {
        Some(self.pages.len())
    }
}
