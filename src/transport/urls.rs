//! URL scheme of the documentation host API.

use crate::model::ResourceKind;

use super::SectionKind;

/// Builds endpoint URLs for one project version.
#[derive(Debug, Clone)]
pub struct UrlGenerator<'a> {
    base: &'a str,
    project: &'a str,
    version: &'a str,
}

impl<'a> UrlGenerator<'a> {
    pub fn new(base: &'a str, project: &'a str, version: &'a str) -> Self {
        Self {
            base: base.trim_end_matches('/'),
            project,
            version,
        }
    }

    /// Version list for a project. Not version-scoped.
    #[must_use]
    pub fn versions(base: &str, project: &str) -> String {
        format!("{}/api/projects-v/{project}", base.trim_end_matches('/'))
    }

    fn version_root(&self) -> String {
        format!("{}/api/projects/{}/{}", self.base, self.project, self.version)
    }

    #[must_use]
    pub fn section(&self, section: SectionKind) -> String {
        let root = self.version_root();
        match section {
            SectionKind::Documentation => format!("{root}/docs"),
            SectionKind::CustomPages => format!("{root}/page"),
            SectionKind::CustomContent => root,
        }
    }

    /// Create endpoint. Documents are created under their category.
    #[must_use]
    pub fn create(&self, kind: ResourceKind, parent_slug: Option<&str>) -> String {
        let root = self.version_root();
        match kind {
            ResourceKind::Category => format!("{root}/category"),
            ResourceKind::Doc => format!("{root}/docs/{}", parent_slug.unwrap_or_default()),
            ResourceKind::CustomPage => format!("{root}/page"),
            ResourceKind::Content | ResourceKind::Version => root,
        }
    }

    /// Update and delete endpoint for the resource at `slug`.
    #[must_use]
    pub fn resource(&self, kind: ResourceKind, slug: &str) -> String {
        let root = self.version_root();
        match kind {
            ResourceKind::Category => format!("{root}/category/{slug}"),
            ResourceKind::Doc => format!("{root}/doc/{slug}"),
            ResourceKind::CustomPage => format!("{root}/page/{slug}"),
            ResourceKind::Content | ResourceKind::Version => root,
        }
    }

    #[must_use]
    pub fn order(&self, kind: ResourceKind) -> String {
        let root = self.version_root();
        match kind {
            ResourceKind::Category => format!("{root}/category/order"),
            _ => format!("{root}/docs/order"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://dash.example.io/";

    #[test]
    fn test_versions_url() {
        assert_eq!(
            UrlGenerator::versions(BASE, "github-upload"),
            "https://dash.example.io/api/projects-v/github-upload"
        );
    }

    #[test]
    fn test_section_urls() {
        let urls = UrlGenerator::new(BASE, "github-upload", "v1.0");
        assert_eq!(
            urls.section(SectionKind::Documentation),
            "https://dash.example.io/api/projects/github-upload/v1.0/docs"
        );
        assert_eq!(
            urls.section(SectionKind::CustomPages),
            "https://dash.example.io/api/projects/github-upload/v1.0/page"
        );
        assert_eq!(
            urls.section(SectionKind::CustomContent),
            "https://dash.example.io/api/projects/github-upload/v1.0"
        );
    }

    #[test]
    fn test_resource_urls() {
        let urls = UrlGenerator::new(BASE, "p", "v2.0");
        assert_eq!(
            urls.create(ResourceKind::Doc, Some("intro")),
            "https://dash.example.io/api/projects/p/v2.0/docs/intro"
        );
        assert_eq!(
            urls.create(ResourceKind::Category, None),
            "https://dash.example.io/api/projects/p/v2.0/category"
        );
        assert_eq!(
            urls.resource(ResourceKind::Doc, "faq"),
            "https://dash.example.io/api/projects/p/v2.0/doc/faq"
        );
        assert_eq!(
            urls.resource(ResourceKind::CustomPage, "landing"),
            "https://dash.example.io/api/projects/p/v2.0/page/landing"
        );
        assert_eq!(
            urls.order(ResourceKind::Category),
            "https://dash.example.io/api/projects/p/v2.0/category/order"
        );
        assert_eq!(
            urls.order(ResourceKind::Doc),
            "https://dash.example.io/api/projects/p/v2.0/docs/order"
        );
    }
}
