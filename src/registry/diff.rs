//! Structural diff between two registries.
//!
//! Resources are compared by identity only: `(version, section, slug)`.
//! Titles, bodies and every other field are ignored, and resources
//! without a slug are never indexed.
//!
//! | current | previous | classification |
//! |---------|----------|----------------|
//! | yes     | no       | added          |
//! | no      | yes      | deleted        |
//! | yes     | yes      | neither        |
//!
//! Version is part of identity, so a slug that moves between versions is
//! one add plus one delete.

use indexmap::IndexMap;
use serde::Serialize;

use crate::model::{Entry, Resource, ResourceKey, ResourceKind};

use super::Registry;

/// A diffable collection of resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Section {
    #[serde(rename = "allDocCategories")]
    DocCategories,
    #[serde(rename = "allDocs")]
    Docs,
    #[serde(rename = "allCustomPages")]
    CustomPages,
}

impl Section {
    pub const ALL: [Self; 3] = [Self::DocCategories, Self::Docs, Self::CustomPages];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::DocCategories => "allDocCategories",
            Self::Docs => "allDocs",
            Self::CustomPages => "allCustomPages",
        }
    }

    /// Resource kind held by this section.
    #[must_use]
    pub const fn kind(&self) -> ResourceKind {
        match self {
            Self::DocCategories => ResourceKind::Category,
            Self::Docs => ResourceKind::Doc,
            Self::CustomPages => ResourceKind::CustomPage,
        }
    }

    /// Slugged keys of every resource in this section of `registry`.
    fn keys(self, registry: &Registry) -> Vec<ResourceKey> {
        fn collect<T: Resource>(entries: &[Entry<T>]) -> Vec<ResourceKey> {
            entries.iter().filter_map(Entry::key).collect()
        }

        match self {
            Self::DocCategories => collect(&registry.all_doc_categories()),
            Self::Docs => collect(&registry.all_docs()),
            Self::CustomPages => collect(&registry.all_custom_pages()),
        }
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-section lists of resource keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SectionKeys {
    #[serde(rename = "allDocCategories")]
    pub doc_categories: Vec<ResourceKey>,
    #[serde(rename = "allDocs")]
    pub docs: Vec<ResourceKey>,
    #[serde(rename = "allCustomPages")]
    pub custom_pages: Vec<ResourceKey>,
}

impl SectionKeys {
    #[must_use]
    pub fn get(&self, section: Section) -> &[ResourceKey] {
        match section {
            Section::DocCategories => &self.doc_categories,
            Section::Docs => &self.docs,
            Section::CustomPages => &self.custom_pages,
        }
    }

    fn push(&mut self, section: Section, key: ResourceKey) {
        match section {
            Section::DocCategories => self.doc_categories.push(key),
            Section::Docs => self.docs.push(key),
            Section::CustomPages => self.custom_pages.push(key),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.doc_categories.len() + self.docs.len() + self.custom_pages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Presence {
    current: bool,
    previous: bool,
}

/// version -> section -> slug -> presence
type Index = IndexMap<String, IndexMap<Section, IndexMap<String, Presence>>>;

/// Result of comparing a current registry against a previous one.
#[derive(Debug, Clone, Serialize)]
pub struct Diff {
    #[serde(skip)]
    index: Index,
    pub added: SectionKeys,
    pub deleted: SectionKeys,
}

impl Diff {
    /// Compare `current` against `previous`.
    #[must_use]
    pub fn compute(current: &Registry, previous: &Registry) -> Self {
        let mut index = Index::new();
        mark(&mut index, current, |p| p.current = true);
        mark(&mut index, previous, |p| p.previous = true);

        let mut added = SectionKeys::default();
        let mut deleted = SectionKeys::default();
        for (version, sections) in &index {
            for (&section, slugs) in sections {
                for (slug, presence) in slugs {
                    match (presence.current, presence.previous) {
                        (true, false) => added.push(section, ResourceKey::new(slug, version)),
                        (false, true) => deleted.push(section, ResourceKey::new(slug, version)),
                        _ => {}
                    }
                }
            }
        }

        Self {
            index,
            added,
            deleted,
        }
    }

    fn presence(&self, section: Section, slug: &str, version: &str) -> Option<Presence> {
        self.index.get(version)?.get(&section)?.get(slug).copied()
    }

    /// Whether the resource exists only in the current registry.
    ///
    /// A resource without a slug has never been created remotely, so it
    /// always counts as added.
    #[must_use]
    pub fn is_added(&self, section: Section, slug: Option<&str>, version: &str) -> bool {
        match slug.filter(|s| !s.is_empty()) {
            None => true,
            Some(slug) => self
                .presence(section, slug, version)
                .is_some_and(|p| p.current && !p.previous),
        }
    }

    /// Whether the resource exists only in the previous registry.
    #[must_use]
    pub fn is_deleted(&self, section: Section, slug: Option<&str>, version: &str) -> bool {
        match slug.filter(|s| !s.is_empty()) {
            None => false,
            Some(slug) => self
                .presence(section, slug, version)
                .is_some_and(|p| !p.current && p.previous),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.deleted.is_empty()
    }
}

fn mark(index: &mut Index, registry: &Registry, set: impl Fn(&mut Presence)) {
    for section in Section::ALL {
        for key in section.keys(registry) {
            // Collisions land on the same slot.
            let presence = index
                .entry(key.version)
                .or_default()
                .entry(section)
                .or_default()
                .entry(key.slug)
                .or_default();
            set(presence);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, CustomPage, Document};
    use crate::registry::tests::sample_registry;

    fn registry_with(version: &str, categories: Vec<Category>) -> Registry {
        let mut registry = Registry::new("proj", [version]);
        *registry.docs_mut(version).unwrap() = categories;
        registry
    }

    #[test]
    fn test_scenario_changed_doc() {
        let local = registry_with(
            "v1.0",
            vec![Category::new("Intro").with_slug("intro").with_pages(vec![
                Document::new("Getting Started").with_slug("getting-started"),
            ])],
        );
        let remote = registry_with(
            "v1.0",
            vec![Category::new("Intro").with_slug("intro").with_pages(vec![
                Document::new("Old Page").with_slug("old-page"),
            ])],
        );

        let diff = local.diff(&remote);
        assert_eq!(
            diff.added.get(Section::Docs),
            &[ResourceKey::new("getting-started", "v1.0")]
        );
        assert_eq!(
            diff.deleted.get(Section::Docs),
            &[ResourceKey::new("old-page", "v1.0")]
        );
        assert!(diff.added.get(Section::DocCategories).is_empty());
        assert!(diff.deleted.get(Section::DocCategories).is_empty());
    }

    #[test]
    fn test_every_one_sided_slug_is_classified_once() {
        let current = sample_registry();
        let mut previous = sample_registry();
        previous.docs_mut("v2.0").unwrap().remove(1);
        previous.pages_mut("v2.0").unwrap().push(
            CustomPage::new("Legacy").with_slug("legacy"),
        );

        let diff = current.diff(&previous);

        // "advanced" and "plugins" only in current; "Tuning" has no slug.
        assert_eq!(
            diff.added.get(Section::DocCategories),
            &[ResourceKey::new("advanced", "v2.0")]
        );
        assert_eq!(
            diff.added.get(Section::Docs),
            &[ResourceKey::new("plugins", "v2.0")]
        );
        assert_eq!(
            diff.deleted.get(Section::CustomPages),
            &[ResourceKey::new("legacy", "v2.0")]
        );

        for section in Section::ALL {
            for key in diff.added.get(section) {
                assert!(!diff.deleted.get(section).contains(key));
                assert!(diff.is_added(section, Some(&key.slug), &key.version));
                assert!(!diff.is_deleted(section, Some(&key.slug), &key.version));
            }
        }
    }

    #[test]
    fn test_shared_slugs_are_stable() {
        let registry = sample_registry();
        let diff = registry.diff(&registry.clone());
        assert!(diff.is_empty());
        assert!(!diff.is_added(Section::Docs, Some("faq"), "v1.0"));
        assert!(!diff.is_deleted(Section::Docs, Some("faq"), "v1.0"));
    }

    #[test]
    fn test_content_changes_are_ignored() {
        let current = sample_registry();
        let mut previous = sample_registry();
        {
            let intro = &mut previous.docs_mut("v1.0").unwrap()[0];
            intro.title = Some("Introduction".into());
            intro.pages[0].body = Some("elsewhere.md".into());
            intro.pages[0].excerpt = Some("changed".into());
        }
        assert!(current.diff(&previous).is_empty());
    }

    #[test]
    fn test_version_move_is_add_and_delete() {
        let current = registry_with("v2.0", vec![Category::new("Intro").with_slug("intro")]);
        let previous = registry_with("v1.0", vec![Category::new("Intro").with_slug("intro")]);

        let diff = current.diff(&previous);
        assert_eq!(
            diff.added.get(Section::DocCategories),
            &[ResourceKey::new("intro", "v2.0")]
        );
        assert_eq!(
            diff.deleted.get(Section::DocCategories),
            &[ResourceKey::new("intro", "v1.0")]
        );
    }

    #[test]
    fn test_unslugged_lookups() {
        let registry = sample_registry();
        let diff = registry.diff(&registry);
        assert!(diff.is_added(Section::Docs, None, "v2.0"));
        assert!(diff.is_added(Section::Docs, Some(""), "v2.0"));
        assert!(!diff.is_deleted(Section::Docs, None, "v2.0"));
        // Unknown triple is simply not found
        assert!(!diff.is_added(Section::Docs, Some("nowhere"), "v9.0"));
    }

    #[test]
    fn test_slug_collision_does_not_panic() {
        let current = registry_with(
            "v1.0",
            vec![
                Category::new("A").with_slug("dup"),
                Category::new("B").with_slug("dup"),
            ],
        );
        let previous = Registry::new("proj", ["v1.0"]);

        let diff = current.diff(&previous);
        assert_eq!(
            diff.added.get(Section::DocCategories),
            &[ResourceKey::new("dup", "v1.0")]
        );
    }

    #[test]
    fn test_serializes_section_names() {
        let registry = sample_registry();
        let diff = registry.diff(&Registry::new("github-upload", ["v1.0"]));
        let json = serde_json::to_value(&diff).unwrap();
        assert!(json["added"]["allDocs"].as_array().unwrap().len() >= 5);
        assert!(json["deleted"]["allCustomPages"].as_array().unwrap().is_empty());
    }
}
