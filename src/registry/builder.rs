//! Builds a registry from a tree of local files.
//!
//! A build-settings file names, per project version, where each section's
//! content lives:
//!
//! ```json
//! { "acme": { "v1.0": {
//!     "documentation": "docs/v1.0",
//!     "customPages": "pages/v1.0",
//!     "customContent": { "appearance": { "stylesheet": "content/v1.0/styles.css" } }
//! } } }
//! ```
//!
//! Every path, including the appearance files, is relative to the
//! settings file's directory.
//!
//! Category and page slugs are derived from their titles unless the
//! version pins them under `slugs`, keyed by directory or file name:
//!
//! ```json
//! "slugs": { "categories": { "0-Quickstart": "getting-started" },
//!            "customPages": { "Landing.html": "home" } }
//! ```
//!
//! Inside `documentation`, every `<order>-<title>` directory is a category
//! and every `<order>-<title>.md` file in it is a document. Inside
//! `customPages`, every `<title>.html` file is a page. Other entries are
//! skipped.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::markup::{split_front_matter, title_to_slug};
use crate::model::{Appearance, Category, CustomContent, CustomPage, Document};

use super::{Registry, VersionSections, file};

/// Where one version's sections live on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionSettings {
    pub documentation: PathBuf,
    #[serde(rename = "customPages")]
    pub custom_pages: PathBuf,
    #[serde(rename = "customContent", default)]
    pub custom_content: CustomContent,
    #[serde(default, skip_serializing_if = "PinnedSlugs::is_empty")]
    pub slugs: PinnedSlugs,
}

/// Slugs that differ from the ones derived from titles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinnedSlugs {
    /// Category directory name -> slug.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub categories: IndexMap<String, String>,
    /// Custom page file name -> slug.
    #[serde(rename = "customPages", default, skip_serializing_if = "IndexMap::is_empty")]
    pub custom_pages: IndexMap<String, String>,
}

impl PinnedSlugs {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() && self.custom_pages.is_empty()
    }
}

/// Parsed build-settings file: project -> version -> section locations.
pub type BuildSettings = IndexMap<String, IndexMap<String, VersionSettings>>;

/// Reads local content trees into a [`Registry`].
#[derive(Debug, Clone)]
pub struct RegistryBuilder {
    category_dir: Regex,
    doc_file: Regex,
    page_file: Regex,
}

impl RegistryBuilder {
    /// # Errors
    ///
    /// Returns an error if a filename pattern fails to compile.
    pub fn new() -> Result<Self> {
        let compile = |pattern: &str| Regex::new(pattern).map_err(|e| Error::Other(e.to_string()));
        Ok(Self {
            category_dir: compile(r"^(\d+).(.+)$")?,
            doc_file: compile(r"^(\d+).(.+)\.md$")?,
            page_file: compile(r"^(.+)\.html$")?,
        })
    }

    /// Load a build-settings file and build the registry it describes.
    ///
    /// Relative paths are resolved against the settings file's directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings file is unreadable or malformed,
    /// or a section directory cannot be read.
    pub fn build_from_file(&self, settings_path: &Path) -> Result<Registry> {
        let content = file::read_text(settings_path)?;
        let settings: BuildSettings = serde_json::from_str(&content).map_err(|e| {
            Error::InvalidArgument(format!(
                "{} is not a valid build settings file: {e}",
                settings_path.display()
            ))
        })?;

        let root = settings_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        self.build(settings, root)
    }

    /// Build a registry from parsed settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings name no project, or a section
    /// directory cannot be read.
    pub fn build(&self, settings: BuildSettings, root: &Path) -> Result<Registry> {
        let mut projects = settings.into_iter();
        let Some((project_name, versions)) = projects.next() else {
            return Err(Error::InvalidArgument(
                "build settings name no project".to_string(),
            ));
        };

        let mut registry = Registry::new(project_name, std::iter::empty::<String>());
        for (version, sections) in versions {
            let mut custom_content = sections.custom_content;
            resolve_appearance(&mut custom_content.appearance, root);
            let built = VersionSections {
                documentation: self
                    .docs_section(&root.join(&sections.documentation), &sections.slugs.categories)?,
                custom_pages: self.custom_pages_section(
                    &root.join(&sections.custom_pages),
                    &sections.slugs.custom_pages,
                )?,
                custom_content,
            };
            debug!(
                %version,
                categories = built.documentation.len(),
                pages = built.custom_pages.len(),
                "Loaded local version"
            );
            registry.insert_version(version, built);
        }

        Ok(registry)
    }

    /// Categories (with their documents) under a documentation directory.
    ///
    /// `pinned` maps directory names to slugs that win over derived ones.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory or document cannot be read.
    pub fn docs_section(
        &self,
        dir: &Path,
        pinned: &IndexMap<String, String>,
    ) -> Result<Vec<Category>> {
        let mut categories = Vec::new();
        for (name, path) in sorted_entries(dir)? {
            if !path.is_dir() {
                continue;
            }
            let Some(caps) = self.category_dir.captures(&name) else {
                trace!(%name, "Skipping non-category directory");
                continue;
            };
            let order = parse_order(&caps[1]);
            let title = caps[2].to_string();

            let slug = pinned
                .get(&name)
                .cloned()
                .unwrap_or_else(|| title_to_slug(&title));
            let mut category = Category::new(title).with_slug(slug);
            category.order = Some(order);
            category.pages = self.parse_documents(&path)?;
            categories.push(category);
        }

        categories.sort_by_key(|c| c.order);
        for (i, category) in categories.iter_mut().enumerate() {
            category.order = Some(i);
        }
        Ok(categories)
    }

    fn parse_documents(&self, dir: &Path) -> Result<Vec<Document>> {
        let mut docs = Vec::new();
        for (name, path) in sorted_entries(dir)? {
            if !path.is_file() {
                continue;
            }
            let Some(caps) = self.doc_file.captures(&name) else {
                continue;
            };

            let text = file::read_text(&path)?;
            let (meta, _) = split_front_matter(&text)
                .map_err(|e| Error::InvalidArgument(format!("{}: {e}", path.display())))?;

            docs.push(Document {
                title: meta.title.or_else(|| Some(caps[2].to_string())),
                slug: meta.slug,
                excerpt: meta.excerpt,
                body: Some(path.to_string_lossy().into_owned()),
                doc_type: meta.doc_type,
                order: Some(parse_order(&caps[1])),
                id: None,
            });
        }

        docs.sort_by_key(|d| d.order);
        let mut category = Category::default().with_pages(docs);
        category.renumber_pages();
        Ok(category.pages)
    }

    /// Custom pages under a directory. Slugs come from `pinned` (keyed by
    /// file name), else from the file titles.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read.
    pub fn custom_pages_section(
        &self,
        dir: &Path,
        pinned: &IndexMap<String, String>,
    ) -> Result<Vec<CustomPage>> {
        let mut pages = Vec::new();
        for (name, path) in sorted_entries(dir)? {
            if !path.is_file() {
                continue;
            }
            if let Some(caps) = self.page_file.captures(&name) {
                let title = caps[1].to_string();
                let slug = pinned
                    .get(&name)
                    .cloned()
                    .unwrap_or_else(|| title_to_slug(&title));
                pages.push(
                    CustomPage::new(title)
                        .with_slug(slug)
                        .with_html(path.to_string_lossy()),
                );
            }
        }
        Ok(pages)
    }
}

/// Directory entries sorted by name. A missing directory is empty.
fn sorted_entries(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    if !dir.exists() {
        debug!(dir = %dir.display(), "Section directory missing; treating as empty");
        return Ok(Vec::new());
    }
    let mut entries = fs::read_dir(dir)?
        .map(|entry| -> Result<(String, PathBuf)> {
            let entry = entry?;
            Ok((entry.file_name().to_string_lossy().into_owned(), entry.path()))
        })
        .collect::<Result<Vec<_>>>()?;
    entries.sort();
    Ok(entries)
}

fn resolve_appearance(appearance: &mut Appearance, root: &Path) {
    for slot in [
        &mut appearance.html_head,
        &mut appearance.html_body,
        &mut appearance.stylesheet,
    ] {
        if let Some(path) = slot.as_mut() {
            *path = root.join(&*path).to_string_lossy().into_owned();
        }
    }
}

fn parse_order(digits: &str) -> usize {
    digits.parse().unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Resource;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &str) {
        file::write_text(&root.join(relative), content).unwrap();
    }

    fn sample_tree(root: &Path) {
        write(root, "docs/10-Advanced/2-Plugins.md", "# Plugins\n");
        write(root, "docs/10-Advanced/1-Tuning.md", "# Tuning\n");
        write(
            root,
            "docs/2-Getting Started/1-Install.md",
            "---\ntitle: Installing\nslug: install\nexcerpt: How to install\n---\n# Install\n",
        );
        write(root, "docs/2-Getting Started/notes.txt", "ignored");
        write(root, "docs/README.md", "ignored");
        write(root, "pages/Landing Page.html", "<h1>Hi</h1>");
        write(root, "pages/draft.txt", "ignored");
        write(
            root,
            "buildSettings.json",
            r#"{ "acme": { "v1.0": {
                "documentation": "docs",
                "customPages": "pages",
                "customContent": { "appearance": { "stylesheet": "content/styles.css" } }
            } } }"#,
        );
    }

    #[test]
    fn test_categories_sorted_and_renumbered() {
        let temp_dir = TempDir::new().unwrap();
        sample_tree(temp_dir.path());

        let builder = RegistryBuilder::new().unwrap();
        let categories = builder.docs_section(&temp_dir.path().join("docs"), &IndexMap::new()).unwrap();

        let titles: Vec<_> = categories.iter().map(|c| c.title().unwrap()).collect();
        assert_eq!(titles, vec!["Getting Started", "Advanced"]);
        assert_eq!(categories[0].slug(), Some("getting-started"));
        assert_eq!(categories[1].order, Some(1));

        let docs: Vec<_> = categories[1].pages.iter().map(|d| d.title().unwrap()).collect();
        assert_eq!(docs, vec!["Tuning", "Plugins"]);
        assert_eq!(categories[1].pages[1].order, Some(1));
        assert_eq!(categories[1].pages[0].slug(), None);
    }

    #[test]
    fn test_front_matter_overrides_filename() {
        let temp_dir = TempDir::new().unwrap();
        sample_tree(temp_dir.path());

        let builder = RegistryBuilder::new().unwrap();
        let categories = builder.docs_section(&temp_dir.path().join("docs"), &IndexMap::new()).unwrap();
        let install = &categories[0].pages[0];

        assert_eq!(install.title.as_deref(), Some("Installing"));
        assert_eq!(install.slug(), Some("install"));
        assert_eq!(install.excerpt.as_deref(), Some("How to install"));
        assert!(install.body.as_deref().unwrap().ends_with("1-Install.md"));
        assert_eq!(categories[0].pages.len(), 1);
    }

    #[test]
    fn test_custom_pages() {
        let temp_dir = TempDir::new().unwrap();
        sample_tree(temp_dir.path());

        let builder = RegistryBuilder::new().unwrap();
        let pages = builder
            .custom_pages_section(&temp_dir.path().join("pages"), &IndexMap::new())
            .unwrap();

        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].title.as_deref(), Some("Landing Page"));
        assert_eq!(pages[0].slug(), Some("landing-page"));
    }

    #[test]
    fn test_build_from_file() {
        let temp_dir = TempDir::new().unwrap();
        sample_tree(temp_dir.path());

        let builder = RegistryBuilder::new().unwrap();
        let registry = builder
            .build_from_file(&temp_dir.path().join("buildSettings.json"))
            .unwrap();

        assert_eq!(registry.project_name(), "acme");
        assert_eq!(registry.versions(), vec!["v1.0"]);
        assert_eq!(registry.all_docs().len(), 3);
        let stylesheet = registry.content("v1.0").unwrap().appearance.stylesheet.clone().unwrap();
        assert_eq!(Path::new(&stylesheet), temp_dir.path().join("content/styles.css"));
    }

    #[test]
    fn test_pinned_slugs_win_over_titles() {
        let temp_dir = TempDir::new().unwrap();
        sample_tree(temp_dir.path());
        write(
            temp_dir.path(),
            "buildSettings.json",
            r#"{ "acme": { "v1.0": {
                "documentation": "docs",
                "customPages": "pages",
                "slugs": {
                    "categories": { "2-Getting Started": "quickstart-1" },
                    "customPages": { "Landing Page.html": "home" }
                }
            } } }"#,
        );

        let registry = RegistryBuilder::new()
            .unwrap()
            .build_from_file(&temp_dir.path().join("buildSettings.json"))
            .unwrap();

        let categories = registry.docs("v1.0").unwrap();
        assert_eq!(categories[0].title(), Some("Getting Started"));
        assert_eq!(categories[0].slug(), Some("quickstart-1"));
        assert_eq!(categories[1].slug(), Some("advanced"));
        assert_eq!(registry.pages("v1.0").unwrap()[0].slug(), Some("home"));
    }

    #[test]
    fn test_invalid_front_matter_names_the_file() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "docs/1-Intro/1-Bad.md", "---
title: [unclosed
---
body
");

        let err = RegistryBuilder::new()
            .unwrap()
            .docs_section(&temp_dir.path().join("docs"), &IndexMap::new())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(ref msg) if msg.contains("1-Bad.md")));
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let builder = RegistryBuilder::new().unwrap();
        assert!(builder
            .docs_section(&temp_dir.path().join("nope"), &IndexMap::new())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_bad_settings_file() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "buildSettings.json", "[1, 2]");
        let builder = RegistryBuilder::new().unwrap();
        let err = builder
            .build_from_file(&temp_dir.path().join("buildSettings.json"))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }
}
