//! Writes downloaded content out to files.
//!
//! A freshly downloaded registry holds bodies inline. Extraction writes
//! each body to its own file and replaces it with the file's path, which
//! turns the snapshot into a registry the uploader can read back:
//!
//! ```text
//! <output>/<project>/
//!     buildSettings.json
//!     <version>/documentation/<i>-<category>/<j>-<doc>.md
//!     <version>/customPages/<title>.html
//!     <version>/customContent/appearance/{head.html,landing_page.html,styles.css}
//! ```
//!
//! Registry paths are relative to the base directory whenever the output
//! directory is. The generated `buildSettings.json` describes the same
//! tree relative to itself, so `upload --tree` picks up later edits. It
//! also pins every category and page slug that the builder would not
//! derive from the file name.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tracing::{debug, info};

use crate::error::Result;
use crate::markup::{FrontMatter, host_to_md, title_to_slug};
use crate::model::{Appearance, CustomContent, Document};
use crate::registry::builder::{BuildSettings, PinnedSlugs, VersionSettings};
use crate::registry::{Registry, file};

/// File name of the tree description written next to the content.
pub const BUILD_SETTINGS_FILE: &str = "buildSettings.json";

pub struct ContentExtractor {
    base_dir: PathBuf,
    output: PathBuf,
}

impl ContentExtractor {
    /// `output` is where the tree goes; relative outputs resolve against
    /// `base_dir` for writing but are stored relative.
    pub fn new(base_dir: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            output: output.into(),
        }
    }

    /// Extract every section of every version.
    ///
    /// Returns the path of the written build-settings file.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be written.
    pub fn extract(&self, registry: &mut Registry) -> Result<PathBuf> {
        let project = registry.project_name().to_string();
        let versions: Vec<String> = registry.versions().iter().map(ToString::to_string).collect();
        let mut settings: IndexMap<String, VersionSettings> = IndexMap::new();

        for version in &versions {
            let slugs = PinnedSlugs {
                categories: self.documentation(registry, &project, version)?,
                custom_pages: self.custom_pages(registry, &project, version)?,
            };
            let custom_content = self.custom_content(registry, &project, version)?;

            settings.insert(
                version.clone(),
                VersionSettings {
                    documentation: PathBuf::from(version).join("documentation"),
                    custom_pages: PathBuf::from(version).join("customPages"),
                    custom_content,
                    slugs,
                },
            );
        }

        let mut build: BuildSettings = IndexMap::new();
        build.insert(project.clone(), settings);
        let relative = self.project_dir(&project).join(BUILD_SETTINGS_FILE);
        let content = serde_json::to_string_pretty(&build)?;
        file::write_text(&self.base_dir.join(&relative), &format!("{content}\n"))?;

        info!(%project, versions = versions.len(), "Extracted content");
        Ok(relative)
    }

    fn project_dir(&self, project: &str) -> PathBuf {
        self.output.join(project)
    }

    /// Write `content` under the base directory, returning the stored path.
    fn save(&self, relative: &Path, content: &str) -> Result<String> {
        file::write_text(&self.base_dir.join(relative), content)?;
        debug!(path = %relative.display(), "Wrote");
        Ok(relative.to_string_lossy().into_owned())
    }

    /// Returns the category slugs to pin, keyed by directory name.
    fn documentation(
        &self,
        registry: &mut Registry,
        project: &str,
        version: &str,
    ) -> Result<IndexMap<String, String>> {
        let root = self.project_dir(project).join(version).join("documentation");
        let mut pinned = IndexMap::new();
        for (i, category) in registry.docs_mut(version)?.iter_mut().enumerate() {
            let title = file_name(category.title.as_deref().unwrap_or_default());
            let dir_name = format!("{i}-{title}");
            pin(&mut pinned, &dir_name, &title, category.slug.as_deref());
            let dir = root.join(&dir_name);
            for (j, doc) in category.pages.iter_mut().enumerate() {
                let name = format!("{j}-{}.md", file_name(doc.title.as_deref().unwrap_or_default()));
                let text = markdown_file(doc)?;
                doc.body = Some(self.save(&dir.join(name), &text)?);
            }
        }
        Ok(pinned)
    }

    /// Returns the page slugs to pin, keyed by file name.
    fn custom_pages(
        &self,
        registry: &mut Registry,
        project: &str,
        version: &str,
    ) -> Result<IndexMap<String, String>> {
        let root = self.project_dir(project).join(version).join("customPages");
        let mut pinned = IndexMap::new();
        for page in registry.pages_mut(version)? {
            let stem = file_name(page.title.as_deref().unwrap_or_default());
            if let Some(html) = page.html.take() {
                let name = format!("{stem}.html");
                pin(&mut pinned, &name, &stem, page.slug.as_deref());
                page.html = Some(self.save(&root.join(name), &html)?);
            }
            if let Some(body) = page.body.take() {
                page.body = Some(self.save(&root.join(format!("{stem}.md")), &body)?);
            }
        }
        Ok(pinned)
    }

    /// Returns the same content with paths relative to the project
    /// directory, for the build settings.
    fn custom_content(
        &self,
        registry: &mut Registry,
        project: &str,
        version: &str,
    ) -> Result<CustomContent> {
        let within_project = Path::new(version).join("customContent").join("appearance");
        let root = self.project_dir(project).join(&within_project);

        let appearance: &mut Appearance = &mut registry.content_mut(version)?.appearance;
        let mut relative = Appearance::default();
        for (slot, settings_slot, name) in [
            (&mut appearance.html_head, &mut relative.html_head, "head.html"),
            (&mut appearance.html_body, &mut relative.html_body, "landing_page.html"),
            (&mut appearance.stylesheet, &mut relative.stylesheet, "styles.css"),
        ] {
            if let Some(text) = slot.take() {
                *slot = Some(self.save(&root.join(name), &text)?);
                *settings_slot = Some(within_project.join(name).to_string_lossy().into_owned());
            }
        }
        Ok(CustomContent {
            appearance: relative,
        })
    }
}

/// Front matter from the record, then the body with code widgets
/// turned back into fenced blocks.
fn markdown_file(doc: &Document) -> Result<String> {
    let meta = FrontMatter {
        title: doc.title.clone(),
        slug: doc.slug.clone(),
        excerpt: doc.excerpt.clone(),
        doc_type: doc.doc_type.clone(),
    };
    let body = host_to_md(doc.body.as_deref().unwrap_or_default())?;
    Ok(format!("{}{body}", meta.render()?))
}

/// Record `slug` under `name` when the builder would derive another one
/// from `title`.
fn pin(pinned: &mut IndexMap<String, String>, name: &str, title: &str, slug: Option<&str>) {
    if let Some(slug) = slug.filter(|s| !s.is_empty() && *s != title_to_slug(title)) {
        pinned.insert(name.to_string(), slug.to_string());
    }
}

/// A title made safe to use as one path component.
fn file_name(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '\0' => '-',
            c => c,
        })
        .collect();
    let trimmed = cleaned.trim().trim_matches('.');
    if trimmed.is_empty() {
        "untitled".to_string()
    } else {
        trimmed.to_string()
    }
}
