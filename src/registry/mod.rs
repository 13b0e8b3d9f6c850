//! The registry: every tracked resource of one project, across versions.
//!
//! # Layout
//!
//! The registry mirrors its persisted form exactly:
//!
//! ```json
//! { "<project>": { "<version>": {
//!     "documentation": [Category, ...],
//!     "customPages": [CustomPage, ...],
//!     "customContent": { "appearance": { ... } }
//! } } }
//! ```
//!
//! The project name and version list are derived from the data itself:
//! two registries built from structurally identical JSON behave
//! identically. Key order is preserved, so versions keep the order they
//! were written in.
//!
//! # Flattening
//!
//! [`Registry::all_docs`] and friends return owned [`Entry`] copies with
//! version, position and parent linkage stamped on. The registry itself is
//! only mutated through [`Registry::apply_patch`], which writes server
//! responses back onto the record an entry was taken from.

pub mod builder;
pub mod diff;
pub mod file;

pub use builder::RegistryBuilder;
pub use diff::{Diff, Section, SectionKeys};

use std::path::Path;

use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::model::{
    Category, CustomContent, CustomPage, Document, Entry, ParentCategory, Position, Resource,
};
use crate::transport::ServerResource;

/// The three content sections held for every version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionSections {
    pub documentation: Vec<Category>,
    #[serde(rename = "customPages")]
    pub custom_pages: Vec<CustomPage>,
    #[serde(rename = "customContent")]
    pub custom_content: CustomContent,
}

/// Content tree for a single project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registry {
    project_name: String,
    versions: IndexMap<String, VersionSections>,
}

impl Registry {
    /// Build an empty skeleton with all sections present for each version.
    pub fn new<I, S>(project_name: impl Into<String>, versions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut registry = Self {
            project_name: project_name.into(),
            versions: IndexMap::new(),
        };
        for version in versions {
            registry.add_version(version);
        }
        registry
    }

    /// Add an empty version. Existing versions are left untouched.
    pub fn add_version(&mut self, version: impl Into<String>) {
        self.versions.entry(version.into()).or_default();
    }

    /// Insert or replace a version's sections wholesale.
    pub fn insert_version(&mut self, version: impl Into<String>, sections: VersionSections) {
        self.versions.insert(version.into(), sections);
    }

    #[must_use]
    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    /// Version keys, in stored order.
    #[must_use]
    pub fn versions(&self) -> Vec<&str> {
        self.versions.keys().map(String::as_str).collect()
    }

    #[must_use]
    pub fn has_version(&self, version: &str) -> bool {
        self.versions.contains_key(version)
    }

    fn unknown_version(&self, version: &str) -> Error {
        Error::UnknownVersion {
            project: self.project_name.clone(),
            version: version.to_string(),
        }
    }

    /// All three sections of one version.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownVersion`] if the version is not tracked.
    pub fn version(&self, version: &str) -> Result<&VersionSections> {
        self.versions
            .get(version)
            .ok_or_else(|| self.unknown_version(version))
    }

    fn version_mut(&mut self, version: &str) -> Result<&mut VersionSections> {
        if !self.versions.contains_key(version) {
            return Err(self.unknown_version(version));
        }
        self.versions
            .get_mut(version)
            .ok_or_else(|| Error::Other(format!("version '{version}' vanished")))
    }

    /// Documentation categories of one version.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownVersion`] if the version is not tracked.
    pub fn docs(&self, version: &str) -> Result<&[Category]> {
        Ok(&self.version(version)?.documentation)
    }

    /// # Errors
    ///
    /// Returns [`Error::UnknownVersion`] if the version is not tracked.
    pub fn docs_mut(&mut self, version: &str) -> Result<&mut Vec<Category>> {
        Ok(&mut self.version_mut(version)?.documentation)
    }

    /// Custom pages of one version.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownVersion`] if the version is not tracked.
    pub fn pages(&self, version: &str) -> Result<&[CustomPage]> {
        Ok(&self.version(version)?.custom_pages)
    }

    /// # Errors
    ///
    /// Returns [`Error::UnknownVersion`] if the version is not tracked.
    pub fn pages_mut(&mut self, version: &str) -> Result<&mut Vec<CustomPage>> {
        Ok(&mut self.version_mut(version)?.custom_pages)
    }

    /// Custom content of one version.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownVersion`] if the version is not tracked.
    pub fn content(&self, version: &str) -> Result<&CustomContent> {
        Ok(&self.version(version)?.custom_content)
    }

    /// # Errors
    ///
    /// Returns [`Error::UnknownVersion`] if the version is not tracked.
    pub fn content_mut(&mut self, version: &str) -> Result<&mut CustomContent> {
        Ok(&mut self.version_mut(version)?.custom_content)
    }

    // ── Flattening ────────────────────────────────────────────

    /// Every category across every version, stamped with version and order.
    #[must_use]
    pub fn all_doc_categories(&self) -> Vec<Entry<Category>> {
        self.versions
            .iter()
            .flat_map(|(version, sections)| {
                sections
                    .documentation
                    .iter()
                    .enumerate()
                    .map(move |(index, category)| {
                        let mut category = category.clone();
                        category.order = Some(index);
                        Entry::new(version.as_str(), index, Position::Category { index }, category)
                    })
            })
            .collect()
    }

    /// Every document across every category and version.
    ///
    /// Each entry carries its parent category's slug, title and id. Order
    /// is taken from the document's position in `pages`, never from the
    /// stored `order` field.
    #[must_use]
    pub fn all_docs(&self) -> Vec<Entry<Document>> {
        let mut docs = Vec::new();
        for (version, sections) in &self.versions {
            for (category_index, category) in sections.documentation.iter().enumerate() {
                let parent = ParentCategory {
                    slug: category.slug.clone(),
                    title: category.title.clone(),
                    id: category.id.clone(),
                };
                for (index, doc) in category.pages.iter().enumerate() {
                    let mut doc = doc.clone();
                    doc.order = Some(index);
                    let position = Position::Doc {
                        category: category_index,
                        index,
                    };
                    docs.push(
                        Entry::new(version.as_str(), index, position, doc)
                            .with_parent(parent.clone()),
                    );
                }
            }
        }
        docs
    }

    /// Every custom page across every version.
    #[must_use]
    pub fn all_custom_pages(&self) -> Vec<Entry<CustomPage>> {
        self.versions
            .iter()
            .flat_map(|(version, sections)| {
                sections
                    .custom_pages
                    .iter()
                    .enumerate()
                    .map(move |(index, page)| {
                        Entry::new(
                            version.as_str(),
                            index,
                            Position::CustomPage { index },
                            page.clone(),
                        )
                    })
            })
            .collect()
    }

    /// One content record per version.
    #[must_use]
    pub fn all_custom_content(&self) -> Vec<Entry<CustomContent>> {
        self.versions
            .iter()
            .map(|(version, sections)| {
                Entry::new(
                    version.as_str(),
                    0,
                    Position::Content,
                    sections.custom_content.clone(),
                )
            })
            .collect()
    }

    // ── Mutation ──────────────────────────────────────────────

    /// Write server-assigned fields back onto the record `entry` came from.
    ///
    /// Slug, title, excerpt and internal id are copied when the response
    /// carries them. Embedded newlines in the excerpt become spaces.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry's version or position no longer exists.
    pub fn apply_patch<T: Resource>(
        &mut self,
        entry: &Entry<T>,
        patch: &ServerResource,
    ) -> Result<()> {
        let missing = || {
            Error::InvalidRegistry(format!(
                "{} at {:?} is not in the registry",
                entry.resource.kind(),
                entry.position
            ))
        };

        let sections = self.version_mut(&entry.version)?;
        match entry.position {
            Position::Category { index } => {
                let category = sections.documentation.get_mut(index).ok_or_else(missing)?;
                patch.apply_to(category);
            }
            Position::Doc { category, index } => {
                let doc = sections
                    .documentation
                    .get_mut(category)
                    .and_then(|c| c.pages.get_mut(index))
                    .ok_or_else(missing)?;
                patch.apply_to(doc);
            }
            Position::CustomPage { index } => {
                let page = sections.custom_pages.get_mut(index).ok_or_else(missing)?;
                patch.apply_to(page);
            }
            Position::Content => {}
        }
        Ok(())
    }

    /// Drop server-only and positional fields from every record.
    fn strip_server_fields(&mut self) {
        for sections in self.versions.values_mut() {
            for category in &mut sections.documentation {
                category.id = None;
                category.order = None;
                for doc in &mut category.pages {
                    doc.id = None;
                    doc.order = None;
                }
            }
            for page in &mut sections.custom_pages {
                page.id = None;
            }
        }
    }

    // ── Serialization ─────────────────────────────────────────

    /// Raw structural serialization.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn export(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Build a registry from raw data.
    ///
    /// The first top-level key is the project name, its children are the
    /// versions. Every version must carry all three sections.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRegistry`] if the data does not have that shape.
    pub fn import(data: serde_json::Value) -> Result<Self> {
        let serde_json::Value::Object(map) = data else {
            return Err(Error::InvalidRegistry(
                "expected an object keyed by project name".to_string(),
            ));
        };

        let mut projects = map.into_iter();
        let Some((project_name, project)) = projects.next() else {
            return Err(Error::InvalidRegistry("no project found".to_string()));
        };
        let ignored: Vec<String> = projects.map(|(name, _)| name).collect();
        if !ignored.is_empty() {
            warn!(project = %project_name, ?ignored, "Registry holds extra projects; ignoring them");
        }

        let versions: IndexMap<String, VersionSections> = serde_json::from_value(project)
            .map_err(|e| Error::InvalidRegistry(format!("project '{project_name}': {e}")))?;

        Ok(Self {
            project_name,
            versions,
        })
    }

    /// Read and import a saved registry file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid registry.
    pub fn load(path: &Path) -> Result<Self> {
        let content = file::read_text(path)?;
        let data: serde_json::Value = serde_json::from_str(&content)
            .map_err(|e| Error::InvalidRegistry(format!("{}: {e}", path.display())))?;
        Self::import(data)
    }

    /// Persist the registry as a clean desired-state document.
    ///
    /// Server ids and positional order are stripped first, so the file
    /// holds nothing a diff or upload pass would have added.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the atomic write fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut stripped = self.clone();
        stripped.strip_server_fields();

        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        stripped.serialize(&mut serializer)?;
        buf.push(b'\n');

        file::atomic_write(path, &buf)?;
        debug!(path = %path.display(), project = %self.project_name, "Registry saved");
        Ok(())
    }

    /// Classify resources as added (here only) or deleted (`other` only).
    #[must_use]
    pub fn diff(&self, other: &Registry) -> Diff {
        Diff::compute(self, other)
    }
}

impl Serialize for Registry {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.project_name, &self.versions)?;
        map.end()
    }
}
