//! Resource model for a documentation project.
//!
//! Every resource the remote host knows about is one of:
//! - [`Category`] - a group of documents, owning its ordered `pages`
//! - [`Document`] - a markdown page inside a category
//! - [`CustomPage`] - a standalone HTML page
//! - [`CustomContent`] - per-version appearance (landing page, stylesheet)
//! - [`Version`] - a version tag such as `v1.0`
//!
//! The records are plain serde structs holding exactly the fields the sync
//! engine tracks. Positional and linkage context (version, parent category,
//! order, upload method) is never stored on them; flattening a registry
//! yields [`Entry`] copies that carry it instead.

pub mod category;
pub mod custom_content;
pub mod custom_page;
pub mod document;
pub mod entry;
pub mod resource;
pub mod version;

pub use category::Category;
pub use custom_content::{Appearance, CustomContent};
pub use custom_page::CustomPage;
pub use document::Document;
pub use entry::{Entry, ParentCategory, Position};
pub use resource::{Resource, ResourceKey, ResourceKind, UploadMethod};
pub use version::Version;
