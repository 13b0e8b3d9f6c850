//! Project version tag.

use serde::{Deserialize, Serialize};

use super::resource::{Resource, ResourceKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    pub version: String,
}

impl Version {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
        }
    }
}

impl Resource for Version {
    const KIND: ResourceKind = ResourceKind::Version;

    fn slug(&self) -> Option<&str> {
        None
    }

    fn title(&self) -> Option<&str> {
        Some(&self.version)
    }
}
