//! Per-version custom content (appearance).

use serde::{Deserialize, Serialize};

use super::resource::{Resource, ResourceKind};

/// Appearance payload. Each field is a path to the file holding the text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appearance {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_head: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_body: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stylesheet: Option<String>,
}

impl Appearance {
    /// Iterate over the `(field, value)` pairs that are set.
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("html_head", self.html_head.as_deref()),
            ("html_body", self.html_body.as_deref()),
            ("stylesheet", self.stylesheet.as_deref()),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name, v)))
    }
}

/// Singleton content record; exactly one per version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomContent {
    #[serde(default)]
    pub appearance: Appearance,
}

impl Resource for CustomContent {
    const KIND: ResourceKind = ResourceKind::Content;

    fn slug(&self) -> Option<&str> {
        None
    }
}
