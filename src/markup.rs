//! Text transforms between local markdown files and the host's format.
//!
//! - Slugs derived from titles
//! - `---` front matter carrying per-document metadata
//! - Fenced code blocks converted to and from the host's `[block:code]` widgets

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{Error, Result};

const FENCED_CODE: &str = r"```([a-z]+)\n((?:[^`]|\\`)+)```";
const HOST_CODE: &str = r"(?s)\[block:code\]\s*(\{.*?\})\s*\[/block\]";

/// Lowercase ASCII alphanumerics joined by single dashes.
///
/// `"Category. Two."` becomes `"category-two"`.
#[must_use]
pub fn title_to_slug(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut gap = false;

    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            if gap && !slug.is_empty() {
                slug.push('-');
            }
            gap = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            gap = true;
        }
    }

    slug
}

/// Metadata block at the top of a markdown document.
///
/// Parsed as YAML; unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrontMatter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<String>,
}

impl FrontMatter {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.slug.is_none() && self.excerpt.is_none() && self.doc_type.is_none()
    }

    /// Render as a `---` block, or nothing when empty.
    ///
    /// # Errors
    ///
    /// Returns an error if YAML serialization fails.
    pub fn render(&self) -> Result<String> {
        if self.is_empty() {
            return Ok(String::new());
        }
        let yaml = serde_yaml::to_string(self)
            .map_err(|e| Error::Other(format!("Failed to render front matter: {e}")))?;
        Ok(format!("---\n{yaml}---\n"))
    }
}

/// Split leading front matter from the rest of the document.
///
/// Text without a complete `---` block comes back unchanged with empty
/// metadata.
///
/// # Errors
///
/// Returns the YAML error if the block is not a valid metadata mapping.
pub fn split_front_matter(text: &str) -> std::result::Result<(FrontMatter, &str), serde_yaml::Error> {
    let Some(rest) = text
        .strip_prefix("---\n")
        .or_else(|| text.strip_prefix("---\r\n"))
    else {
        return Ok((FrontMatter::default(), text));
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        let start = offset;
        offset += line.len();
        if line.trim_end() == "---" {
            let block = &rest[..start];
            let meta = if block.trim().is_empty() {
                FrontMatter::default()
            } else {
                serde_yaml::from_str(block)?
            };
            return Ok((meta, &rest[offset..]));
        }
    }

    Ok((FrontMatter::default(), text))
}

fn pretty(value: &serde_json::Value) -> String {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    match serde::Serialize::serialize(value, &mut serializer) {
        Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
        Err(_) => value.to_string(),
    }
}

fn code_block(code: &str, language: &str) -> String {
    let widget = json!({ "codes": [{ "code": code, "language": language }] });
    format!("[block:code]\n{}\n[/block]", pretty(&widget))
}

/// Convert fenced code blocks to the host's code widgets.
///
/// # Errors
///
/// Returns an error if the code-block pattern fails to compile.
pub fn md_to_host(markdown: &str) -> Result<String> {
    let fenced = Regex::new(FENCED_CODE).map_err(|e| Error::Other(e.to_string()))?;
    let converted = fenced.replace_all(markdown, |caps: &Captures<'_>| code_block(&caps[2], &caps[1]));
    Ok(converted.into_owned())
}

/// Convert the host's code widgets back to fenced code blocks.
///
/// Widgets that do not parse are left as they are.
///
/// # Errors
///
/// Returns an error if the widget pattern fails to compile.
pub fn host_to_md(text: &str) -> Result<String> {
    let widget = Regex::new(HOST_CODE).map_err(|e| Error::Other(e.to_string()))?;
    let converted = widget.replace_all(text, |caps: &Captures<'_>| {
        let parsed: Option<(String, String)> = serde_json::from_str::<serde_json::Value>(&caps[1])
            .ok()
            .and_then(|v| {
                let first = v.get("codes")?.get(0)?;
                Some((
                    first.get("code")?.as_str()?.to_string(),
                    first.get("language")?.as_str()?.to_string(),
                ))
            });
        match parsed {
            Some((code, language)) => format!("```{language}\n{code}```"),
            None => caps[0].to_string(),
        }
    });
    Ok(converted.into_owned())
}

/// Prepare a local markdown document for upload.
///
/// # Errors
///
/// Returns an error if the front matter is invalid or code-block
/// conversion fails.
pub fn document_body(text: &str) -> Result<String> {
    let (_, body) = split_front_matter(text)
        .map_err(|e| Error::InvalidArgument(format!("invalid front matter: {e}")))?;
    md_to_host(body)
}
