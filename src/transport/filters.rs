//! Normalization of payloads fetched from the host.
//!
//! Remote responses carry far more than the registry tracks (timestamps,
//! user records, flags). Every section passes through here so only the
//! whitelisted fields of each record reach a snapshot.

use serde_json::Value;

use crate::model::{Category, CustomContent, CustomPage, Resource, Version};

use super::{TransportError, TransportResult};

/// Replace embedded line breaks with single spaces.
#[must_use]
pub fn flatten_newlines(text: &str) -> String {
    text.replace("\r\n", " ").replace(['\n', '\r'], " ")
}

/// Version names always carry a leading `v`.
#[must_use]
pub fn normalize_version(version: &str) -> String {
    if version.starts_with('v') {
        version.to_string()
    } else {
        format!("v{version}")
    }
}

fn expect_array(value: Value, what: &str) -> TransportResult<Vec<Value>> {
    match value {
        Value::Array(items) => Ok(items),
        other => Err(TransportError::Malformed(format!(
            "expected a list of {what}, got {other}"
        ))),
    }
}

fn whitelist<T: Resource>(value: &Value) -> TransportResult<T> {
    T::from_properties(value).map_err(|e| TransportError::Malformed(e.to_string()))
}

/// `[{version: "1.0"}, ...]` into normalized [`Version`]s.
///
/// # Errors
///
/// Returns [`TransportError::Malformed`] if the payload is not a list of
/// version objects.
pub fn versions(value: Value) -> TransportResult<Vec<Version>> {
    expect_array(value, "versions")?
        .iter()
        .map(|item| {
            let version: Version = whitelist(item)?;
            Ok(Version::new(normalize_version(&version.version)))
        })
        .collect()
}

/// Categories with their pages, excerpts flattened.
///
/// # Errors
///
/// Returns [`TransportError::Malformed`] on an unexpected payload shape.
pub fn documentation(value: Value) -> TransportResult<Vec<Category>> {
    expect_array(value, "categories")?
        .iter()
        .map(|item| {
            let mut category: Category = whitelist(item)?;
            if let Some(excerpt) = category.excerpt.as_mut() {
                *excerpt = flatten_newlines(excerpt);
            }
            for doc in &mut category.pages {
                if let Some(excerpt) = doc.excerpt.as_mut() {
                    *excerpt = flatten_newlines(excerpt);
                }
            }
            Ok(category)
        })
        .collect()
}

/// # Errors
///
/// Returns [`TransportError::Malformed`] on an unexpected payload shape.
pub fn custom_pages(value: Value) -> TransportResult<Vec<CustomPage>> {
    expect_array(value, "custom pages")?
        .iter()
        .map(whitelist)
        .collect()
}

/// The appearance block of a version. A missing block is empty content.
///
/// # Errors
///
/// Returns [`TransportError::Malformed`] if the payload is not an object.
pub fn custom_content(value: Value) -> TransportResult<CustomContent> {
    if !value.is_object() {
        return Err(TransportError::Malformed(format!(
            "expected a content object, got {value}"
        )));
    }
    whitelist(&value)
}
