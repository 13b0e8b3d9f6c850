//! In-memory transport for engine tests.
//!
//! Serves a fixed remote snapshot, records every call, and fails any
//! call whose slug or payload title is on its failure list.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::{Value, json};

use crate::markup::title_to_slug;
use crate::model::{ResourceKind, Version};
use crate::registry::Registry;

use super::{ResourceTransport, SectionKind, ServerResource, TransportError, TransportResult};

/// One recorded call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    FetchVersions,
    FetchSection {
        version: String,
        section: SectionKind,
    },
    Create {
        version: String,
        kind: ResourceKind,
        parent: Option<String>,
        body: Value,
    },
    Update {
        version: String,
        kind: ResourceKind,
        slug: String,
        body: Value,
    },
    Delete {
        version: String,
        kind: ResourceKind,
        slug: String,
    },
    Order {
        version: String,
        kind: ResourceKind,
        payload: Value,
    },
}

#[derive(Default)]
pub struct MockTransport {
    versions: Vec<String>,
    sections: HashMap<(String, SectionKind), Value>,
    failing: HashSet<String>,
    calls: Mutex<Vec<Call>>,
    next_id: AtomicUsize,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `registry` as the remote snapshot.
    pub fn with_remote(registry: &Registry) -> Self {
        let mut mock = Self::new();
        for version in registry.versions() {
            let Ok(sections) = registry.version(version) else {
                continue;
            };
            mock.versions.push(version.to_string());
            mock.sections.insert(
                (version.to_string(), SectionKind::Documentation),
                serde_json::to_value(&sections.documentation).unwrap(),
            );
            mock.sections.insert(
                (version.to_string(), SectionKind::CustomPages),
                serde_json::to_value(&sections.custom_pages).unwrap(),
            );
            mock.sections.insert(
                (version.to_string(), SectionKind::CustomContent),
                serde_json::to_value(&sections.custom_content).unwrap(),
            );
        }
        mock
    }

    /// Fail every call that names `needle` as slug or payload title.
    pub fn failing(mut self, needle: &str) -> Self {
        self.failing.insert(needle.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn check(&self, slug: Option<&str>, body: Option<&Value>) -> TransportResult<()> {
        let title = body.and_then(|b| b.get("title")).and_then(Value::as_str);
        let hit = [slug, title]
            .into_iter()
            .flatten()
            .any(|s| self.failing.contains(s));
        if hit {
            return Err(TransportError::Http {
                status: 500,
                body: "mock failure".to_string(),
            });
        }
        Ok(())
    }

    fn respond(&self, kind: ResourceKind, slug: String, body: &Value) -> ServerResource {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        ServerResource {
            slug: Some(slug),
            title: body.get("title").and_then(Value::as_str).map(String::from),
            excerpt: body.get("excerpt").and_then(Value::as_str).map(String::from),
            id: Some(format!("{kind}-{n}")),
            ..ServerResource::default()
        }
    }
}

impl ResourceTransport for MockTransport {
    async fn fetch_versions(&self, _project: &str) -> TransportResult<Vec<Version>> {
        self.record(Call::FetchVersions);
        Ok(self.versions.iter().map(Version::new).collect())
    }

    async fn fetch_section(
        &self,
        _project: &str,
        version: &str,
        section: SectionKind,
    ) -> TransportResult<Value> {
        self.record(Call::FetchSection {
            version: version.to_string(),
            section,
        });
        Ok(self
            .sections
            .get(&(version.to_string(), section))
            .cloned()
            .unwrap_or_else(|| match section {
                SectionKind::CustomContent => json!({ "appearance": {} }),
                _ => json!([]),
            }))
    }

    async fn create_resource(
        &self,
        _project: &str,
        version: &str,
        kind: ResourceKind,
        parent_slug: Option<&str>,
        body: &Value,
    ) -> TransportResult<ServerResource> {
        self.record(Call::Create {
            version: version.to_string(),
            kind,
            parent: parent_slug.map(String::from),
            body: body.clone(),
        });
        self.check(None, Some(body))?;

        // The host ignores requested slugs on create.
        let title = body.get("title").and_then(Value::as_str).unwrap_or("untitled");
        Ok(self.respond(kind, format!("{}-1", title_to_slug(title)), body))
    }

    async fn update_resource(
        &self,
        _project: &str,
        version: &str,
        kind: ResourceKind,
        slug: &str,
        body: &Value,
    ) -> TransportResult<ServerResource> {
        self.record(Call::Update {
            version: version.to_string(),
            kind,
            slug: slug.to_string(),
            body: body.clone(),
        });
        self.check(Some(slug), Some(body))?;

        let slug = body
            .get("slug")
            .and_then(Value::as_str)
            .unwrap_or(slug)
            .to_string();
        Ok(self.respond(kind, slug, body))
    }

    async fn delete_resource(
        &self,
        _project: &str,
        version: &str,
        kind: ResourceKind,
        slug: &str,
    ) -> TransportResult<()> {
        self.record(Call::Delete {
            version: version.to_string(),
            kind,
            slug: slug.to_string(),
        });
        self.check(Some(slug), None)
    }

    async fn set_order(
        &self,
        _project: &str,
        version: &str,
        kind: ResourceKind,
        payload: &Value,
    ) -> TransportResult<()> {
        self.record(Call::Order {
            version: version.to_string(),
            kind,
            payload: payload.clone(),
        });
        Ok(())
    }
}
