//! Pushes a local registry to the remote host.
//!
//! Each phase diffs the local registry against the shared remote snapshot,
//! tags every entry as a create or an update, and dispatches one request
//! per entry with bounded concurrency. Server responses are patched back
//! onto the registry once the whole batch has resolved; failures are
//! marked on the returned entries and never abort the phase.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde_json::{Map, Value, json};
use tracing::{debug, info, warn};

use crate::config::SyncSettings;
use crate::error::Result;
use crate::markup::document_body;
use crate::model::{
    Category, CustomContent, CustomPage, Document, Entry, Position, Resource, ResourceKind,
    UploadMethod,
};
use crate::registry::{Diff, Registry, Section, file};
use crate::transport::{ResourceTransport, ServerResource, run_batch};

use super::downloader::Downloader;
use super::types::{Batch, OrderOutcome, UploadPlan, UploadSummary};

const PARENT_UNRESOLVED: &str = "parent category unresolved";

/// One outgoing create or update, detached from the registry.
#[derive(Debug, Clone)]
struct Request {
    method: UploadMethod,
    kind: ResourceKind,
    version: String,
    /// Slug addressed by an update.
    slug: Option<String>,
    /// Category a document is created under.
    parent: Option<String>,
    body: Value,
    /// Slug to force onto a freshly created document.
    custom_slug: Option<String>,
}

/// What came back for one request. A follow-up failure after a
/// successful create carries both.
#[derive(Debug, Default)]
struct Reply {
    patch: Option<ServerResource>,
    failure: Option<String>,
}

impl Reply {
    fn ok(patch: ServerResource) -> Self {
        Self {
            patch: Some(patch),
            failure: None,
        }
    }

    fn failed(reason: impl Into<String>) -> Self {
        Self {
            patch: None,
            failure: Some(reason.into()),
        }
    }
}

pub struct Uploader<'a, T> {
    transport: &'a T,
    downloader: &'a Downloader<'a, T>,
    settings: &'a SyncSettings,
}

impl<'a, T: ResourceTransport> Uploader<'a, T> {
    pub fn new(
        transport: &'a T,
        downloader: &'a Downloader<'a, T>,
        settings: &'a SyncSettings,
    ) -> Self {
        Self {
            transport,
            downloader,
            settings,
        }
    }

    /// Diff `registry` against the (cached) remote snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote snapshot cannot be fetched.
    pub async fn diff(&self, registry: &Registry) -> Result<Diff> {
        let remote = self.downloader.remote_registry().await?;
        Ok(registry.diff(remote))
    }

    /// Create/update decisions for every category, doc and custom page.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote snapshot cannot be fetched.
    pub async fn plan(&self, registry: &Registry) -> Result<UploadPlan> {
        let diff = self.diff(registry).await?;
        Ok(UploadPlan {
            categories: tagged(registry.all_doc_categories(), &diff, Section::DocCategories),
            docs: tagged(registry.all_docs(), &diff, Section::Docs),
            custom_pages: tagged(registry.all_custom_pages(), &diff, Section::CustomPages),
        })
    }

    // ── Resource phases ───────────────────────────────────────

    /// Create or update every documentation category.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote snapshot cannot be fetched or a
    /// response cannot be written back to the registry.
    pub async fn upload_doc_categories(&self, registry: &mut Registry) -> Result<Batch<Category>> {
        let diff = self.diff(registry).await?;
        let entries = tagged(registry.all_doc_categories(), &diff, Section::DocCategories);
        info!(count = entries.len(), "Uploading documentation categories");

        let requests = entries
            .iter()
            .map(|entry| Ok(Request::for_entry(entry, category_body(&entry.resource))))
            .collect();
        self.dispatch(registry, entries, requests).await
    }

    /// Create or update every document.
    ///
    /// Documents under a category in `categories` that failed, or under a
    /// category that still has no slug, are marked failed and not sent.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote snapshot cannot be fetched or a
    /// response cannot be written back to the registry.
    pub async fn upload_documents(
        &self,
        registry: &mut Registry,
        categories: &Batch<Category>,
    ) -> Result<Batch<Document>> {
        let failed_parents: HashSet<(&str, usize)> = categories
            .failed()
            .filter_map(|entry| match entry.position {
                Position::Category { index } => Some((entry.version.as_str(), index)),
                _ => None,
            })
            .collect();

        let diff = self.diff(registry).await?;
        let entries = tagged(registry.all_docs(), &diff, Section::Docs);
        info!(count = entries.len(), "Uploading documents");

        let requests = entries
            .iter()
            .map(|entry| {
                let parent_failed = match entry.position {
                    Position::Doc { category, .. } => {
                        failed_parents.contains(&(entry.version.as_str(), category))
                    }
                    _ => false,
                };
                if parent_failed || entry.parent_slug().is_none() {
                    return Err(PARENT_UNRESOLVED.to_string());
                }

                let body = self.doc_body(&entry.resource)?;
                let mut request = Request::for_entry(entry, body);
                if request.method == UploadMethod::Create {
                    request.custom_slug = entry.slug().map(String::from);
                }
                Ok(request)
            })
            .collect();
        self.dispatch(registry, entries, requests).await
    }

    /// Categories, then the documents inside them.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote snapshot cannot be fetched or a
    /// response cannot be written back to the registry.
    pub async fn upload_docs(
        &self,
        registry: &mut Registry,
    ) -> Result<(Batch<Category>, Batch<Document>)> {
        let categories = self.upload_doc_categories(registry).await?;
        let docs = self.upload_documents(registry, &categories).await?;
        Ok((categories, docs))
    }

    /// Create or update every custom page.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote snapshot cannot be fetched or a
    /// response cannot be written back to the registry.
    pub async fn upload_custom_pages(&self, registry: &mut Registry) -> Result<Batch<CustomPage>> {
        let diff = self.diff(registry).await?;
        let entries = tagged(registry.all_custom_pages(), &diff, Section::CustomPages);
        info!(count = entries.len(), "Uploading custom pages");

        let requests = entries
            .iter()
            .map(|entry| {
                let body = self.page_body(&entry.resource)?;
                Ok(Request::for_entry(entry, body))
            })
            .collect();
        self.dispatch(registry, entries, requests).await
    }

    /// Send every version's appearance content. Always an update.
    ///
    /// # Errors
    ///
    /// Returns an error if a response cannot be written back to the registry.
    pub async fn upload_custom_content(
        &self,
        registry: &mut Registry,
    ) -> Result<Batch<CustomContent>> {
        let mut entries = registry.all_custom_content();
        for entry in &mut entries {
            entry.method = Some(UploadMethod::Update);
        }
        info!(count = entries.len(), "Uploading custom content");

        let requests = entries
            .iter()
            .map(|entry| {
                let body = self.content_body(&entry.resource)?;
                Ok(Request {
                    slug: Some(String::new()),
                    ..Request::for_entry(entry, body)
                })
            })
            .collect();
        self.dispatch(registry, entries, requests).await
    }

    // ── Ordering ──────────────────────────────────────────────

    /// One `{id: order}` request per version. Categories without an id
    /// are left out.
    pub async fn upload_doc_categories_order(&self, registry: &Registry) -> Vec<OrderOutcome> {
        let mut per_version: IndexMap<String, (Map<String, Value>, usize)> = IndexMap::new();
        for version in registry.versions() {
            per_version.insert(version.to_string(), (Map::new(), 0));
        }

        for entry in registry.all_doc_categories() {
            let Some((ids, skipped)) = per_version.get_mut(&entry.version) else {
                continue;
            };
            match entry.resource.id.as_deref() {
                Some(id) => {
                    ids.insert(id.to_string(), json!(entry.order));
                }
                None => {
                    debug!(version = %entry.version, title = ?entry.resource.title(), "Category has no id; left out of ordering");
                    *skipped += 1;
                }
            }
        }

        let requests = per_version
            .into_iter()
            .map(|(version, (ids, skipped))| (version, ids.len(), skipped, Value::Object(ids)))
            .collect::<Vec<_>>();
        self.send_orders(ResourceKind::Category, requests).await
    }

    /// One `[{id, parentCategory, order}]` request per version. Documents
    /// without an id, or whose category has none, are left out.
    pub async fn upload_docs_order(&self, registry: &Registry) -> Vec<OrderOutcome> {
        let mut per_version: IndexMap<String, (Vec<Value>, usize)> = IndexMap::new();
        for version in registry.versions() {
            per_version.insert(version.to_string(), (Vec::new(), 0));
        }

        for entry in registry.all_docs() {
            let Some((items, skipped)) = per_version.get_mut(&entry.version) else {
                continue;
            };
            let parent_id = entry.parent.as_ref().and_then(|p| p.id.as_deref());
            match (entry.resource.id.as_deref(), parent_id) {
                (Some(id), Some(parent_id)) => items.push(json!({
                    "id": id,
                    "parentCategory": parent_id,
                    "order": entry.order,
                })),
                _ => {
                    debug!(version = %entry.version, slug = ?entry.slug(), "Document has no id; left out of ordering");
                    *skipped += 1;
                }
            }
        }

        let requests = per_version
            .into_iter()
            .map(|(version, (items, skipped))| (version, items.len(), skipped, Value::Array(items)))
            .collect::<Vec<_>>();
        self.send_orders(ResourceKind::Doc, requests).await
    }

    async fn send_orders(
        &self,
        kind: ResourceKind,
        requests: Vec<(String, usize, usize, Value)>,
    ) -> Vec<OrderOutcome> {
        let project = self.settings.project_name.as_str();
        run_batch(
            requests,
            self.settings.concurrency,
            |(version, sent, skipped, payload)| async move {
                let failure = if sent == 0 {
                    debug!(%version, %kind, "Nothing to order");
                    None
                } else {
                    self.transport
                        .set_order(project, &version, kind, &payload)
                        .await
                        .err()
                        .map(|e| {
                            warn!(%version, %kind, error = %e, "Ordering failed");
                            e.to_string()
                        })
                };
                OrderOutcome {
                    version,
                    kind,
                    sent,
                    skipped,
                    failure,
                }
            },
        )
        .await
    }

    /// Every phase, strictly in sequence: categories, documents, custom
    /// pages, custom content, category order, document order.
    ///
    /// # Errors
    ///
    /// Returns an error only if the remote snapshot cannot be fetched or
    /// the registry no longer matches its own entries. Per-resource
    /// failures are reported in the summary.
    pub async fn upload_all(&self, registry: &mut Registry) -> Result<UploadSummary> {
        info!(project = %registry.project_name(), "Uploading");

        let categories = self.upload_doc_categories(registry).await?;
        let docs = self.upload_documents(registry, &categories).await?;
        let custom_pages = self.upload_custom_pages(registry).await?;
        let custom_content = self.upload_custom_content(registry).await?;
        let category_order = self.upload_doc_categories_order(registry).await;
        let doc_order = self.upload_docs_order(registry).await;

        Ok(UploadSummary {
            categories,
            docs,
            custom_pages,
            custom_content,
            category_order,
            doc_order,
        })
    }

    // ── Dispatch ──────────────────────────────────────────────

    /// Send every prepared request, then patch results back in input order.
    ///
    /// `requests[i]` belongs to `entries[i]`; an `Err` there fails the
    /// entry without sending anything.
    async fn dispatch<R: Resource>(
        &self,
        registry: &mut Registry,
        mut entries: Vec<Entry<R>>,
        requests: Vec<std::result::Result<Request, String>>,
    ) -> Result<Batch<R>> {
        let mut pending = Vec::new();
        for (i, request) in requests.into_iter().enumerate() {
            match request {
                Ok(request) => pending.push((i, request)),
                Err(reason) => {
                    if let Some(entry) = entries.get_mut(i) {
                        warn!(entry = %entry, %reason, "Not uploaded");
                        entry.mark_failed(reason);
                    }
                }
            }
        }

        let replies = run_batch(pending, self.settings.concurrency, |(i, request)| async move {
            (i, self.send(request).await)
        })
        .await;

        for (i, reply) in replies {
            let Some(entry) = entries.get_mut(i) else {
                continue;
            };
            if let Some(patch) = &reply.patch {
                registry.apply_patch(entry, patch)?;
                patch.apply_to(&mut entry.resource);
            }
            match reply.failure {
                Some(reason) => {
                    warn!(entry = %entry, %reason, "Upload failed");
                    entry.mark_failed(reason);
                }
                None => debug!(entry = %entry, "Uploaded"),
            }
        }

        Ok(Batch::new(entries))
    }

    /// Create or update one resource, then apply a custom slug the host
    /// ignored on create.
    ///
    /// A failed follow-up still hands back the create's fields: the
    /// resource exists remotely under the assigned slug, and recording it
    /// keeps the next run from creating it a second time. The entry is
    /// marked failed, and the reason names both slugs so the custom one
    /// can be set again by hand or from the source file.
    async fn send(&self, request: Request) -> Reply {
        let project = self.settings.project_name.as_str();
        let version = request.version.as_str();

        let result = match request.method {
            UploadMethod::Create => {
                self.transport
                    .create_resource(
                        project,
                        version,
                        request.kind,
                        request.parent.as_deref(),
                        &request.body,
                    )
                    .await
            }
            UploadMethod::Update => {
                let slug = request.slug.as_deref().unwrap_or_default();
                self.transport
                    .update_resource(project, version, request.kind, slug, &request.body)
                    .await
            }
        };
        let created = match result {
            Ok(created) => created,
            Err(e) => return Reply::failed(e.to_string()),
        };

        let Some(desired) = request.custom_slug.as_deref() else {
            return Reply::ok(created);
        };
        let Some(assigned) = created.slug.as_deref().filter(|s| *s != desired) else {
            return Reply::ok(created);
        };

        // The host ignores slugs on create; set it on the new resource.
        debug!(%version, %assigned, %desired, "Applying custom slug");
        let mut body = request.body;
        if let Value::Object(fields) = &mut body {
            fields.insert("slug".to_string(), json!(desired));
        }
        match self
            .transport
            .update_resource(project, version, request.kind, assigned, &body)
            .await
        {
            Ok(mut updated) => {
                if updated.slug.as_deref().is_none_or(str::is_empty) {
                    updated.slug = Some(desired.to_string());
                }
                if updated.id.is_none() {
                    updated.id.clone_from(&created.id);
                }
                Reply::ok(updated)
            }
            Err(e) => {
                let reason = format!("created as '{assigned}', custom slug '{desired}' not applied: {e}");
                Reply {
                    patch: Some(created),
                    failure: Some(reason),
                }
            }
        }
    }

    // ── Payloads ──────────────────────────────────────────────

    fn read(&self, path: &str) -> std::result::Result<String, String> {
        let resolved = self.settings.resolve(path);
        file::read_text(&resolved).map_err(|e| format!("cannot read {}: {e}", resolved.display()))
    }

    fn doc_body(&self, doc: &Document) -> std::result::Result<Value, String> {
        let mut fields = Map::new();
        insert_opt(&mut fields, "title", doc.title.as_deref());
        insert_opt(&mut fields, "excerpt", doc.excerpt.as_deref());
        if let Some(path) = doc.body.as_deref() {
            let text = self.read(path)?;
            let body = document_body(&text).map_err(|e| e.to_string())?;
            fields.insert("body".to_string(), Value::String(body));
        }
        insert_opt(&mut fields, "type", doc.doc_type.as_deref());
        Ok(Value::Object(fields))
    }

    fn page_body(&self, page: &CustomPage) -> std::result::Result<Value, String> {
        let mut fields = Map::new();
        insert_opt(&mut fields, "title", page.title.as_deref());
        if let Some(path) = page.body.as_deref() {
            fields.insert("body".to_string(), Value::String(self.read(path)?));
        }
        if let Some(path) = page.html.as_deref() {
            fields.insert("html".to_string(), Value::String(self.read(path)?));
        }
        Ok(Value::Object(fields))
    }

    fn content_body(&self, content: &CustomContent) -> std::result::Result<Value, String> {
        let mut appearance = Map::new();
        for (field, path) in content.appearance.fields() {
            appearance.insert(field.to_string(), Value::String(self.read(path)?));
        }
        Ok(json!({ "appearance": appearance }))
    }
}

impl Request {
    fn for_entry<R: Resource>(entry: &Entry<R>, body: Value) -> Self {
        let method = entry.method.unwrap_or(UploadMethod::Create);
        Self {
            method,
            kind: R::KIND,
            version: entry.version.clone(),
            slug: entry.slug().map(String::from),
            parent: entry.parent_slug().map(String::from),
            body,
            custom_slug: None,
        }
    }
}

/// Tag every entry as a create or an update.
///
/// No slug, or a slug the remote doesn't know, means create.
fn tagged<R: Resource>(mut entries: Vec<Entry<R>>, diff: &Diff, section: Section) -> Vec<Entry<R>> {
    for entry in &mut entries {
        let method = if diff.is_added(section, entry.slug(), &entry.version) {
            UploadMethod::Create
        } else {
            UploadMethod::Update
        };
        entry.method = Some(method);
    }
    entries
}

fn category_body(category: &Category) -> Value {
    let mut fields = Map::new();
    insert_opt(&mut fields, "title", category.title.as_deref());
    Value::Object(fields)
}

fn insert_opt(fields: &mut Map<String, Value>, key: &str, value: Option<&str>) {
    if let Some(value) = value {
        fields.insert(key.to_string(), Value::String(value.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::tests::sample_registry;
    use crate::transport::mock::{Call, MockTransport};
    use tempfile::TempDir;

    /// Local registry plus the files its paths point at.
    fn local_fixture() -> (TempDir, Registry) {
        let temp_dir = TempDir::new().unwrap();
        let registry = sample_registry();
        for doc in registry.all_docs() {
            let path = doc.resource.body.clone().unwrap();
            file::write_text(
                &temp_dir.path().join(path),
                &format!("---\ntitle: ignored\n---\n# {}\n", doc.resource.title.unwrap()),
            )
            .unwrap();
        }
        for page in registry.all_custom_pages() {
            file::write_text(&temp_dir.path().join(page.resource.html.unwrap()), "<h1>Hi</h1>")
                .unwrap();
        }
        for content in registry.all_custom_content() {
            for (_, path) in content.resource.appearance.fields() {
                file::write_text(&temp_dir.path().join(path), "body { }").unwrap();
            }
        }
        (temp_dir, registry)
    }

    fn settings(dir: &TempDir) -> SyncSettings {
        SyncSettings::new("github-upload")
            .with_base_dir(dir.path())
            .with_concurrency(3)
    }

    #[tokio::test]
    async fn test_tagging_follows_diff() {
        let (temp_dir, local) = local_fixture();
        let mut remote = sample_registry();
        // Remote doesn't know `install` yet
        remote.docs_mut("v2.0").unwrap()[0].pages.remove(1);

        let transport = MockTransport::with_remote(&remote);
        let settings = settings(&temp_dir);
        let downloader = Downloader::new(&transport, &settings);
        let uploader = Uploader::new(&transport, &downloader, &settings);

        let plan = uploader.plan(&local).await.unwrap();
        let method = |slug: Option<&str>, title: &str| {
            plan.docs
                .iter()
                .find(|d| d.slug() == slug && d.resource.title.as_deref() == Some(title))
                .and_then(|d| d.method)
                .unwrap()
        };
        assert_eq!(method(Some("install"), "Install"), UploadMethod::Create);
        assert_eq!(method(None, "Tuning"), UploadMethod::Create);
        assert_eq!(method(Some("plugins"), "Plugins"), UploadMethod::Update);
        assert!(plan.categories.iter().all(|c| c.method == Some(UploadMethod::Update)));
    }

    #[tokio::test]
    async fn test_custom_slug_follow_up() {
        let (temp_dir, mut local) = local_fixture();
        // Remote is empty: everything is a create
        let transport = MockTransport::with_remote(&Registry::new("github-upload", ["v2.0", "v1.0"]));
        let settings = settings(&temp_dir);
        let downloader = Downloader::new(&transport, &settings);
        let uploader = Uploader::new(&transport, &downloader, &settings);

        let (categories, docs) = uploader.upload_docs(&mut local).await.unwrap();
        assert_eq!(categories.failed_count(), 0);
        assert_eq!(docs.failed_count(), 0);

        // Mock create answers `<title-slug>-1`; `faq` differs and gets one follow-up
        let follow_ups: Vec<_> = transport
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Update { version, kind: ResourceKind::Doc, slug, body } if version == "v1.0" => {
                    Some((slug, body["slug"].clone()))
                }
                _ => None,
            })
            .collect();
        assert!(follow_ups.contains(&("faq-1".to_string(), json!("faq"))));
        assert_eq!(follow_ups.iter().filter(|(_, desired)| desired == "faq").count(), 1);

        let stored: Vec<_> = local.docs("v1.0").unwrap()[0]
            .pages
            .iter()
            .map(|d| d.slug.clone().unwrap())
            .collect();
        assert_eq!(stored, vec!["getting-started", "old-page", "faq"]);

        // No slug of its own: no follow-up, server slug kept
        let tuning = &local.docs("v2.0").unwrap()[1].pages[0];
        assert_eq!(tuning.slug.as_deref(), Some("tuning-1"));
    }

    #[tokio::test]
    async fn test_failed_custom_slug_keeps_created_resource() {
        let (temp_dir, mut local) = local_fixture();
        let transport = MockTransport::with_remote(&Registry::new("github-upload", ["v2.0", "v1.0"]))
            .failing("faq-1");
        let settings = settings(&temp_dir);
        let downloader = Downloader::new(&transport, &settings);
        let uploader = Uploader::new(&transport, &downloader, &settings);

        let (_, docs) = uploader.upload_docs(&mut local).await.unwrap();

        let failed: Vec<_> = docs.failed().collect();
        assert_eq!(failed.len(), 1);
        let reason = failed[0].failure.as_deref().unwrap();
        assert!(reason.starts_with("created as 'faq-1', custom slug 'faq' not applied"));

        // Recorded under the slug the host assigned, so a re-run updates it
        let faq = &local.docs("v1.0").unwrap()[0].pages[2];
        assert_eq!(faq.slug.as_deref(), Some("faq-1"));
        assert!(faq.id.is_some());
        assert_eq!(
            transport.count(|c| matches!(c, Call::Create { body, .. } if body["title"] == "FAQ")),
            1
        );
    }

    #[tokio::test]
    async fn test_failure_isolation() {
        let (temp_dir, mut local) = local_fixture();
        let transport = MockTransport::with_remote(&sample_registry()).failing("install");
        let settings = settings(&temp_dir);
        let downloader = Downloader::new(&transport, &settings);
        let uploader = Uploader::new(&transport, &downloader, &settings);

        let categories = uploader.upload_doc_categories(&mut local).await.unwrap();
        let docs = uploader.upload_documents(&mut local, &categories).await.unwrap();

        assert_eq!(docs.len(), 7);
        let failed: Vec<_> = docs.failed().map(|d| d.slug().unwrap()).collect();
        assert_eq!(failed, vec!["install"]);

        // The other six were patched with server ids
        assert!(docs.succeeded().all(|d| d.resource.id.is_some()));
        assert_eq!(local.all_docs().iter().filter(|d| d.resource.id.is_some()).count(), 6);
        let install = &local.docs("v2.0").unwrap()[0].pages[1];
        assert_eq!(install.id, None);
    }

    #[tokio::test]
    async fn test_unreadable_file_fails_only_that_entry() {
        let (temp_dir, mut local) = local_fixture();
        std::fs::remove_file(temp_dir.path().join("docs/v1/faq.md")).unwrap();

        let transport = MockTransport::with_remote(&sample_registry());
        let settings = settings(&temp_dir);
        let downloader = Downloader::new(&transport, &settings);
        let uploader = Uploader::new(&transport, &downloader, &settings);

        let (_, docs) = uploader.upload_docs(&mut local).await.unwrap();
        let failed: Vec<_> = docs.failed().collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].slug(), Some("faq"));
        assert!(failed[0].failure.as_deref().unwrap().starts_with("cannot read"));
        assert_eq!(
            transport.count(|c| matches!(c, Call::Update { kind: ResourceKind::Doc, .. })),
            5
        );
    }

    #[tokio::test]
    async fn test_failed_category_blocks_its_documents() {
        let (temp_dir, mut local) = local_fixture();
        let transport = MockTransport::with_remote(&Registry::new("github-upload", ["v2.0", "v1.0"]))
            .failing("Advanced");
        let settings = settings(&temp_dir);
        let downloader = Downloader::new(&transport, &settings);
        let uploader = Uploader::new(&transport, &downloader, &settings);

        let (categories, docs) = uploader.upload_docs(&mut local).await.unwrap();
        assert_eq!(categories.failed_count(), 1);

        let blocked: Vec<_> = docs
            .failed()
            .map(|d| (d.resource.title.clone().unwrap(), d.failure.clone().unwrap()))
            .collect();
        assert_eq!(
            blocked,
            vec![
                ("Tuning".to_string(), PARENT_UNRESOLVED.to_string()),
                ("Plugins".to_string(), PARENT_UNRESOLVED.to_string()),
            ]
        );
        assert!(!transport.calls().iter().any(|c| matches!(
            c,
            Call::Create { parent: Some(p), .. } if p.starts_with("advanced")
        )));
    }

    #[tokio::test]
    async fn test_upload_all_phase_order() {
        let (temp_dir, mut local) = local_fixture();
        let transport = MockTransport::with_remote(&sample_registry());
        let settings = settings(&temp_dir);
        let downloader = Downloader::new(&transport, &settings);
        let uploader = Uploader::new(&transport, &downloader, &settings);

        let summary = uploader.upload_all(&mut local).await.unwrap();
        assert!(summary.is_clean());
        assert_eq!(summary.custom_content.len(), 2);

        let phases: Vec<&'static str> = transport
            .calls()
            .iter()
            .filter_map(|c| match c {
                Call::Create { kind, .. } | Call::Update { kind, .. } => Some(match kind {
                    ResourceKind::Category => "category",
                    ResourceKind::Doc => "doc",
                    ResourceKind::CustomPage => "page",
                    ResourceKind::Content => "content",
                    ResourceKind::Version => "version",
                }),
                Call::Order { kind: ResourceKind::Category, .. } => Some("category-order"),
                Call::Order { .. } => Some("doc-order"),
                _ => None,
            })
            .collect();
        let mut deduped = phases.clone();
        deduped.dedup();
        assert_eq!(
            deduped,
            vec!["category", "doc", "page", "content", "category-order", "doc-order"]
        );

        // Remote snapshot fetched once for the whole run
        assert_eq!(transport.count(|c| matches!(c, Call::FetchVersions)), 1);
    }

    #[tokio::test]
    async fn test_custom_content_is_always_update() {
        let (temp_dir, mut local) = local_fixture();
        let transport = MockTransport::new();
        let settings = settings(&temp_dir);
        let downloader = Downloader::new(&transport, &settings);
        let uploader = Uploader::new(&transport, &downloader, &settings);

        let content = uploader.upload_custom_content(&mut local).await.unwrap();
        assert_eq!(content.failed_count(), 0);

        let calls = transport.calls();
        assert_eq!(calls.len(), 2);
        let Call::Update { version, kind, slug, body } = &calls[0] else {
            panic!("expected an update, got {:?}", calls[0]);
        };
        assert_eq!(version, "v2.0");
        assert_eq!(*kind, ResourceKind::Content);
        assert!(slug.is_empty());
        assert_eq!(body["appearance"]["stylesheet"], "body { }");
    }

    #[tokio::test]
    async fn test_order_payloads_skip_entries_without_ids() {
        let temp_dir = TempDir::new().unwrap();
        let mut registry = sample_registry();
        {
            let intro = &mut registry.docs_mut("v1.0").unwrap()[0];
            intro.id = Some("cat-1".into());
            intro.pages[0].id = Some("doc-1".into());
            intro.pages[2].id = Some("doc-3".into());
        }

        let transport = MockTransport::new();
        let settings = settings(&temp_dir);
        let downloader = Downloader::new(&transport, &settings);
        let uploader = Uploader::new(&transport, &downloader, &settings);

        let categories = uploader.upload_doc_categories_order(&registry).await;
        let docs = uploader.upload_docs_order(&registry).await;

        let v1_docs = docs.iter().find(|o| o.version == "v1.0").unwrap();
        assert_eq!((v1_docs.sent, v1_docs.skipped), (2, 1));
        let v2_categories = categories.iter().find(|o| o.version == "v2.0").unwrap();
        assert_eq!((v2_categories.sent, v2_categories.skipped), (0, 2));

        let payloads: Vec<_> = transport
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Order { payload, .. } => Some(payload),
                _ => None,
            })
            .collect();
        assert_eq!(
            payloads,
            vec![
                json!({ "cat-1": 0 }),
                json!([
                    { "id": "doc-1", "parentCategory": "cat-1", "order": 0 },
                    { "id": "doc-3", "parentCategory": "cat-1", "order": 2 }
                ]),
            ]
        );
    }
}
