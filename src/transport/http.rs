//! HTTP transport backed by reqwest.

use std::time::Duration;

use serde_json::Value;
use tracing::{debug, trace};

use crate::auth::Credential;
use crate::error::{Error, Result};
use crate::model::{ResourceKind, Version};

use super::filters;
use super::urls::UrlGenerator;
use super::{ResourceTransport, SectionKind, ServerResource, TransportError, TransportResult};

/// Default host API base.
pub const DEFAULT_API_BASE: &str = "https://dash.readme.io";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Talks to the documentation host over HTTPS.
pub struct HttpTransport {
    client: reqwest::Client,
    api_base: String,
    credential: Credential,
}

impl HttpTransport {
    /// Create a transport for the given API base.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(api_base: impl Into<String>, credential: Credential) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("docsync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Other(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_base: api_base.into(),
            credential,
        })
    }

    #[must_use]
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.credential {
            Credential::ApiKey(key) => request.basic_auth(key, Some("")),
            Credential::Session(cookie) => request.header(reqwest::header::COOKIE, cookie),
        }
    }

    /// Send a request and return the body of a 2xx response.
    async fn send(&self, request: reqwest::RequestBuilder) -> TransportResult<String> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;
        trace!(%status, bytes = body.len(), "Response received");

        if !status.is_success() {
            return Err(TransportError::Http {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }

    async fn send_json(&self, request: reqwest::RequestBuilder) -> TransportResult<Value> {
        let body = self.send(request).await?;
        serde_json::from_str(&body).map_err(|e| TransportError::Malformed(e.to_string()))
    }
}

impl ResourceTransport for HttpTransport {
    async fn fetch_versions(&self, project: &str) -> TransportResult<Vec<Version>> {
        let url = UrlGenerator::versions(&self.api_base, project);
        debug!(%url, "GET versions");
        let raw = self.send_json(self.client.get(&url)).await?;
        filters::versions(raw)
    }

    async fn fetch_section(
        &self,
        project: &str,
        version: &str,
        section: SectionKind,
    ) -> TransportResult<Value> {
        let url = UrlGenerator::new(&self.api_base, project, version).section(section);
        debug!(%url, %section, "GET section");
        self.send_json(self.client.get(&url)).await
    }

    async fn create_resource(
        &self,
        project: &str,
        version: &str,
        kind: ResourceKind,
        parent_slug: Option<&str>,
        body: &Value,
    ) -> TransportResult<ServerResource> {
        let url = UrlGenerator::new(&self.api_base, project, version).create(kind, parent_slug);
        debug!(%url, %kind, "POST");
        let raw = self.send_json(self.client.post(&url).json(body)).await?;
        ServerResource::from_value(raw)
    }

    async fn update_resource(
        &self,
        project: &str,
        version: &str,
        kind: ResourceKind,
        slug: &str,
        body: &Value,
    ) -> TransportResult<ServerResource> {
        let url = UrlGenerator::new(&self.api_base, project, version).resource(kind, slug);
        debug!(%url, %kind, "PUT");
        let raw = self.send_json(self.client.put(&url).json(body)).await?;
        ServerResource::from_value(raw)
    }

    async fn delete_resource(
        &self,
        project: &str,
        version: &str,
        kind: ResourceKind,
        slug: &str,
    ) -> TransportResult<()> {
        let url = UrlGenerator::new(&self.api_base, project, version).resource(kind, slug);
        debug!(%url, %kind, "DELETE");
        self.send(self.client.delete(&url)).await.map(|_| ())
    }

    async fn set_order(
        &self,
        project: &str,
        version: &str,
        kind: ResourceKind,
        payload: &Value,
    ) -> TransportResult<()> {
        let url = UrlGenerator::new(&self.api_base, project, version).order(kind);
        debug!(%url, %kind, "PUT order");
        self.send(self.client.put(&url).json(payload)).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_keeps_base() {
        let transport =
            HttpTransport::new("https://docs.example.com", Credential::ApiKey("k".into())).unwrap();
        assert_eq!(transport.api_base(), "https://docs.example.com");
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        // Port 9 (discard) on localhost is not expected to speak HTTP.
        let transport =
            HttpTransport::new("http://127.0.0.1:9", Credential::Session("s=1".into())).unwrap();
        let err = transport.fetch_versions("p").await.unwrap_err();
        assert!(matches!(err, TransportError::Network(_)));
    }
}
