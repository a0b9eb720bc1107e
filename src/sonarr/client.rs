//! Authenticated request plumbing shared by every Sonarr endpoint.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{header, Method, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::error::{ClientError, Result};

/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Header carrying the Sonarr API key.
pub const API_KEY_HEADER: &str = "X-Api-Key";

/// Client for a single Sonarr instance.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct SonarrClient {
    inner: Arc<ClientInner>,
}

#[derive(Debug)]
struct ClientInner {
    http: reqwest::Client,
    base_url: Url,
    api_key: SecretString,
    timeout: Duration,
}

impl SonarrClient {
    /// Create a client with the default timeout.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        Self::builder().base_url(base_url).api_key(api_key).build()
    }

    /// Start building a client.
    pub fn builder() -> SonarrClientBuilder {
        SonarrClientBuilder::default()
    }

    /// The base URL requests are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// The per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.inner.timeout
    }

    /// Build the URL of an `/api/v3/...` endpoint.
    ///
    /// Segments are appended to any path prefix the base URL already has,
    /// so `http://host/sonarr` works behind a reverse proxy.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                ClientError::InvalidUrl(format!("{} cannot be a base URL", self.inner.base_url))
            })?
            .pop_if_empty()
            .extend(["api", "v3"])
            .extend(segments);
        Ok(url)
    }

    pub(crate) fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.inner
            .http
            .request(method, url)
            .header(API_KEY_HEADER, self.inner.api_key.expose_secret())
            .header(header::CONTENT_TYPE, "application/json")
    }

    pub(crate) async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        debug!(
            url = %response.url(),
            status = response.status().as_u16(),
            "Sonarr request completed"
        );
        Ok(response)
    }
}

/// Decode a JSON response body.
pub(crate) async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Turn an unexpected response into an error, keeping the body for context.
pub(crate) async fn api_error(response: Response) -> ClientError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    ClientError::Api {
        status: status.as_u16(),
        body,
    }
}

/// Builder for [`SonarrClient`].
#[derive(Debug)]
pub struct SonarrClientBuilder {
    base_url: Option<String>,
    api_key: Option<SecretString>,
    timeout: Duration,
}

impl Default for SonarrClientBuilder {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl SonarrClientBuilder {
    /// Set the Sonarr base URL, e.g. `http://localhost:8989`.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::from(key.into()));
        self
    }

    /// Set the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<SonarrClient> {
        let raw = self
            .base_url
            .ok_or_else(|| ClientError::Config("base URL is required".to_string()))?;
        let api_key = self
            .api_key
            .ok_or_else(|| ClientError::Config("API key is required".to_string()))?;

        let base_url = Url::parse(raw.trim())?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(format!(
                "{} cannot be a base URL",
                base_url
            )));
        }

        let http = reqwest::Client::builder().timeout(self.timeout).build()?;

        Ok(SonarrClient {
            inner: Arc::new(ClientInner {
                http,
                base_url,
                api_key,
                timeout: self.timeout,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_without_prefix() {
        let client = SonarrClient::new("http://localhost:8989", "key").unwrap();
        let url = client.endpoint(&["series", "42"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8989/api/v3/series/42");
    }

    #[test]
    fn test_endpoint_keeps_path_prefix() {
        let client = SonarrClient::new("https://media.example.com/sonarr/", "key").unwrap();
        let url = client.endpoint(&["system", "status"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://media.example.com/sonarr/api/v3/system/status"
        );
    }

    #[test]
    fn test_builder_defaults_timeout() {
        let client = SonarrClient::new("http://localhost:8989", "key").unwrap();
        assert_eq!(client.timeout(), DEFAULT_TIMEOUT);

        let client = SonarrClient::builder()
            .base_url("http://localhost:8989")
            .api_key("key")
            .timeout(Duration::from_secs(3))
            .build()
            .unwrap();
        assert_eq!(client.timeout(), Duration::from_secs(3));
    }

    #[test]
    fn test_builder_rejects_bad_input() {
        let err = SonarrClient::builder().api_key("key").build().unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));

        let err = SonarrClient::builder()
            .base_url("http://localhost:8989")
            .build()
            .unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));

        let err = SonarrClient::new("localhost:8989", "key").unwrap_err();
        assert!(matches!(err, ClientError::InvalidUrl(_)));

        let err = SonarrClient::new("::not-a-url", "key").unwrap_err();
        assert!(matches!(err, ClientError::InvalidUrl(_)));
    }

    #[test]
    fn test_debug_hides_api_key() {
        let client = SonarrClient::new("http://localhost:8989", "super-secret").unwrap();
        let rendered = format!("{:?}", client);
        assert!(!rendered.contains("super-secret"));
    }
}
