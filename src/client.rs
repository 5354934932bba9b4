//! API client context
//!
//! `Client` is constructed once and handed to every resource explicitly.
//! It bundles the HTTP verb layer with the status classifier so resource
//! code only ever sees decoded bodies or typed errors.

use crate::auth::Credentials;
use crate::config::ClientConfig;
use crate::error::Result;
use crate::http::{classify, HttpClient};
use crate::types::{JsonValue, Method, QueryParams};
use bytes::Bytes;
use std::sync::Arc;
use std::time::Duration;

/// Shared, cheaply cloneable API context
#[derive(Debug, Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

#[derive(Debug)]
struct ClientInner {
    http: HttpClient,
    poll_interval: Duration,
}

impl Client {
    /// Build a client from config, resolving credentials from the config or
    /// the environment
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let credentials = Credentials::resolve(config)?;
        Self::with_credentials(config, credentials)
    }

    /// Build a client with explicit credentials
    pub fn with_credentials(config: &ClientConfig, credentials: Credentials) -> Result<Self> {
        let http = HttpClient::new(config, credentials)?;
        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                poll_interval: config.poll_interval(),
            }),
        })
    }

    /// Build a client from `DO_TOKEN` / `DO_API_URL`
    pub fn from_env() -> Result<Self> {
        Self::new(&ClientConfig::from_env())
    }

    /// Underlying verb layer, for callers that want the raw status
    pub fn http(&self) -> &HttpClient {
        &self.inner.http
    }

    /// Delay between reloads in wait loops
    pub fn poll_interval(&self) -> Duration {
        self.inner.poll_interval
    }

    /// Classified GET
    pub async fn get(&self, path: &str, query: QueryParams) -> Result<JsonValue> {
        let response = self.inner.http.get(path, query).await?;
        classify(Method::GET, response)
    }

    /// Classified POST
    pub async fn post(&self, path: &str, body: JsonValue) -> Result<JsonValue> {
        let response = self.inner.http.post(path, body, Vec::new()).await?;
        classify(Method::POST, response)
    }

    /// Classified POST with query parameters
    pub async fn post_with_query(
        &self,
        path: &str,
        body: JsonValue,
        query: QueryParams,
    ) -> Result<JsonValue> {
        let response = self.inner.http.post(path, body, query).await?;
        classify(Method::POST, response)
    }

    /// Classified PUT
    pub async fn put(&self, path: &str, body: JsonValue) -> Result<JsonValue> {
        let response = self.inner.http.put(path, body, Vec::new()).await?;
        classify(Method::PUT, response)
    }

    /// Classified DELETE; 204 and 404 both yield `{"status": "deleted"}`
    pub async fn delete(
        &self,
        path: &str,
        body: Option<JsonValue>,
        query: QueryParams,
    ) -> Result<JsonValue> {
        let response = self.inner.http.delete(path, body, query).await?;
        classify(Method::DELETE, response)
    }

    /// Classified HEAD
    pub async fn head(&self, path: &str, query: QueryParams) -> Result<JsonValue> {
        let response = self.inner.http.head(path, query).await?;
        classify(Method::HEAD, response)
    }

    /// GET returning the raw body, for non-JSON downloads
    pub async fn get_bytes(&self, path: &str, query: QueryParams) -> Result<Bytes> {
        let (status, bytes) = self.inner.http.get_bytes(path, query).await?;
        if (200..300).contains(&status) {
            return Ok(bytes);
        }
        let text = String::from_utf8_lossy(&bytes);
        let response = crate::http::ApiResponse::from_text(status, &text);
        classify(Method::GET, response)?;
        Ok(bytes)
    }
}
