//! HTTP client for the resource API
//!
//! Provides a thin HTTP client that handles:
//! - Joining request paths onto the configured base URL
//! - Bearer authentication through [`Credentials`]
//! - JSON request bodies and response decoding
//! - Raw byte downloads for non-JSON endpoints

use crate::auth::Credentials;
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::types::{JsonValue, Method, QueryParams};
use bytes::Bytes;
use reqwest::Client;
use tracing::{debug, warn};

/// Maximum length of response body to log
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Configuration for a single request
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    /// Query parameters
    pub query: QueryParams,
    /// Request body (JSON)
    pub body: Option<JsonValue>,
}

impl RequestConfig {
    /// Create a new request config
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a query parameter
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Add several query parameters
    #[must_use]
    pub fn queries(mut self, params: impl IntoIterator<Item = (String, String)>) -> Self {
        self.query.extend(params);
        self
    }

    /// Set JSON body
    #[must_use]
    pub fn json(mut self, body: JsonValue) -> Self {
        self.body = Some(body);
        self
    }
}

/// Status code and decoded body of a response
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// HTTP status code
    pub status: u16,
    /// Decoded body; `Null` when empty, a JSON string when not JSON
    pub body: JsonValue,
}

impl ApiResponse {
    /// Decode a raw body
    pub fn from_text(status: u16, text: &str) -> Self {
        let body = if text.trim().is_empty() {
            JsonValue::Null
        } else {
            serde_json::from_str(text).unwrap_or_else(|_| JsonValue::String(text.to_string()))
        };
        Self { status, body }
    }

    /// Whether the status is 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP client bound to one base URL and one set of credentials
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    credentials: Credentials,
}

impl HttpClient {
    /// Create a new HTTP client
    pub fn new(config: &ClientConfig, credentials: Credentials) -> Result<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    /// Base URL requests are joined onto
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Make a GET request
    pub async fn get(&self, path: &str, query: QueryParams) -> Result<ApiResponse> {
        self.request(Method::GET, path, RequestConfig::new().queries(query))
            .await
    }

    /// Make a POST request
    pub async fn post(
        &self,
        path: &str,
        body: JsonValue,
        query: QueryParams,
    ) -> Result<ApiResponse> {
        self.request(
            Method::POST,
            path,
            RequestConfig::new().json(body).queries(query),
        )
        .await
    }

    /// Make a PUT request
    pub async fn put(&self, path: &str, body: JsonValue, query: QueryParams) -> Result<ApiResponse> {
        self.request(
            Method::PUT,
            path,
            RequestConfig::new().json(body).queries(query),
        )
        .await
    }

    /// Make a DELETE request, optionally with a JSON body
    pub async fn delete(
        &self,
        path: &str,
        body: Option<JsonValue>,
        query: QueryParams,
    ) -> Result<ApiResponse> {
        let mut config = RequestConfig::new().queries(query);
        config.body = body;
        self.request(Method::DELETE, path, config).await
    }

    /// Make a HEAD request
    pub async fn head(&self, path: &str, query: QueryParams) -> Result<ApiResponse> {
        self.request(Method::HEAD, path, RequestConfig::new().queries(query))
            .await
    }

    /// Make a generic request and decode the body as JSON
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        config: RequestConfig,
    ) -> Result<ApiResponse> {
        let response = self.send(method, path, config).await?;
        let status = response.status().as_u16();
        let text = response.text().await?;

        if !(200..300).contains(&status) {
            warn!("{} {} returned {}: {}", method, path, status, sanitize_for_log(&text));
        }

        Ok(ApiResponse::from_text(status, &text))
    }

    /// Make a GET request and return the raw body bytes
    pub async fn get_bytes(&self, path: &str, query: QueryParams) -> Result<(u16, Bytes)> {
        let response = self
            .send(Method::GET, path, RequestConfig::new().queries(query))
            .await?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await?;
        Ok((status, bytes))
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        config: RequestConfig,
    ) -> Result<reqwest::Response> {
        let full_url = self.build_url(path);
        debug!("{} {}", method, full_url);

        let mut req = self.client.request(method.into(), &full_url);
        if !config.query.is_empty() {
            req = req.query(&config.query);
        }
        if let Some(ref body) = config.body {
            req = req.json(body);
        }
        req = self.credentials.apply(req).await?;

        req.send().await.map_err(Error::Http)
    }

    /// Build full URL from path
    fn build_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        let path = path.trim_start_matches('/');
        format!("{}/{path}", self.base_url)
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// Truncate a body and drop control characters before it reaches the log
fn sanitize_for_log(body: &str) -> String {
    let truncated: String = body.chars().take(MAX_LOG_BODY_LENGTH).collect();
    let mut out: String = truncated
        .chars()
        .filter(|c| c.is_ascii_graphic() || *c == ' ')
        .collect();
    if body.chars().count() > MAX_LOG_BODY_LENGTH {
        out.push_str(&format!("... [truncated, {} bytes total]", body.len()));
    }
    out
}
