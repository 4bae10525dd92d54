//! Opsify API client.
//!
//! Low-level HTTP client that attaches credentials, executes one
//! [`UpstreamRequest`] per call and classifies failures. Tool-specific
//! request shaping lives in the adapters.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response};
use serde_json::Value;
use url::Url;

use crate::config::{normalize_base_url, Config, Endpoints};
use crate::error::{OpsifyError, Result};
use crate::request::UpstreamRequest;

const USER_AGENT: &str = concat!("opsify-mcp/", env!("CARGO_PKG_VERSION"));

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "apikey";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Low-level Opsify API client.
///
/// This struct is cheaply cloneable; clones reference the same underlying
/// connection pool, which is released when the last clone is dropped.
///
/// # Example
///
/// ```no_run
/// use opsify_mcp::{OpsifyClient, UpstreamRequest};
///
/// # async fn example() -> opsify_mcp::Result<()> {
/// let client = OpsifyClient::new("your-api-key", "https://api.opsify.dev")?;
/// let latest = client
///     .execute(&UpstreamRequest::get("/checks/release/nginx/latest"))
///     .await?;
/// println!("{latest}");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct OpsifyClient {
    http: Client,
    base_url: Arc<Url>,
    api_key: String,
    endpoints: Arc<Endpoints>,
}

impl std::fmt::Debug for OpsifyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpsifyClient")
            .field("base_url", &self.base_url.as_str())
            .field("endpoints", &self.endpoints)
            .finish_non_exhaustive()
    }
}

impl OpsifyClient {
    /// Create a client with default endpoints and timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client cannot
    /// be built.
    pub fn new(api_key: &str, base_url: &str) -> Result<Self> {
        let base_url = normalize_base_url(base_url)?;
        Self::build(api_key, base_url, Endpoints::default(), DEFAULT_TIMEOUT)
    }

    /// Create a client from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::build(
            config.api_key(),
            config.base_url.clone(),
            config.endpoints.clone(),
            config.request_timeout,
        )
    }

    fn build(api_key: &str, base_url: Url, endpoints: Endpoints, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .brotli(true)
            .gzip(true)
            .deflate(true)
            .timeout(timeout)
            .build()
            .map_err(OpsifyError::Network)?;

        Ok(Self {
            http,
            base_url: Arc::new(base_url),
            api_key: api_key.to_string(),
            endpoints: Arc::new(endpoints),
        })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Endpoint templates used by the adapters.
    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Execute a request and decode the JSON response.
    ///
    /// An empty response body decodes to `null`.
    ///
    /// # Errors
    ///
    /// - [`OpsifyError::Network`] on transport failure
    /// - [`OpsifyError::UpstreamStatus`] when the status is 400 or above
    /// - [`OpsifyError::Decode`] when the body is not valid JSON
    #[tracing::instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    pub async fn execute(&self, request: &UpstreamRequest) -> Result<Value> {
        let url = self.base_url.join(request.path.trim_start_matches('/'))?;

        let mut builder = self
            .http
            .request(request.method.clone(), url)
            .header(CONTENT_TYPE, "application/json")
            .header(API_KEY_HEADER, &self.api_key);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(OpsifyError::Network)?;
        let response = Self::check_response(response).await?;

        let bytes = response.bytes().await.map_err(OpsifyError::Network)?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&bytes).map_err(OpsifyError::Decode)
    }

    /// Check response status and convert errors.
    async fn check_response(response: Response) -> Result<Response> {
        let status = response.status();

        if !status.is_client_error() && !status.is_server_error() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::debug!(status = status.as_u16(), "upstream returned error status");
        Err(OpsifyError::UpstreamStatus {
            status: status.as_u16(),
            body,
        })
    }
}
