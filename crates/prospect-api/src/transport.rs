//! HTTP transport seam.
//!
//! All remote calls go through the [`Transport`] trait so the retry and
//! credential logic in [`crate::client`] can be exercised against scripted
//! responses in tests. [`HttpTransport`] is the production implementation
//! over reqwest.

use crate::error::{ApiError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// One outbound API request.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// Endpoint path relative to the base URL (e.g. `companies/search`)
    pub endpoint: String,
    /// JSON request body
    pub body: Value,
    /// Bearer token to attach, if any (the auth handshake itself has none)
    pub bearer: Option<String>,
}

/// One inbound API response, status preserved for the caller to classify.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// HTTP status code
    pub status: u16,
    /// Parsed JSON body; `Value::Null` when the body wasn't JSON
    pub body: Value,
    /// Provider's Retry-After header in seconds, if present
    pub retry_after: Option<u64>,
    /// Provider's remaining-quota header, if present
    pub quota_remaining: Option<u64>,
}

/// Executes API requests. Implemented over HTTP in production and over
/// scripted responses in tests.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute one request, returning the response regardless of status.
    ///
    /// Only network-level failures are errors here; HTTP error statuses are
    /// returned as responses for the client to classify.
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse>;
}

/// Production transport over reqwest.
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    /// Create a transport for the given API base URL.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build().map_err(ApiError::Network)?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        let url = format!("{}/{}", self.base_url, request.endpoint);

        let mut builder = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .json(&request.body);

        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await?;

        let status = response.status().as_u16();
        let retry_after = header_u64(response.headers(), "retry-after");
        let quota_remaining = header_u64(response.headers(), "x-ratelimit-remaining");

        let text = response.text().await.unwrap_or_default();
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);

        Ok(ApiResponse {
            status,
            body,
            retry_after,
            quota_remaining,
        })
    }
}

/// Parse a numeric header, tolerating absence and junk values.
fn header_u64(headers: &reqwest::header::HeaderMap, name: &str) -> Option<u64> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}
