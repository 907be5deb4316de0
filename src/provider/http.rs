//! reqwest-backed transport with credential injection
//!
//! # Security
//!
//! - Credentials are resolved once at startup and injected per request
//! - Credentials are NEVER logged or included in error messages

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    Client, Response,
    header::{ACCEPT, HeaderMap, HeaderName, HeaderValue},
};
use serde_json::Value;
use tracing::{debug, warn};

use super::{Transport, UpstreamRequest};
use crate::config::ProviderConfig;
use crate::error::UpstreamError;
use crate::{Error, Result};

/// Longest slice of an upstream error body embedded in messages
const MAX_ERROR_BODY: usize = 500;

/// Header-based credential
#[derive(Clone)]
pub struct ApiKeyAuth {
    header: HeaderName,
    value: HeaderValue,
}

impl ApiKeyAuth {
    /// Credential sent verbatim in `header`
    pub fn header(header: &str, key: &str) -> Result<Self> {
        Self::build(header, key.to_string())
    }

    /// Credential sent as `Authorization: Bearer <key>`
    pub fn bearer(key: &str) -> Result<Self> {
        Self::build("authorization", format!("Bearer {key}"))
    }

    fn build(header: &str, value: String) -> Result<Self> {
        let header = header
            .parse::<HeaderName>()
            .map_err(|_| Error::Config(format!("Invalid auth header name '{header}'")))?;
        // Don't include the credential in the error message
        let mut value = HeaderValue::from_str(&value)
            .map_err(|_| Error::Config("Invalid credential format".to_string()))?;
        value.set_sensitive(true);
        Ok(Self { header, value })
    }
}

impl std::fmt::Debug for ApiKeyAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyAuth")
            .field("header", &self.header)
            .field("value", &"<redacted>")
            .finish()
    }
}

/// Production transport: one reqwest client per provider
pub struct HttpTransport {
    provider: &'static str,
    client: Client,
    base_url: String,
    auth: Option<ApiKeyAuth>,
}

impl HttpTransport {
    /// Build a transport from provider configuration
    ///
    /// # Errors
    ///
    /// Fails if the base URL is not an absolute http(s) URL or the HTTP
    /// client cannot be constructed.
    pub fn new(
        provider: &'static str,
        config: &ProviderConfig,
        auth: Option<ApiKeyAuth>,
    ) -> Result<Self> {
        let parsed = url::Url::parse(&config.base_url).map_err(|e| {
            Error::Config(format!(
                "Invalid base_url for {provider} provider '{}': {e}",
                config.base_url
            ))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "base_url for {provider} provider must be http or https"
            )));
        }

        let client = build_client(config.timeout)?;

        Ok(Self {
            provider,
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth,
        })
    }

    fn url(&self, path: &str) -> String {
        if path.is_empty() {
            self.base_url.clone()
        } else if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(auth) = &self.auth {
            headers.insert(auth.header.clone(), auth.value.clone());
        }
        headers
    }
}

fn build_client(timeout: Duration) -> Result<Client> {
    Ok(Client::builder()
        .timeout(timeout)
        .user_agent(concat!("dashmetrics-gateway/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

#[async_trait]
impl Transport for HttpTransport {
    fn provider(&self) -> &'static str {
        self.provider
    }

    async fn send(&self, request: UpstreamRequest) -> std::result::Result<Value, UpstreamError> {
        let url = self.url(&request.path);
        debug!(provider = self.provider, method = %request.method, path = %request.path, "Upstream call");

        let mut builder = self
            .client
            .request(request.method.clone(), &url)
            .headers(self.headers());

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            let e = e.without_url();
            warn!(provider = self.provider, path = %request.path, error = %e, "Upstream request failed");
            UpstreamError::transport(self.provider, format!("Request failed: {e}"))
        })?;

        map_response(self.provider, response).await
    }
}

/// The single status/error mapping rule for every provider
async fn map_response(
    provider: &'static str,
    response: Response,
) -> std::result::Result<Value, UpstreamError> {
    let status = response.status();

    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        let message = summarize_error_body(&error_text)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string());
        warn!(provider, status = status.as_u16(), "Upstream returned error status");
        return Err(UpstreamError::status(provider, status.as_u16(), message));
    }

    response.json::<Value>().await.map_err(|e| {
        warn!(provider, error = %e, "Upstream returned undecodable body");
        UpstreamError::transport(provider, format!("Failed to parse response: {e}"))
    })
}

/// Prefer a JSON `message`/`detail`/`error` field, fall back to raw text.
/// Output is truncated to avoid echoing large or sensitive bodies.
fn summarize_error_body(text: &str) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let picked = serde_json::from_str::<Value>(text)
        .ok()
        .and_then(|v| {
            ["message", "detail", "error"]
                .iter()
                .find_map(|k| v.get(*k).and_then(Value::as_str).map(str::to_string))
        })
        .unwrap_or_else(|| text.to_string());
    Some(picked.chars().take(MAX_ERROR_BODY).collect())
}
