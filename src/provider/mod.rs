//! Upstream providers
//!
//! Every provider operation goes through one primitive: a [`Transport`]
//! sends an [`UpstreamRequest`] and hands back decoded JSON or an
//! [`UpstreamError`]. The three clients ([`PoolClient`], [`LaunchClient`],
//! [`MetricsClient`]) only decide *what* to ask and how to reshape the answer.
//!
//! ```text
//!  handler ──▶ PoolClient / LaunchClient / MetricsClient
//!                          │  UpstreamRequest
//!                          ▼
//!                 Arc<dyn Transport>  (HttpTransport in production)
//!                          │  one attempt, one error-mapping rule
//!                          ▼
//!                      upstream API
//! ```

mod http;
pub mod launch;
pub mod metrics;
pub mod pools;

pub use http::{ApiKeyAuth, HttpTransport};
pub use launch::LaunchClient;
pub use metrics::MetricsClient;
pub use pools::PoolClient;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

use crate::error::UpstreamError;

/// Result of a provider operation
pub type UpstreamResult<T> = std::result::Result<T, UpstreamError>;

/// Provider names, used in logs and error bodies
pub mod names {
    /// Liquidity-pool / market-data provider
    pub const POOLS: &str = "pools";
    /// Token-launch analytics provider
    pub const LAUNCH: &str = "launch";
    /// Token-metrics / AI provider
    pub const METRICS: &str = "metrics";
}

/// A single upstream call, relative to the transport's base URL
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamRequest {
    /// HTTP method
    pub method: Method,
    /// Path appended to the base URL (may be empty)
    pub path: String,
    /// Query parameters, in order
    pub query: Vec<(String, String)>,
    /// JSON body
    pub body: Option<Value>,
}

impl UpstreamRequest {
    /// GET request
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    /// POST request with a JSON body
    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            query: Vec::new(),
            body: Some(body),
        }
    }

    /// Append a query parameter
    #[must_use]
    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Append a query parameter only when present
    #[must_use]
    pub fn query_opt(self, key: &str, value: Option<impl ToString>) -> Self {
        match value {
            Some(v) => self.query(key, v),
            None => self,
        }
    }

    /// Value of a query parameter, if set
    #[must_use]
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Sends upstream requests for one provider.
///
/// Implementations make exactly one attempt per call and report every
/// failure (transport, non-2xx, undecodable body) as an [`UpstreamError`].
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Provider name this transport talks to
    fn provider(&self) -> &'static str;

    /// Execute the request and decode the JSON response
    async fn send(&self, request: UpstreamRequest) -> Result<Value, UpstreamError>;
}

/// Percent-encode a value for use as a single path segment
#[must_use]
pub fn path_segment(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        // form encoding turns spaces into '+', which a path would keep literally
        .replace('+', "%20")
}
