//! Error types for the Dashmetrics gateway

use std::fmt;
use std::io;

use thiserror::Error;

/// Result type alias for the gateway
pub type Result<T> = std::result::Result<T, Error>;

/// Gateway errors
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error (missing credential, bad base URL, unreadable file)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Caller input rejected before reaching any provider
    #[error("Validation error: {0}")]
    Validation(String),

    /// Upstream provider failed
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client construction error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Shorthand for a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Short machine-readable kind used in error bodies
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "configuration",
            Self::Validation(_) => "validation",
            Self::Upstream(_) => "upstream",
            Self::Io(_) | Self::Json(_) | Self::Http(_) | Self::Internal(_) => "internal",
        }
    }
}

/// Failure of a single upstream call.
///
/// Produced only at the provider boundary. `status` is the upstream HTTP
/// status when one was received; transport failures and malformed payloads
/// carry `None`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct UpstreamError {
    /// Provider name (`pools`, `launch`, `metrics`)
    pub provider: &'static str,
    /// Upstream HTTP status, if the request got that far
    pub status: Option<u16>,
    /// Human-readable message (never contains credentials)
    pub message: String,
}

impl UpstreamError {
    /// Upstream answered with a non-success status
    pub fn status(provider: &'static str, status: u16, message: impl Into<String>) -> Self {
        Self {
            provider,
            status: Some(status),
            message: message.into(),
        }
    }

    /// Request never produced a usable response
    pub fn transport(provider: &'static str, message: impl Into<String>) -> Self {
        Self {
            provider,
            status: None,
            message: message.into(),
        }
    }
}

impl fmt::Display for UpstreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(
                f,
                "Upstream {} returned {}: {}",
                self.provider, status, self.message
            ),
            None => write!(f, "Upstream {} failed: {}", self.provider, self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_display_includes_status_when_present() {
        let err = UpstreamError::status("metrics", 404, "not found");
        assert_eq!(err.to_string(), "Upstream metrics returned 404: not found");

        let err = UpstreamError::transport("pools", "connection refused");
        assert_eq!(err.to_string(), "Upstream pools failed: connection refused");
    }

    #[test]
    fn kinds() {
        assert_eq!(Error::validation("x").kind(), "validation");
        assert_eq!(Error::Config("x".into()).kind(), "configuration");
        assert_eq!(
            Error::from(UpstreamError::transport("launch", "x")).kind(),
            "upstream"
        );
        assert_eq!(Error::Internal("x".into()).kind(), "internal");
    }
}
