//! Error responses
//!
//! Every failure, whatever its origin, leaves the gateway as
//! `{"success": false, "error": {...}}` with a status picked from the error kind.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::{error, warn};

use crate::Error;

#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    error: ErrorDetail,
}

#[derive(Debug, Serialize)]
struct ErrorDetail {
    kind: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    upstream_status: Option<u16>,
}

impl Error {
    /// HTTP status for this error
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let upstream_status = match &self {
            Self::Upstream(e) => e.status,
            _ => None,
        };

        match &self {
            Self::Validation(_) => {}
            Self::Upstream(e) => warn!(provider = e.provider, status = ?e.status, error = %e, "Upstream failure"),
            other => error!(error = %other, "Request failed"),
        }

        let body = ErrorBody {
            success: false,
            error: ErrorDetail {
                kind: self.kind(),
                message: self.to_string(),
                upstream_status,
            },
        };
        (status, Json(body)).into_response()
    }
}

/// Fallback for unknown routes
pub async fn not_found() -> Response {
    let body = ErrorBody {
        success: false,
        error: ErrorDetail {
            kind: "not_found",
            message: "No such route".to_string(),
            upstream_status: None,
        },
    };
    (StatusCode::NOT_FOUND, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UpstreamError;
    use axum::body::to_bytes;
    use serde_json::{Value, json};

    async fn body_of(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn validation_is_bad_request() {
        let response = Error::validation("limit must be at least 1").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_of(response).await,
            json!({
                "success": false,
                "error": {"kind": "validation", "message": "Validation error: limit must be at least 1"}
            })
        );
    }

    #[tokio::test]
    async fn upstream_is_bad_gateway_with_status() {
        let err = Error::from(UpstreamError::status("metrics", 404, "Not Found"));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = body_of(response).await;
        assert_eq!(body["error"]["kind"], "upstream");
        assert_eq!(body["error"]["upstream_status"], 404);
    }

    #[tokio::test]
    async fn transport_failure_has_no_upstream_status() {
        let err = Error::from(UpstreamError::transport("pools", "connection refused"));
        let body = body_of(err.into_response()).await;
        assert!(body["error"].get("upstream_status").is_none());
    }

    #[test]
    fn config_and_internal_are_server_errors() {
        assert_eq!(
            Error::Config("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            Error::Internal("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
