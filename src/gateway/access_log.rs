//! Request access log

use std::time::Instant;

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::{info, warn};

/// Log method, path, status and latency of every request
pub async fn access_log(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status().as_u16();
    let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    if response.status().is_server_error() {
        warn!(%method, %path, status, duration_ms, "Request completed");
    } else {
        info!(%method, %path, status, duration_ms, "Request completed");
    }
    response
}

/// RFC 9745 structured date (2025-01-01T00:00:00Z) the legacy routes were retired on
pub const LEGACY_DEPRECATED_AT: &str = "@1735689600";

/// Tag responses of legacy routes with a `Deprecation` date
pub async fn deprecation_header(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    response.headers_mut().insert(
        HeaderName::from_static("deprecation"),
        HeaderValue::from_static(LEGACY_DEPRECATED_AT),
    );
    response
}
