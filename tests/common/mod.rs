//! Shared harness: an in-process fake upstream and a router wired to it

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    body::{Body, Bytes, to_bytes},
    extract::State,
    http::{HeaderMap, Method, Request, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use serde_json::Value;
use tokio::net::TcpListener;
use tower::ServiceExt;

use dashmetrics_gateway::config::{CorsConfig, ProviderConfig, ServerConfig};
use dashmetrics_gateway::gateway::{AppState, create_router};
use dashmetrics_gateway::provider::{LaunchClient, MetricsClient, PoolClient};

pub const METRICS_KEY: &str = "tm-test-key";

/// One request as seen by the fake upstream
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub query: HashMap<String, String>,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

struct Shared {
    status: StatusCode,
    reply: Value,
    requests: Mutex<Vec<Recorded>>,
}

/// Fake upstream answering every request with the same canned reply
pub struct FakeUpstream {
    base_url: String,
    shared: Arc<Shared>,
}

impl FakeUpstream {
    pub async fn start(status: StatusCode, reply: Value) -> Self {
        let shared = Arc::new(Shared {
            status,
            reply,
            requests: Mutex::new(Vec::new()),
        });
        let app = Router::new()
            .fallback(record)
            .with_state(Arc::clone(&shared));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            shared,
        }
    }

    pub async fn ok(reply: Value) -> Self {
        Self::start(StatusCode::OK, reply).await
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.shared.requests.lock().unwrap().clone()
    }

    pub fn hits(&self) -> usize {
        self.shared.requests.lock().unwrap().len()
    }

    pub fn last(&self) -> Recorded {
        self.requests().pop().expect("upstream was not called")
    }

    fn provider(&self, prefix: &str, api_key: Option<&str>) -> ProviderConfig {
        ProviderConfig {
            base_url: format!("{}/{prefix}", self.base_url),
            api_key: api_key.map(str::to_string),
            timeout: Duration::from_secs(5),
        }
    }

    /// Router whose three providers all point at this fake
    pub fn router(&self) -> Router {
        let state = AppState {
            pools: PoolClient::from_config(&self.provider("pools", None)).unwrap(),
            launch: LaunchClient::from_config(&self.provider("launch", None)).unwrap(),
            metrics: MetricsClient::from_config(&self.provider("metrics", Some(METRICS_KEY)))
                .unwrap(),
        };
        create_router(
            Arc::new(state),
            &ServerConfig::default(),
            &CorsConfig::default(),
        )
    }
}

async fn record(
    State(shared): State<Arc<Shared>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let query = uri
        .query()
        .map(|q| {
            url::form_urlencoded::parse(q.as_bytes())
                .into_owned()
                .collect()
        })
        .unwrap_or_default();
    let body = if body.is_empty() {
        None
    } else {
        serde_json::from_slice(&body).ok()
    };

    shared.requests.lock().unwrap().push(Recorded {
        method,
        path: uri.path().to_string(),
        query,
        headers,
        body,
    });

    (shared.status, Json(shared.reply.clone()))
}

pub async fn get(app: Router, uri: &str) -> Response {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: Option<Value>) -> Response {
    let builder = Request::builder().method(Method::POST).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
