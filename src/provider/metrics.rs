//! Token-metrics / AI client
//!
//! Every capability, sentiment included, is a plain REST call through the
//! shared [`Transport`]; the credential travels in the `api_key` header.

use std::sync::Arc;

use serde_json::{Value, json};
use tracing::warn;

use super::{ApiKeyAuth, HttpTransport, Transport, UpstreamRequest, UpstreamResult, names};
use crate::config::ProviderConfig;
use crate::envelope::{self, AgentAnswer, Envelope};
use crate::error::UpstreamError;
use crate::params::{DateRange, Pagination, Signal};
use crate::{Error, Result};

const API_KEY_HEADER: &str = "api_key";

/// Client for the token-metrics / AI provider
#[derive(Clone)]
pub struct MetricsClient {
    transport: Arc<dyn Transport>,
}

impl MetricsClient {
    /// Wrap an existing transport
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Build the production client.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::Config`] when no API key resolves; the gateway
    /// cannot serve metrics routes without one.
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        let key = config.resolve_api_key()?.ok_or_else(|| {
            Error::Config(
                "Token Metrics API key not found: set TOKEN_METRICS_API_KEY or providers.metrics.api_key"
                    .to_string(),
            )
        })?;
        let auth = ApiKeyAuth::header(API_KEY_HEADER, &key)?;
        let transport = HttpTransport::new(names::METRICS, config, Some(auth))?;
        Ok(Self::new(Arc::new(transport)))
    }

    /// Token records for a symbol list
    pub async fn tokens(&self, symbols: &str) -> UpstreamResult<Envelope> {
        self.list(UpstreamRequest::get("/tokens").query("symbol", symbols))
            .await
    }

    /// Short-term trader grades
    pub async fn trader_grades(&self, symbols: &str, range: &DateRange) -> UpstreamResult<Envelope> {
        self.list(dated("/trader-grades", range).query("symbol", symbols))
            .await
    }

    /// Long-term investor grades
    pub async fn investor_grades(
        &self,
        symbols: &str,
        range: &DateRange,
    ) -> UpstreamResult<Envelope> {
        self.list(dated("/investor-grades", range).query("symbol", symbols))
            .await
    }

    /// Daily OHLCV rows
    pub async fn daily_ohlcv(&self, symbols: &str, range: &DateRange) -> UpstreamResult<Envelope> {
        self.list(dated("/daily-ohlcv", range).query("symbol", symbols))
            .await
    }

    /// Hourly OHLCV rows
    pub async fn hourly_ohlcv(&self, symbols: &str, range: &DateRange) -> UpstreamResult<Envelope> {
        self.list(dated("/hourly-ohlcv", range).query("symbol", symbols))
            .await
    }

    /// Market-wide metrics
    pub async fn market_metrics(&self, range: &DateRange) -> UpstreamResult<Envelope> {
        self.list(dated("/market-metrics", range)).await
    }

    /// AI-generated reports
    pub async fn ai_reports(&self, symbols: &str) -> UpstreamResult<Envelope> {
        self.list(UpstreamRequest::get("/ai-reports").query("symbol", symbols))
            .await
    }

    /// Trading signals, optionally filtered by polarity
    pub async fn trading_signals(
        &self,
        symbols: &str,
        range: &DateRange,
        signal: Option<Signal>,
    ) -> UpstreamResult<Envelope> {
        let request = dated("/trading-signals", range)
            .query("symbol", symbols)
            .query_opt("signal", signal);
        self.list(request).await
    }

    /// Trader index series
    pub async fn trader_indices(&self, range: &DateRange) -> UpstreamResult<Envelope> {
        self.list(dated("/trader-indices", range)).await
    }

    /// Sentiment rows; `symbols` is forwarded verbatim when present
    pub async fn sentiment(
        &self,
        symbols: Option<&str>,
        pagination: Pagination,
    ) -> UpstreamResult<Envelope> {
        let request = UpstreamRequest::get("/sentiments")
            .query("limit", pagination.limit)
            .query("page", pagination.page)
            .query_opt("symbol", symbols);
        self.list(request).await
    }

    /// Ask the AI agent; the question is echoed back unchanged
    pub async fn ask(&self, question: &str) -> UpstreamResult<AgentAnswer> {
        let body = json!({ "messages": [{ "user": question }] });
        let provider = self.transport.provider();
        let document = checked(
            provider,
            self.transport.send(UpstreamRequest::post("/tmai", body)).await?,
        )?;

        let answer = document
            .get("answer")
            .or_else(|| document.pointer("/data/answer"))
            .and_then(Value::as_str)
            .ok_or_else(|| UpstreamError::transport(provider, "AI agent response has no answer"))?;

        Ok(AgentAnswer {
            question: question.to_string(),
            answer: answer.to_string(),
        })
    }

    async fn list(&self, request: UpstreamRequest) -> UpstreamResult<Envelope> {
        let document = checked(self.transport.provider(), self.transport.send(request).await?)?;
        Ok(envelope::list(envelope::extract_path(document, "data")))
    }
}

fn dated(path: &str, range: &DateRange) -> UpstreamRequest {
    UpstreamRequest::get(path)
        .query("startDate", range.start_str())
        .query("endDate", range.end_str())
}

/// The provider can answer 200 with `{"success": false, "message": ...}`
fn checked(provider: &'static str, document: Value) -> UpstreamResult<Value> {
    if document.get("success") == Some(&Value::Bool(false)) {
        let message = document
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("request was not successful");
        warn!(provider, message, "Upstream reported failure");
        return Err(UpstreamError::transport(provider, message));
    }
    Ok(document)
}
