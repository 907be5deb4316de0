//! `/token-metrics/*`: grades, prices, signals, sentiment and the AI agent

use std::sync::Arc;

use axum::{Json, body::Bytes, extract::State};
use serde::Deserialize;

use super::extract::{ValidPath, ValidQuery};
use super::router::AppState;
use crate::envelope::{AgentAnswer, Envelope};
use crate::params::{
    DEFAULT_LOOKBACK_DAYS, DateRange, HOURLY_LOOKBACK_DAYS, SENTIMENT_DEFAULT_LIMIT, Signal,
    require_symbols, resolve_date_range, resolve_pagination,
};
use crate::{Error, Result};

#[derive(Debug, Default, Deserialize)]
pub struct DateQuery {
    start_date: Option<String>,
    end_date: Option<String>,
}

impl DateQuery {
    fn resolve(&self, lookback_days: i64) -> Result<DateRange> {
        resolve_date_range(
            self.start_date.as_deref(),
            self.end_date.as_deref(),
            lookback_days,
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct SignalQuery {
    start_date: Option<String>,
    end_date: Option<String>,
    #[serde(default, deserialize_with = "crate::params::optional_signal")]
    signal: Option<Signal>,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    limit: Option<u32>,
    page: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AskQuery {
    question: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AskBody {
    question: String,
}

pub async fn tokens(
    State(state): State<Arc<AppState>>,
    ValidPath(symbols): ValidPath<String>,
) -> Result<Json<Envelope>> {
    let symbols = require_symbols(&symbols)?;
    Ok(Json(state.metrics.tokens(&symbols).await?))
}

pub async fn trader_grades(
    State(state): State<Arc<AppState>>,
    ValidPath(symbols): ValidPath<String>,
    ValidQuery(q): ValidQuery<DateQuery>,
) -> Result<Json<Envelope>> {
    let symbols = require_symbols(&symbols)?;
    let range = q.resolve(DEFAULT_LOOKBACK_DAYS)?;
    Ok(Json(state.metrics.trader_grades(&symbols, &range).await?))
}

pub async fn investor_grades(
    State(state): State<Arc<AppState>>,
    ValidPath(symbols): ValidPath<String>,
    ValidQuery(q): ValidQuery<DateQuery>,
) -> Result<Json<Envelope>> {
    let symbols = require_symbols(&symbols)?;
    let range = q.resolve(DEFAULT_LOOKBACK_DAYS)?;
    Ok(Json(state.metrics.investor_grades(&symbols, &range).await?))
}

pub async fn daily_ohlcv(
    State(state): State<Arc<AppState>>,
    ValidPath(symbols): ValidPath<String>,
    ValidQuery(q): ValidQuery<DateQuery>,
) -> Result<Json<Envelope>> {
    let symbols = require_symbols(&symbols)?;
    let range = q.resolve(DEFAULT_LOOKBACK_DAYS)?;
    Ok(Json(state.metrics.daily_ohlcv(&symbols, &range).await?))
}

pub async fn hourly_ohlcv(
    State(state): State<Arc<AppState>>,
    ValidPath(symbols): ValidPath<String>,
    ValidQuery(q): ValidQuery<DateQuery>,
) -> Result<Json<Envelope>> {
    let symbols = require_symbols(&symbols)?;
    let range = q.resolve(HOURLY_LOOKBACK_DAYS)?;
    Ok(Json(state.metrics.hourly_ohlcv(&symbols, &range).await?))
}

pub async fn market_metrics(
    State(state): State<Arc<AppState>>,
    ValidQuery(q): ValidQuery<DateQuery>,
) -> Result<Json<Envelope>> {
    let range = q.resolve(DEFAULT_LOOKBACK_DAYS)?;
    Ok(Json(state.metrics.market_metrics(&range).await?))
}

pub async fn ai_reports(
    State(state): State<Arc<AppState>>,
    ValidPath(symbols): ValidPath<String>,
) -> Result<Json<Envelope>> {
    let symbols = require_symbols(&symbols)?;
    Ok(Json(state.metrics.ai_reports(&symbols).await?))
}

pub async fn trading_signals(
    State(state): State<Arc<AppState>>,
    ValidPath(symbols): ValidPath<String>,
    ValidQuery(q): ValidQuery<SignalQuery>,
) -> Result<Json<Envelope>> {
    let symbols = require_symbols(&symbols)?;
    let range = resolve_date_range(
        q.start_date.as_deref(),
        q.end_date.as_deref(),
        DEFAULT_LOOKBACK_DAYS,
    )?;
    Ok(Json(
        state
            .metrics
            .trading_signals(&symbols, &range, q.signal)
            .await?,
    ))
}

pub async fn trader_indices(
    State(state): State<Arc<AppState>>,
    ValidQuery(q): ValidQuery<DateQuery>,
) -> Result<Json<Envelope>> {
    let range = q.resolve(DEFAULT_LOOKBACK_DAYS)?;
    Ok(Json(state.metrics.trader_indices(&range).await?))
}

/// `question` comes from the query string or a JSON body; the query wins
pub async fn ask_agent(
    State(state): State<Arc<AppState>>,
    ValidQuery(q): ValidQuery<AskQuery>,
    body: Bytes,
) -> Result<Json<AgentAnswer>> {
    let question = match q.question {
        Some(question) => question,
        None if body.is_empty() => {
            return Err(Error::validation("question is required"));
        }
        None => {
            serde_json::from_slice::<AskBody>(&body)
                .map_err(|e| Error::validation(format!("Invalid request body: {e}")))?
                .question
        }
    };
    if question.trim().is_empty() {
        return Err(Error::validation("question must not be empty"));
    }

    Ok(Json(state.metrics.ask(&question).await?))
}

pub async fn sentiment(
    State(state): State<Arc<AppState>>,
    ValidQuery(q): ValidQuery<PageQuery>,
) -> Result<Json<Envelope>> {
    let pagination = resolve_pagination(q.limit, q.page, SENTIMENT_DEFAULT_LIMIT)?;
    Ok(Json(state.metrics.sentiment(None, pagination).await?))
}

pub async fn symbol_sentiment(
    State(state): State<Arc<AppState>>,
    ValidPath(symbols): ValidPath<String>,
    ValidQuery(q): ValidQuery<PageQuery>,
) -> Result<Json<Envelope>> {
    let symbols = require_symbols(&symbols)?;
    let pagination = resolve_pagination(q.limit, q.page, SENTIMENT_DEFAULT_LIMIT)?;
    Ok(Json(
        state
            .metrics
            .sentiment(Some(&symbols), pagination)
            .await?,
    ))
}
