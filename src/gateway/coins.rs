//! `/coins/*`: pool and market-data routes

use std::sync::Arc;

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::Value;

use super::extract::ValidQuery;
use super::router::AppState;
use crate::Result;
use crate::envelope::{Candle, Envelope};
use crate::params::{
    Currency, OHLCV_DEFAULT_LIMIT, OHLCV_MAX_LIMIT, Timeframe, TokenSide, now_timestamp,
    require_identifier, resolve_limit,
};
use crate::provider::pools::OhlcvRequest;

const DEFAULT_NETWORK: &str = "sui-network";
const TRENDING_INCLUDE: &str = "base_token,quote_token";
const FIND_POOL_INCLUDE: &str = "base_token,quote_token,dex";
const TOKEN_INCLUDE: &str = "top_pools";
const TRENDING_DURATION: &str = "1h";

#[derive(Debug, Deserialize)]
pub struct TrendingQuery {
    include: Option<String>,
    page: Option<u32>,
    duration: Option<String>,
}

pub async fn trending_pools(
    State(state): State<Arc<AppState>>,
    ValidQuery(q): ValidQuery<TrendingQuery>,
) -> Result<Json<Envelope>> {
    let include = q.include.as_deref().unwrap_or(TRENDING_INCLUDE);
    let duration = q.duration.as_deref().unwrap_or(TRENDING_DURATION);
    let page = q.page.unwrap_or(0);

    Ok(Json(
        state.pools.trending_pools(include, page, duration).await?,
    ))
}

#[derive(Debug, Deserialize)]
pub struct OhlcvQuery {
    network: String,
    pool_address: String,
    #[serde(default)]
    timeframe: Timeframe,
    aggregate: Option<u32>,
    limit: Option<u32>,
    #[serde(default)]
    currency: Currency,
    #[serde(default)]
    token: TokenSide,
}

pub async fn ohlcv(
    State(state): State<Arc<AppState>>,
    ValidQuery(q): ValidQuery<OhlcvQuery>,
) -> Result<Json<Envelope<Vec<Candle>>>> {
    let aggregate = q.aggregate.unwrap_or(1);
    if aggregate == 0 {
        return Err(crate::Error::validation("aggregate must be at least 1"));
    }

    let request = OhlcvRequest {
        network: require_identifier("network", &q.network)?,
        pool_address: require_identifier("pool_address", &q.pool_address)?,
        timeframe: q.timeframe,
        aggregate,
        before_timestamp: now_timestamp(),
        limit: resolve_limit(q.limit, OHLCV_DEFAULT_LIMIT, Some(OHLCV_MAX_LIMIT))?,
        currency: q.currency,
        token: q.token,
    };

    Ok(Json(state.pools.ohlcv(&request).await?))
}

#[derive(Debug, Deserialize)]
pub struct FindPoolQuery {
    token_address: String,
    network: Option<String>,
    include: Option<String>,
    page: Option<u32>,
}

pub async fn find_pool(
    State(state): State<Arc<AppState>>,
    ValidQuery(q): ValidQuery<FindPoolQuery>,
) -> Result<Json<Envelope>> {
    let token = require_identifier("token_address", &q.token_address)?;
    let network = q.network.as_deref().unwrap_or(DEFAULT_NETWORK);
    let include = q.include.as_deref().unwrap_or(FIND_POOL_INCLUDE);

    Ok(Json(
        state
            .pools
            .find_pools(&token, network, include, q.page.unwrap_or(0))
            .await?,
    ))
}

#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    token_address: String,
    network: Option<String>,
    include: Option<String>,
}

pub async fn token(
    State(state): State<Arc<AppState>>,
    ValidQuery(q): ValidQuery<TokenQuery>,
) -> Result<Json<Envelope<Value>>> {
    let token = require_identifier("token_address", &q.token_address)?;
    let network = q.network.as_deref().unwrap_or(DEFAULT_NETWORK);
    let include = q.include.as_deref().unwrap_or(TOKEN_INCLUDE);

    Ok(Json(state.pools.token(&token, network, include).await?))
}
