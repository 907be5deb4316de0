//! `/tools/*`: token-launch analytics routes

use std::sync::Arc;

use axum::{Json, extract::State};
use serde::Deserialize;

use super::extract::{ValidPath, ValidQuery};
use super::router::AppState;
use crate::Result;
use crate::envelope::Envelope;
use crate::params::{
    Interval, LAUNCH_DEFAULT_LIMIT, Side, Timestamp, require_identifier, resolve_limit,
};

#[derive(Debug, Deserialize)]
pub struct SideQuery {
    #[serde(default)]
    side: Side,
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct InfoQuery {
    before_timestamp: Option<Timestamp>,
}

#[derive(Debug, Deserialize)]
pub struct SinceQuery {
    before_timestamp: Timestamp,
}

pub async fn top_holders(
    State(state): State<Arc<AppState>>,
    ValidPath(mint): ValidPath<String>,
) -> Result<Json<Envelope>> {
    let mint = require_identifier("token_mint_address", &mint)?;
    Ok(Json(state.launch.top_holders(&mint).await?))
}

pub async fn dev_holdings(
    State(state): State<Arc<AppState>>,
    ValidPath((dev, mint)): ValidPath<(String, String)>,
) -> Result<Json<Envelope>> {
    let dev = require_identifier("dev_address", &dev)?;
    let mint = require_identifier("token_mint_address", &mint)?;
    Ok(Json(state.launch.dev_holdings(&dev, &mint).await?))
}

pub async fn volume_and_market_cap(
    State(state): State<Arc<AppState>>,
    ValidPath(mint): ValidPath<String>,
    ValidQuery(q): ValidQuery<SideQuery>,
) -> Result<Json<Envelope>> {
    let mint = require_identifier("token_mint_address", &mint)?;
    Ok(Json(state.launch.volume_and_market_cap(&mint, q.side).await?))
}

pub async fn top_market_cap(State(state): State<Arc<AppState>>) -> Result<Json<Envelope>> {
    Ok(Json(state.launch.top_market_cap().await?))
}

pub async fn token_info(
    State(state): State<Arc<AppState>>,
    ValidPath(token): ValidPath<String>,
    ValidQuery(q): ValidQuery<InfoQuery>,
) -> Result<Json<Envelope>> {
    let token = require_identifier("token", &token)?;
    Ok(Json(
        state.launch.token_info(&token, q.before_timestamp).await?,
    ))
}

pub async fn top_creators(State(state): State<Arc<AppState>>) -> Result<Json<Envelope>> {
    Ok(Json(state.launch.top_creators().await?))
}

pub async fn top_traders(
    State(state): State<Arc<AppState>>,
    ValidPath(mint): ValidPath<String>,
    ValidQuery(q): ValidQuery<LimitQuery>,
) -> Result<Json<Envelope>> {
    let mint = require_identifier("token_mint_address", &mint)?;
    let limit = resolve_limit(q.limit, LAUNCH_DEFAULT_LIMIT, None)?;
    Ok(Json(state.launch.top_traders(&mint, limit).await?))
}

pub async fn trading_volume_on_dexes(
    State(state): State<Arc<AppState>>,
    ValidPath(mint): ValidPath<String>,
    ValidQuery(q): ValidQuery<SinceQuery>,
) -> Result<Json<Envelope>> {
    let mint = require_identifier("token_mint_address", &mint)?;
    Ok(Json(
        state
            .launch
            .trading_volume_on_dexes(&mint, q.before_timestamp)
            .await?,
    ))
}

pub async fn first_buyers(
    State(state): State<Arc<AppState>>,
    ValidPath(mint): ValidPath<String>,
    ValidQuery(q): ValidQuery<LimitQuery>,
) -> Result<Json<Envelope>> {
    let mint = require_identifier("token_mint_address", &mint)?;
    let limit = resolve_limit(q.limit, LAUNCH_DEFAULT_LIMIT, None)?;
    Ok(Json(state.launch.first_buyers(&mint, limit).await?))
}

pub async fn latest_trades(
    State(state): State<Arc<AppState>>,
    ValidPath(mint): ValidPath<String>,
    ValidQuery(q): ValidQuery<LimitQuery>,
) -> Result<Json<Envelope>> {
    let mint = require_identifier("token_mint_address", &mint)?;
    let limit = resolve_limit(q.limit, LAUNCH_DEFAULT_LIMIT, None)?;
    Ok(Json(state.launch.latest_trades(&mint, limit).await?))
}

/// Legacy routes, kept for existing callers only
pub mod legacy {
    #![allow(deprecated)]

    use super::*;

    #[derive(Debug, Deserialize)]
    pub struct HistoryQuery {
        since: Timestamp,
        #[serde(default)]
        interval_in: Interval,
        interval_count: Option<u32>,
    }

    #[derive(Debug, Deserialize)]
    pub struct CountQuery {
        n: Option<u32>,
    }

    pub async fn historical_price_and_volume(
        State(state): State<Arc<AppState>>,
        ValidPath(mint): ValidPath<String>,
        ValidQuery(q): ValidQuery<HistoryQuery>,
    ) -> Result<Json<Envelope>> {
        let mint = require_identifier("token_mint_address", &mint)?;
        let count = q.interval_count.unwrap_or(1);
        if count == 0 {
            return Err(crate::Error::validation("interval_count must be at least 1"));
        }
        Ok(Json(
            state
                .launch
                .historical_price_and_volume(&mint, q.since, q.interval_in, count)
                .await?,
        ))
    }

    pub async fn last_transactions(
        State(state): State<Arc<AppState>>,
        ValidPath(mint): ValidPath<String>,
        ValidQuery(q): ValidQuery<CountQuery>,
    ) -> Result<Json<Envelope>> {
        let mint = require_identifier("token_mint_address", &mint)?;
        let n = resolve_limit(q.n, LAUNCH_DEFAULT_LIMIT, None)?;
        Ok(Json(state.launch.last_transactions(&mint, n).await?))
    }

    pub async fn creation_info(
        State(state): State<Arc<AppState>>,
        ValidPath(mint): ValidPath<String>,
    ) -> Result<Json<Envelope>> {
        let mint = require_identifier("token_mint_address", &mint)?;
        Ok(Json(state.launch.creation_info(&mint).await?))
    }
}
