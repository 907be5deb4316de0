//! HTTP router

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;
use tower_http::{
    catch_panic::CatchPanicLayer, compression::CompressionLayer, cors::CorsLayer,
    trace::TraceLayer,
};

use super::access_log::{access_log, deprecation_header};
use super::response::not_found;
use super::{coins, token_metrics, tools};
use crate::config::{CorsConfig, ServerConfig};
use crate::provider::{LaunchClient, MetricsClient, PoolClient};

/// Shared application state, built once at startup
pub struct AppState {
    /// Pool / market-data provider
    pub pools: PoolClient,
    /// Token-launch analytics provider
    pub launch: LaunchClient,
    /// Token-metrics / AI provider
    pub metrics: MetricsClient,
}

/// Create the router
pub fn create_router(state: Arc<AppState>, server: &ServerConfig, cors: &CorsConfig) -> Router {
    let coins = Router::new()
        .route("/trending_pools", get(coins::trending_pools))
        .route("/ohlcv", get(coins::ohlcv))
        .route("/find_pool", get(coins::find_pool))
        .route("/token", get(coins::token));

    let legacy_tools = Router::new()
        .route(
            "/pumpfun-historical-price-volume/{mint}",
            get(tools::legacy::historical_price_and_volume),
        )
        .route(
            "/pump-last-transactions/{mint}",
            get(tools::legacy::last_transactions),
        )
        .route(
            "/pumpfun-creation-info/{mint}",
            get(tools::legacy::creation_info),
        )
        .route_layer(middleware::from_fn(deprecation_header));

    let tools = Router::new()
        .route("/pumpfun-top-holders/{mint}", get(tools::top_holders))
        .route("/pumpfun-dev-holdings/{dev}/{mint}", get(tools::dev_holdings))
        .route(
            "/pump-volume-marketcap/{mint}",
            get(tools::volume_and_market_cap),
        )
        .route("/pump-top-market-cap", get(tools::top_market_cap))
        .route("/pump-info/{token}", get(tools::token_info))
        .route("/pump-top-token-creators", get(tools::top_creators))
        .route("/pump-top-traders-token/{mint}", get(tools::top_traders))
        .route(
            "/pump-trading-volumes/dexes/{mint}",
            get(tools::trading_volume_on_dexes),
        )
        .route("/pump-first-token-buyers/{mint}", get(tools::first_buyers))
        .route("/pump-first-latest-trades/{mint}", get(tools::latest_trades))
        .merge(legacy_tools);

    let metrics = Router::new()
        .route("/tokens/{symbols}", get(token_metrics::tokens))
        .route("/trader-grades/{symbols}", get(token_metrics::trader_grades))
        .route(
            "/investor-grades/{symbols}",
            get(token_metrics::investor_grades),
        )
        .route("/daily-ohlcv/{symbols}", get(token_metrics::daily_ohlcv))
        .route("/hourly-ohlcv/{symbols}", get(token_metrics::hourly_ohlcv))
        .route("/market-metrics", get(token_metrics::market_metrics))
        .route("/ai-reports/{symbols}", get(token_metrics::ai_reports))
        .route(
            "/trading-signals/{symbols}",
            get(token_metrics::trading_signals),
        )
        .route("/ai-agent/ask", post(token_metrics::ask_agent))
        .route("/trader-indices", get(token_metrics::trader_indices))
        .route("/sentiment", get(token_metrics::sentiment))
        .route("/sentiment/{symbols}", get(token_metrics::symbol_sentiment));

    let cors = if cors.allow_any_origin {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
    };

    Router::new()
        .route("/health", get(health_handler))
        .nest("/coins", coins)
        .nest("/tools", tools)
        .nest("/token-metrics", metrics)
        .fallback(not_found)
        .layer(middleware::from_fn(access_log))
        .layer(DefaultBodyLimit::max(server.max_body_size))
        .layer(cors)
        .layer(CatchPanicLayer::new())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check handler
async fn health_handler() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
