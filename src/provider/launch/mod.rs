//! Token-launch analytics client (pump.fun tokens on Solana)
//!
//! The provider speaks GraphQL over a single POST endpoint. Each operation
//! sends one document from [`queries`] with its variables and unwraps the
//! cube it asked for from `data.Solana.<Cube>`.
//!
//! GraphQL servers report query failures with a 200 status and an `errors`
//! array; those are turned into [`UpstreamError`]s here so callers see the
//! same failure shape as any other upstream error.

mod queries;

use std::sync::Arc;

use serde_json::{Value, json};
use tracing::warn;

pub use queries::PUMP_PROGRAM;

use super::{ApiKeyAuth, HttpTransport, Transport, UpstreamRequest, UpstreamResult, names};
use crate::Result;
use crate::config::ProviderConfig;
use crate::envelope::{self, Envelope};
use crate::error::UpstreamError;
use crate::params::{Interval, Side, Timestamp};

/// Client for the launch-analytics provider
#[derive(Clone)]
pub struct LaunchClient {
    transport: Arc<dyn Transport>,
}

impl LaunchClient {
    /// Wrap an existing transport
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Build the production client; the bearer token is optional
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        let auth = config
            .resolve_api_key()?
            .map(|key| ApiKeyAuth::bearer(&key))
            .transpose()?;
        let transport = HttpTransport::new(names::LAUNCH, config, auth)?;
        Ok(Self::new(Arc::new(transport)))
    }

    /// Largest current holders of a token
    pub async fn top_holders(&self, mint: &str) -> UpstreamResult<Envelope> {
        self.run(queries::TOP_HOLDERS, json!({ "mint": mint }), "BalanceUpdates")
            .await
    }

    /// What the developer wallet still holds of its token
    pub async fn dev_holdings(&self, dev_address: &str, mint: &str) -> UpstreamResult<Envelope> {
        self.run(
            queries::DEV_HOLDINGS,
            json!({ "dev": dev_address, "mint": mint }),
            "BalanceUpdates",
        )
        .await
    }

    /// Traded volume and market cap for one trade side
    pub async fn volume_and_market_cap(&self, mint: &str, side: Side) -> UpstreamResult<Envelope> {
        // the side is a GraphQL enum literal, not a variable
        let document = queries::VOLUME_AND_MARKET_CAP.replace("SIDE", side.as_str());
        self.run(
            &document,
            json!({ "mint": mint }),
            "DEXTradeByTokens",
        )
        .await
    }

    /// Highest market-cap pump.fun tokens
    pub async fn top_market_cap(&self) -> UpstreamResult<Envelope> {
        self.run(
            queries::TOP_MARKET_CAP,
            json!({ "program": PUMP_PROGRAM }),
            "DEXTrades",
        )
        .await
    }

    /// Supply and metadata of a token, optionally as of a point in time
    pub async fn token_info(
        &self,
        mint: &str,
        before: Option<Timestamp>,
    ) -> UpstreamResult<Envelope> {
        let variables = json!({
            "mint": mint,
            "before": before.map(|t| t.to_rfc3339()),
        });
        self.run(queries::TOKEN_INFO, variables, "TokenSupplyUpdates")
            .await
    }

    /// Wallets that created the most pump.fun tokens
    pub async fn top_creators(&self) -> UpstreamResult<Envelope> {
        self.run(
            queries::TOP_CREATORS,
            json!({ "program": PUMP_PROGRAM }),
            "Instructions",
        )
        .await
    }

    /// Traders ranked by USD volume in a token
    pub async fn top_traders(&self, mint: &str, limit: u32) -> UpstreamResult<Envelope> {
        self.run(
            queries::TOP_TRADERS,
            json!({ "mint": mint, "limit": limit }),
            "DEXTradeByTokens",
        )
        .await
    }

    /// Per-DEX trading volume since a point in time
    pub async fn trading_volume_on_dexes(
        &self,
        mint: &str,
        since: Timestamp,
    ) -> UpstreamResult<Envelope> {
        self.run(
            queries::VOLUME_BY_DEX,
            json!({ "mint": mint, "since": since.to_rfc3339() }),
            "DEXTradeByTokens",
        )
        .await
    }

    /// Earliest buys of a token, oldest first
    pub async fn first_buyers(&self, mint: &str, limit: u32) -> UpstreamResult<Envelope> {
        self.run(
            queries::FIRST_BUYERS,
            json!({ "mint": mint, "limit": limit }),
            "DEXTrades",
        )
        .await
    }

    /// Most recent trades of a token, newest first
    pub async fn latest_trades(&self, mint: &str, limit: u32) -> UpstreamResult<Envelope> {
        self.run(
            queries::LATEST_TRADES,
            json!({ "mint": mint, "limit": limit }),
            "DEXTradeByTokens",
        )
        .await
    }

    /// Bucketed price and volume series since a point in time
    #[deprecated(note = "superseded by the pool OHLCV capability")]
    pub async fn historical_price_and_volume(
        &self,
        mint: &str,
        since: Timestamp,
        interval: Interval,
        interval_count: u32,
    ) -> UpstreamResult<Envelope> {
        // the unit is a GraphQL enum literal, not a variable
        let document = queries::HISTORICAL_PRICE_VOLUME.replace("UNIT", interval.as_str());
        self.run(
            &document,
            json!({ "mint": mint, "since": since.to_rfc3339(), "interval": interval_count }),
            "DEXTradeByTokens",
        )
        .await
    }

    /// Most recent token transfers
    #[deprecated(note = "superseded by latest trades")]
    pub async fn last_transactions(&self, mint: &str, n: u32) -> UpstreamResult<Envelope> {
        self.run(
            queries::LAST_TRANSACTIONS,
            json!({ "mint": mint, "limit": n }),
            "Transfers",
        )
        .await
    }

    /// The pump.fun `create` instruction that launched a token
    #[deprecated(note = "superseded by token info")]
    pub async fn creation_info(&self, mint: &str) -> UpstreamResult<Envelope> {
        self.run(
            queries::CREATION_INFO,
            json!({ "mint": mint, "program": PUMP_PROGRAM }),
            "Instructions",
        )
        .await
    }

    async fn run(&self, query: &str, variables: Value, cube: &str) -> UpstreamResult<Envelope> {
        let body = json!({ "query": query, "variables": variables });
        let document = self.transport.send(UpstreamRequest::post("", body)).await?;
        let rows = unwrap_cube(self.transport.provider(), document, cube)?;
        Ok(envelope::list(rows))
    }
}

/// Reject GraphQL-level errors and pull `data.Solana.<cube>`
fn unwrap_cube(provider: &'static str, document: Value, cube: &str) -> UpstreamResult<Value> {
    match document.get("errors") {
        None | Some(Value::Null) => {}
        Some(Value::Array(errors)) if errors.is_empty() => {}
        Some(errors) => {
            warn!(provider, cube, "GraphQL query rejected");
            return Err(UpstreamError::transport(provider, graphql_message(errors)));
        }
    }
    Ok(envelope::extract_path(document, &format!("data.Solana.{cube}")))
}

fn graphql_message(errors: &Value) -> String {
    errors
        .get(0)
        .and_then(|e| e.get("message"))
        .and_then(Value::as_str)
        .map_or_else(|| "GraphQL query failed".to_string(), |m| format!("GraphQL error: {m}"))
}
