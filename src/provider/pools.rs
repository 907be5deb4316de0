//! Liquidity-pool / market-data client (GeckoTerminal-style JSON:API)
//!
//! Upstream pagination is one-based; callers hand in zero-based pages and the
//! conversion happens here, at the provider boundary.

use std::sync::Arc;

use serde_json::Value;

use super::{
    ApiKeyAuth, HttpTransport, Transport, UpstreamRequest, UpstreamResult, names, path_segment,
};
use crate::config::ProviderConfig;
use crate::envelope::{self, Candle, Envelope};
use crate::params::{Currency, Timeframe, TokenSide};
use crate::Result;

/// Credential header understood by the pro tier
const API_KEY_HEADER: &str = "x-cg-pro-api-key";

/// Parameters for an OHLCV candle request
#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvRequest {
    /// Network id (`ethereum`, `sui-network`, ...)
    pub network: String,
    /// Pool contract address
    pub pool_address: String,
    /// Candle width
    pub timeframe: Timeframe,
    /// Number of timeframe units per candle
    pub aggregate: u32,
    /// Only candles before this unix time
    pub before_timestamp: i64,
    /// Number of candles
    pub limit: u32,
    /// Price denomination
    pub currency: Currency,
    /// Which side of the pair to follow
    pub token: TokenSide,
}

/// Client for the pool/market-data provider
#[derive(Clone)]
pub struct PoolClient {
    transport: Arc<dyn Transport>,
}

impl PoolClient {
    /// Wrap an existing transport
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Build the production client; the API key is optional
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        let auth = config
            .resolve_api_key()?
            .map(|key| ApiKeyAuth::header(API_KEY_HEADER, &key))
            .transpose()?;
        let transport = HttpTransport::new(names::POOLS, config, auth)?;
        Ok(Self::new(Arc::new(transport)))
    }

    /// Trending pools across networks
    pub async fn trending_pools(
        &self,
        include: &str,
        page: u32,
        duration: &str,
    ) -> UpstreamResult<Envelope> {
        let request = UpstreamRequest::get("/networks/trending_pools")
            .query("include", include)
            .query("page", one_based(page))
            .query("duration", duration);
        self.list(request).await
    }

    /// OHLCV candles for one pool
    pub async fn ohlcv(&self, req: &OhlcvRequest) -> UpstreamResult<Envelope<Vec<Candle>>> {
        let path = format!(
            "/networks/{}/pools/{}/ohlcv/{}",
            path_segment(&req.network),
            path_segment(&req.pool_address),
            req.timeframe
        );
        let request = UpstreamRequest::get(path)
            .query("aggregate", req.aggregate)
            .query("before_timestamp", req.before_timestamp)
            .query("limit", req.limit)
            .query("currency", req.currency)
            .query("token", req.token);

        let document = self.transport.send(request).await?;
        let (data, _, meta) = envelope::split_document(document);
        let rows = envelope::extract_path(data, "attributes.ohlcv_list");
        let candles = envelope::candles(names::POOLS, rows)?;
        Ok(Envelope::ok(candles).with_meta(meta))
    }

    /// Pools that contain a token
    pub async fn find_pools(
        &self,
        token_address: &str,
        network: &str,
        include: &str,
        page: u32,
    ) -> UpstreamResult<Envelope> {
        let path = format!(
            "/networks/{}/tokens/{}/pools",
            path_segment(network),
            path_segment(token_address)
        );
        let request = UpstreamRequest::get(path)
            .query("include", include)
            .query("page", one_based(page));
        self.list(request).await
    }

    /// Detail record for one token
    pub async fn token(
        &self,
        token_address: &str,
        network: &str,
        include: &str,
    ) -> UpstreamResult<Envelope<Value>> {
        let path = format!(
            "/networks/{}/tokens/{}",
            path_segment(network),
            path_segment(token_address)
        );
        let request = UpstreamRequest::get(path).query("include", include);

        let document = self.transport.send(request).await?;
        let (data, included, _) = envelope::split_document(document);
        Ok(Envelope::ok(data).with_included(included))
    }

    async fn list(&self, request: UpstreamRequest) -> UpstreamResult<Envelope> {
        let document = self.transport.send(request).await?;
        let (data, included, _) = envelope::split_document(document);
        Ok(envelope::list(data).with_included(included))
    }
}

fn one_based(page: u32) -> u32 {
    page.saturating_add(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UpstreamError;
    use crate::provider::testing::RecordingTransport;
    use reqwest::Method;
    use serde_json::json;

    fn client(transport: &Arc<RecordingTransport>) -> PoolClient {
        PoolClient::new(Arc::clone(transport) as Arc<dyn Transport>)
    }

    #[tokio::test]
    async fn trending_pools_shifts_page_and_keeps_included() {
        let transport = Arc::new(RecordingTransport::ok(
            names::POOLS,
            json!({"data": [{"id": "sui_0x1"}], "included": [{"id": "tok"}]}),
        ));
        let env = client(&transport)
            .trending_pools("base_token,quote_token", 0, "1h")
            .await
            .unwrap();

        assert!(env.success);
        assert_eq!(env.data, vec![json!({"id": "sui_0x1"})]);
        assert_eq!(env.included, Some(json!([{"id": "tok"}])));

        let req = transport.last();
        assert_eq!(req.method, Method::GET);
        assert_eq!(req.path, "/networks/trending_pools");
        assert_eq!(req.query_value("page"), Some("1"));
        assert_eq!(req.query_value("duration"), Some("1h"));
        assert_eq!(req.query_value("include"), Some("base_token,quote_token"));
    }

    #[tokio::test]
    async fn ohlcv_builds_path_and_candles() {
        let transport = Arc::new(RecordingTransport::ok(
            names::POOLS,
            json!({
                "data": {
                    "id": "x",
                    "attributes": {"ohlcv_list": [[1_700_003_600, 1, 2, 0.5, 1.5, 10]]}
                },
                "meta": {"base": {"symbol": "SUI"}}
            }),
        ));
        let env = client(&transport)
            .ohlcv(&OhlcvRequest {
                network: "sui-network".into(),
                pool_address: "0xpool".into(),
                timeframe: Timeframe::Day,
                aggregate: 1,
                before_timestamp: 1_700_010_000,
                limit: 100,
                currency: Currency::Usd,
                token: TokenSide::Quote,
            })
            .await
            .unwrap();

        assert_eq!(env.data.len(), 1);
        assert_eq!(env.data[0].timestamp, 1_700_003_600);
        assert_eq!(env.meta, Some(json!({"base": {"symbol": "SUI"}})));

        let req = transport.last();
        assert_eq!(req.path, "/networks/sui-network/pools/0xpool/ohlcv/day");
        assert_eq!(req.query_value("before_timestamp"), Some("1700010000"));
        assert_eq!(req.query_value("token"), Some("quote"));
        assert_eq!(req.query_value("currency"), Some("usd"));
    }

    #[tokio::test]
    async fn token_detail_is_single_object() {
        let transport = Arc::new(RecordingTransport::ok(
            names::POOLS,
            json!({"data": {"id": "sui_0xabc", "type": "token"}}),
        ));
        let env = client(&transport)
            .token("0xabc", "sui-network", "top_pools")
            .await
            .unwrap();
        assert_eq!(env.data["type"], "token");
        assert_eq!(env.included, None);
        assert_eq!(transport.last().path, "/networks/sui-network/tokens/0xabc");
    }

    #[tokio::test]
    async fn failure_is_single_attempt() {
        let transport = Arc::new(RecordingTransport::new(
            names::POOLS,
            Err(UpstreamError::status(names::POOLS, 429, "Too Many Requests")),
        ));
        let err = client(&transport)
            .find_pools("0xabc", "sui-network", "dex", 2)
            .await
            .unwrap_err();
        assert_eq!(err.status, Some(429));
        assert_eq!(transport.calls(), 1);
        assert_eq!(transport.last().query_value("page"), Some("3"));
    }
}
