// SPDX-FileCopyrightText: 2026 Chainscope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! CoinGecko adapter.
//!
//! Works on the public tier without a key; a demo key is sent as the
//! `x-cg-demo-api-key` header when configured.

use async_trait::async_trait;
use chainscope_config::model::{CoinGeckoConfig, ProviderHints};
use chainscope_core::{
    ChainscopeError, ProviderAdapter, ProviderError, QueryRequest, QueryType, RawResult,
};
use reqwest::header::HeaderMap;
use secrecy::ExposeSecret;

use crate::client::{JsonClient, api_key, endpoint, header, joined_list, required_str};

pub const ID: &str = "coingecko";

const CAPABILITIES: &[QueryType] = &[QueryType::TokenPrice, QueryType::TokenMetrics];

pub struct CoinGeckoAdapter {
    client: JsonClient,
    base_url: String,
    confidence: f64,
}

impl CoinGeckoAdapter {
    pub fn new(config: &CoinGeckoConfig) -> Result<Self, ChainscopeError> {
        let headers = match api_key(config.api_key.as_deref()) {
            Some(key) => header("x-cg-demo-api-key", key.expose_secret())?,
            None => HeaderMap::new(),
        };
        Ok(Self {
            client: JsonClient::new(ID, config.timeout(), headers)?,
            base_url: config.base_url.clone(),
            confidence: config.confidence,
        })
    }

    async fn simple_price(&self, query: &QueryRequest) -> Result<RawResult, ProviderError> {
        let ids = joined_list(query, &["ids", "token_ids"])
            .ok_or_else(|| ProviderError::bad_request("token_price requires an 'ids' parameter"))?;
        let vs = joined_list(query, &["vs_currencies"]).unwrap_or_else(|| "usd".to_string());
        let params = [
            ("ids", ids),
            ("vs_currencies", vs),
            ("include_market_cap", "true".to_string()),
            ("include_24hr_vol", "true".to_string()),
            ("include_24hr_change", "true".to_string()),
        ];
        let url = endpoint(&self.base_url, "simple/price", &[], &params)?;
        self.client.get(url).await.map(RawResult::new)
    }

    async fn coin_data(&self, query: &QueryRequest) -> Result<RawResult, ProviderError> {
        let id = if query.param("id").is_some() {
            required_str(query, "id")?
        } else {
            required_str(query, "token_id")?
        };
        let params = [
            ("localization", "false".to_string()),
            ("tickers", "false".to_string()),
            ("community_data", "true".to_string()),
            ("developer_data", "false".to_string()),
        ];
        let url = endpoint(&self.base_url, "coins", &[id.trim()], &params)?;
        self.client.get(url).await.map(RawResult::new)
    }
}

#[async_trait]
impl ProviderAdapter for CoinGeckoAdapter {
    fn id(&self) -> &str {
        ID
    }

    fn capabilities(&self) -> &[QueryType] {
        CAPABILITIES
    }

    fn confidence(&self) -> f64 {
        self.confidence
    }

    async fn fetch(&self, query: &QueryRequest) -> Result<RawResult, ProviderError> {
        match query.query_type() {
            QueryType::TokenPrice => self.simple_price(query).await,
            QueryType::TokenMetrics => self.coin_data(query).await,
            other => Err(ProviderError::bad_request(format!("{ID} does not serve {other}"))),
        }
    }
}
