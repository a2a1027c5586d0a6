// SPDX-FileCopyrightText: 2026 Chainscope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! DefiLlama adapter (no API key).
//!
//! | Query type | Parameters | Endpoint |
//! |---|---|---|
//! | `protocol_tvl` | `protocol` | `{base}/protocol/{protocol}` |
//! | `chain_metrics` | `chain` or `chains[0]` | `{base}/v2/historicalChainTvl/{chain}` |
//! | `stablecoin_data` | optional `stablecoin` | `{stablecoins}/stablecoincharts/all` |
//! | `token_price` | `ids` (CoinGecko ids) | `{coins}/prices/current/coingecko:{id},...` |

use async_trait::async_trait;
use chainscope_config::model::{DefiLlamaConfig, ProviderHints};
use chainscope_core::{
    ChainscopeError, ProviderAdapter, ProviderError, QueryRequest, QueryType, RawResult,
};
use reqwest::header::HeaderMap;

use crate::client::{JsonClient, endpoint, joined_list, required_str};

pub const ID: &str = "defillama";

const CAPABILITIES: &[QueryType] = &[
    QueryType::ProtocolTvl,
    QueryType::ChainMetrics,
    QueryType::StablecoinData,
    QueryType::TokenPrice,
];

pub struct DefiLlamaAdapter {
    client: JsonClient,
    base_url: String,
    coins_url: String,
    stablecoins_url: String,
    confidence: f64,
}

impl DefiLlamaAdapter {
    pub fn new(config: &DefiLlamaConfig) -> Result<Self, ChainscopeError> {
        Ok(Self {
            client: JsonClient::new(ID, config.timeout(), HeaderMap::new())?,
            base_url: config.base_url.clone(),
            coins_url: config.coins_url.clone(),
            stablecoins_url: config.stablecoins_url.clone(),
            confidence: config.confidence,
        })
    }

    async fn protocol_tvl(&self, query: &QueryRequest) -> Result<RawResult, ProviderError> {
        let protocol = required_str(query, "protocol")?;
        let url = endpoint(&self.base_url, "protocol", &[&slug(protocol)], &[])?;
        self.client.get(url).await.map(RawResult::new)
    }

    async fn chain_metrics(&self, query: &QueryRequest) -> Result<RawResult, ProviderError> {
        let chain = query.chains().into_iter().next().ok_or_else(|| {
            ProviderError::bad_request("chain_metrics requires a 'chain' parameter")
        })?;
        let url = endpoint(&self.base_url, "v2/historicalChainTvl", &[&chain], &[])?;
        self.client.get(url).await.map(RawResult::new)
    }

    async fn stablecoin_data(&self, query: &QueryRequest) -> Result<RawResult, ProviderError> {
        let params: Vec<(&str, String)> = query
            .str_param("stablecoin")
            .map(|id| vec![("stablecoin", id.to_string())])
            .unwrap_or_default();
        let url = endpoint(&self.stablecoins_url, "stablecoincharts/all", &[], &params)?;
        self.client.get(url).await.map(RawResult::new)
    }

    async fn token_price(&self, query: &QueryRequest) -> Result<RawResult, ProviderError> {
        let ids = joined_list(query, &["ids", "token_ids"])
            .ok_or_else(|| ProviderError::bad_request("token_price requires an 'ids' parameter"))?;
        let coins = ids
            .split(',')
            .map(|id| format!("coingecko:{}", id.trim()))
            .collect::<Vec<_>>()
            .join(",");
        let url = endpoint(&self.coins_url, "prices/current", &[&coins], &[])?;
        self.client.get(url).await.map(RawResult::new)
    }
}

/// DefiLlama protocol slugs are lowercase with dashes.
fn slug(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "-")
}

#[async_trait]
impl ProviderAdapter for DefiLlamaAdapter {
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
            QueryType::ProtocolTvl => self.protocol_tvl(query).await,
            QueryType::ChainMetrics => self.chain_metrics(query).await,
            QueryType::StablecoinData => self.stablecoin_data(query).await,
            QueryType::TokenPrice => self.token_price(query).await,
            other => Err(ProviderError::bad_request(format!("{ID} does not serve {other}"))),
        }
    }
}
