// SPDX-FileCopyrightText: 2026 Chainscope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Etherscan V2 multichain adapter.
//!
//! One endpoint serves every supported chain, selected with `chainid`. The
//! API refuses keyless calls, so without a key the adapter declares no
//! capabilities and the router never selects it.
//!
//! Etherscan reports most failures with HTTP 200 and `"status": "0"`; those
//! bodies are classified here rather than passed through.

use async_trait::async_trait;
use chainscope_config::model::{EtherscanConfig, ProviderHints};
use chainscope_core::{
    ChainscopeError, ProviderAdapter, ProviderError, QueryRequest, QueryType, RawResult,
};
use reqwest::header::HeaderMap;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::warn;

use crate::client::{JsonClient, api_key, endpoint, required_str};

pub const ID: &str = "etherscan";

const CAPABILITIES: &[QueryType] = &[QueryType::WalletActivity, QueryType::TokenBalance];

const DEFAULT_TX_LIMIT: i64 = 100;

/// Chain ids accepted by the V2 API.
pub fn chain_id(chain: &str) -> Option<u64> {
    let id = match chain.trim().to_lowercase().as_str() {
        "ethereum" | "eth" | "mainnet" => 1,
        "optimism" | "op" => 10,
        "bsc" | "bnb" => 56,
        "polygon" | "matic" => 137,
        "base" => 8453,
        "arbitrum" | "arb" => 42161,
        "avalanche" | "avax" => 43114,
        "linea" => 59144,
        "scroll" => 534352,
        other => return other.parse().ok(),
    };
    Some(id)
}

pub struct EtherscanAdapter {
    client: JsonClient,
    base_url: String,
    default_chain: String,
    api_key: Option<SecretString>,
    confidence: f64,
}

impl EtherscanAdapter {
    pub fn new(config: &EtherscanConfig) -> Result<Self, ChainscopeError> {
        let api_key = api_key(config.api_key.as_deref());
        if api_key.is_none() {
            warn!(provider = ID, "no API key configured, wallet queries disabled");
        }
        Ok(Self {
            client: JsonClient::new(ID, config.timeout(), HeaderMap::new())?,
            base_url: config.base_url.clone(),
            default_chain: config.default_chain.clone(),
            api_key,
            confidence: config.confidence,
        })
    }

    fn chain_param(&self, query: &QueryRequest) -> Result<String, ProviderError> {
        let chain = query
            .chains()
            .into_iter()
            .next()
            .unwrap_or_else(|| self.default_chain.clone());
        chain_id(&chain)
            .map(|id| id.to_string())
            .ok_or_else(|| ProviderError::bad_request(format!("unsupported chain: {chain}")))
    }

    fn params(&self, query: &QueryRequest) -> Result<Vec<(&'static str, String)>, ProviderError> {
        let key = self
            .api_key
            .as_ref()
            .ok_or_else(|| ProviderError::bad_request("etherscan API key not configured"))?;
        let address = required_str(query, "address")?.to_string();
        let mut params = vec![
            ("chainid", self.chain_param(query)?),
            ("module", "account".to_string()),
            ("address", address),
        ];
        match query.query_type() {
            QueryType::TokenBalance => {
                let contract = required_str(query, "contract_address")?.to_string();
                params.extend([
                    ("action", "tokenbalance".to_string()),
                    ("contractaddress", contract),
                    ("tag", "latest".to_string()),
                ]);
            }
            QueryType::WalletActivity => {
                let limit = query
                    .param("limit")
                    .and_then(|v| v.as_i64())
                    .unwrap_or(DEFAULT_TX_LIMIT)
                    .clamp(1, 10_000);
                params.extend([
                    ("action", "txlist".to_string()),
                    ("startblock", "0".to_string()),
                    ("endblock", "99999999".to_string()),
                    ("page", "1".to_string()),
                    ("offset", limit.to_string()),
                    ("sort", "desc".to_string()),
                ]);
            }
            other => {
                return Err(ProviderError::bad_request(format!("{ID} does not serve {other}")));
            }
        }
        params.push(("apikey", key.expose_secret().to_string()));
        Ok(params)
    }
}

/// Maps an Etherscan envelope with `"status": "0"` to an error.
///
/// `"No transactions found"` is an empty result, not a failure.
fn check_envelope(body: Value) -> Result<Value, ProviderError> {
    if body.get("status").and_then(Value::as_str) != Some("0") {
        return Ok(body);
    }
    let message = body.get("message").and_then(Value::as_str).unwrap_or_default();
    if message.starts_with("No transactions found") {
        return Ok(body);
    }
    let detail = body
        .get("result")
        .and_then(Value::as_str)
        .unwrap_or(message)
        .to_string();
    let lower = detail.to_lowercase();
    if lower.contains("rate limit") {
        Err(ProviderError::rate_limited(detail, None))
    } else if lower.contains("timeout") || lower.contains("timed out") {
        Err(ProviderError::timeout(detail))
    } else {
        Err(ProviderError::bad_request(detail))
    }
}

#[async_trait]
impl ProviderAdapter for EtherscanAdapter {
    fn id(&self) -> &str {
        ID
    }

    fn capabilities(&self) -> &[QueryType] {
        if self.api_key.is_some() {
            CAPABILITIES
        } else {
            &[]
        }
    }

    fn confidence(&self) -> f64 {
        self.confidence
    }

    async fn fetch(&self, query: &QueryRequest) -> Result<RawResult, ProviderError> {
        let params = self.params(query)?;
        let url = endpoint(&self.base_url, "", &[], &params)?;
        let body = self.client.get(url).await?;
        check_envelope(body).map(RawResult::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn adapter(server: &MockServer, key: Option<&str>) -> EtherscanAdapter {
        EtherscanAdapter::new(&EtherscanConfig {
            base_url: server.uri(),
            api_key: key.map(str::to_string),
            ..EtherscanConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn chain_names_and_numeric_ids() {
        assert_eq!(chain_id("Ethereum"), Some(1));
        assert_eq!(chain_id("arbitrum"), Some(42161));
        assert_eq!(chain_id("8453"), Some(8453));
        assert_eq!(chain_id("solana"), None);
    }

    #[test]
    fn envelope_classification() {
        assert!(check_envelope(json!({"status": "1", "result": "42"})).is_ok());
        let empty = json!({"status": "0", "message": "No transactions found", "result": []});
        assert!(check_envelope(empty).is_ok());

        let notok = |detail: &str| json!({"status": "0", "message": "NOTOK", "result": detail});
        let rl = check_envelope(notok("Max rate limit reached"));
        assert!(rl.unwrap_err().is_rate_limited());
        let bad = check_envelope(notok("Invalid API Key"));
        assert!(bad.unwrap_err().is_bad_request());
    }

    #[tokio::test]
    async fn no_key_means_no_capabilities() {
        let server = MockServer::start().await;
        let adapter = adapter(&server, None);
        assert!(adapter.capabilities().is_empty());
        let query = QueryRequest::new(QueryType::WalletActivity).with_param("address", "0xabc");
        assert!(adapter.fetch(&query).await.unwrap_err().is_bad_request());
    }

    #[tokio::test]
    async fn txlist_on_requested_chain() {
        let server = MockServer::start().await;
        let body = json!({"status": "1", "message": "OK", "result": [{"hash": "0x1"}]});
        Mock::given(method("GET"))
            .and(query_param("chainid", "42161"))
            .and(query_param("action", "txlist"))
            .and(query_param("address", "0xabc"))
            .and(query_param("offset", "25"))
            .and(query_param("apikey", "es-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .expect(1)
            .mount(&server)
            .await;

        let query = QueryRequest::new(QueryType::WalletActivity)
            .with_param("address", "0xabc")
            .with_param("chain", "arbitrum")
            .with_param("limit", 25);
        let raw = adapter(&server, Some("es-key")).fetch(&query).await.unwrap();
        assert_eq!(raw.data, body);
    }

    #[tokio::test]
    async fn token_balance_requires_contract() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let query = QueryRequest::new(QueryType::TokenBalance).with_param("address", "0xabc");
        let err = adapter(&server, Some("es-key")).fetch(&query).await.unwrap_err();
        assert!(err.is_bad_request());
    }

    #[tokio::test]
    async fn token_balance_defaults_to_mainnet() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("chainid", "1"))
            .and(query_param("action", "tokenbalance"))
            .and(query_param("contractaddress", "0xdac17f958d2ee523a2206206994597c13d831ec7"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"status": "1", "message": "OK", "result": "135499"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let query = QueryRequest::new(QueryType::TokenBalance)
            .with_param("address", "0xabc")
            .with_param("contract_address", "0xdac17f958d2ee523a2206206994597c13d831ec7");
        adapter(&server, Some("es-key")).fetch(&query).await.unwrap();
    }

    #[tokio::test]
    async fn in_body_rate_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "0",
                "message": "NOTOK",
                "result": "Max rate limit reached, please use API Key for higher rate limit"
            })))
            .mount(&server)
            .await;

        let query = QueryRequest::new(QueryType::WalletActivity).with_param("address", "0xabc");
        let err = adapter(&server, Some("es-key")).fetch(&query).await.unwrap_err();
        assert!(err.is_rate_limited());
    }
}
