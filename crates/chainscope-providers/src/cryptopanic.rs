// SPDX-FileCopyrightText: 2026 Chainscope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! CryptoPanic news adapter. The auth token is optional.

use async_trait::async_trait;
use chainscope_config::model::{CryptoPanicConfig, ProviderHints};
use chainscope_core::{
    ChainscopeError, ProviderAdapter, ProviderError, QueryRequest, QueryType, RawResult,
};
use reqwest::header::HeaderMap;
use secrecy::{ExposeSecret, SecretString};

use crate::client::{JsonClient, api_key, endpoint, joined_list};

pub const ID: &str = "cryptopanic";

const CAPABILITIES: &[QueryType] = &[QueryType::NewsSentiment];

const DEFAULT_CURRENCIES: &str = "BTC,ETH";

pub struct CryptoPanicAdapter {
    client: JsonClient,
    base_url: String,
    auth_token: Option<SecretString>,
    confidence: f64,
}

impl CryptoPanicAdapter {
    pub fn new(config: &CryptoPanicConfig) -> Result<Self, ChainscopeError> {
        Ok(Self {
            client: JsonClient::new(ID, config.timeout(), HeaderMap::new())?,
            base_url: config.base_url.clone(),
            auth_token: api_key(config.api_key.as_deref()),
            confidence: config.confidence,
        })
    }
}

#[async_trait]
impl ProviderAdapter for CryptoPanicAdapter {
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
        if query.query_type() != QueryType::NewsSentiment {
            return Err(ProviderError::bad_request(format!(
                "{ID} does not serve {}",
                query.query_type()
            )));
        }
        let currencies = joined_list(query, &["currencies"])
            .unwrap_or_else(|| DEFAULT_CURRENCIES.to_string())
            .to_uppercase();
        let mut params = vec![
            ("kind", query.str_param("kind").unwrap_or("news").to_string()),
            ("public", "true".to_string()),
            ("currencies", currencies),
        ];
        if let Some(filter) = query.str_param("filter") {
            params.push(("filter", filter.to_string()));
        }
        if let Some(token) = &self.auth_token {
            params.push(("auth_token", token.expose_secret().to_string()));
        }
        let url = endpoint(&self.base_url, "posts/", &[], &params)?;
        self.client.get(url).await.map(RawResult::new)
    }
}
