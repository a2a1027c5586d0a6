// SPDX-FileCopyrightText: 2026 Chainscope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deribit public API adapter for options book summaries.

use async_trait::async_trait;
use chainscope_config::model::{DeribitConfig, ProviderHints};
use chainscope_core::{
    ChainscopeError, ProviderAdapter, ProviderError, QueryRequest, QueryType, RawResult,
};
use reqwest::header::HeaderMap;

use crate::client::{JsonClient, endpoint};

pub const ID: &str = "deribit";

const CAPABILITIES: &[QueryType] = &[QueryType::OptionsData];

pub struct DeribitAdapter {
    client: JsonClient,
    base_url: String,
    confidence: f64,
}

impl DeribitAdapter {
    pub fn new(config: &DeribitConfig) -> Result<Self, ChainscopeError> {
        Ok(Self {
            client: JsonClient::new(ID, config.timeout(), HeaderMap::new())?,
            base_url: config.base_url.clone(),
            confidence: config.confidence,
        })
    }
}

#[async_trait]
impl ProviderAdapter for DeribitAdapter {
    fn id(&self) -> &str {
        ID
    }

    fn capabilities(&self) -> &[QueryType] {
        CAPABILITIES
    }

    fn confidence(&self) -> f64 {
        self.confidence
    }

    /// `currency` defaults to BTC; `kind` defaults to `option`.
    async fn fetch(&self, query: &QueryRequest) -> Result<RawResult, ProviderError> {
        if query.query_type() != QueryType::OptionsData {
            return Err(ProviderError::bad_request(format!(
                "{ID} does not serve {}",
                query.query_type()
            )));
        }
        let currency = query.str_param("currency").unwrap_or("BTC").to_uppercase();
        let kind = query.str_param("kind").unwrap_or("option").to_string();
        let url = endpoint(
            &self.base_url,
            "get_book_summary_by_currency",
            &[],
            &[("currency", currency), ("kind", kind)],
        )?;
        let body = self.client.get(url).await?;
        if body.get("result").is_none() {
            return Err(ProviderError::unavailable("deribit response has no result field"));
        }
        Ok(RawResult::new(body))
    }
}
