// SPDX-FileCopyrightText: 2026 Chainscope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! GitHub adapter for `github_activity`.
//!
//! Requires `owner` and `repo`. One fetch reads the repository metadata and
//! its weekly commit activity and returns both:
//!
//! ```json
//! {"repository": {...}, "commit_activity": [{"week": 1718496000, "total": 42, "days": [...]}]}
//! ```
//!
//! GitHub computes commit statistics lazily and answers `202` with an empty
//! object until they are ready, so `commit_activity` may be empty. A token
//! is optional and only raises the rate limit.

use async_trait::async_trait;
use chainscope_config::model::{GitHubConfig, ProviderHints};
use chainscope_core::{
    ChainscopeError, ProviderAdapter, ProviderError, QueryRequest, QueryType, RawResult,
};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde_json::{Value, json};
use tracing::debug;

use crate::client::{JsonClient, api_key, endpoint, header, required_str};

pub const ID: &str = "github";

const CAPABILITIES: &[QueryType] = &[QueryType::GithubActivity];

pub struct GitHubAdapter {
    client: JsonClient,
    base_url: String,
    confidence: f64,
}

impl GitHubAdapter {
    pub fn new(config: &GitHubConfig) -> Result<Self, ChainscopeError> {
        let mut headers = match api_key(config.api_key.as_deref()) {
            Some(token) => header("authorization", &format!("Bearer {}", token.expose_secret()))?,
            None => HeaderMap::new(),
        };
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        Ok(Self {
            client: JsonClient::new(ID, config.timeout(), headers)?,
            base_url: config.base_url.clone(),
            confidence: config.confidence,
        })
    }

    async fn commit_activity(&self, owner: &str, repo: &str) -> Result<Value, ProviderError> {
        let url = endpoint(
            &self.base_url,
            "repos",
            &[owner, repo, "stats", "commit_activity"],
            &[],
        )?;
        match self.client.get(url).await {
            Ok(weeks @ Value::Array(_)) => Ok(weeks),
            Ok(_) => {
                debug!(provider = ID, owner, repo, "commit statistics not ready yet");
                Ok(json!([]))
            }
            Err(e @ ProviderError::RateLimited { .. }) => Err(e),
            Err(e) => {
                debug!(provider = ID, owner, repo, error = %e, "commit statistics unavailable");
                Ok(json!([]))
            }
        }
    }
}

#[async_trait]
impl ProviderAdapter for GitHubAdapter {
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
        if query.query_type() != QueryType::GithubActivity {
            return Err(ProviderError::bad_request(format!(
                "{ID} does not serve {}",
                query.query_type()
            )));
        }
        let owner = required_str(query, "owner")?.trim();
        let repo = required_str(query, "repo")?.trim();

        let url = endpoint(&self.base_url, "repos", &[owner, repo], &[])?;
        let repository = self.client.get(url).await?;
        let commit_activity = self.commit_activity(owner, repo).await?;
        Ok(RawResult::new(json!({
            "repository": repository,
            "commit_activity": commit_activity,
        })))
    }
}
