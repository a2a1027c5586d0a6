// SPDX-FileCopyrightText: 2026 Chainscope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reddit adapter for `social_sentiment`, reading a subreddit's hot listing.
//!
//! Parameters: `subreddit` (with or without the `r/` prefix, defaults to the
//! configured one) and `limit` (1 to 100 posts, default 100). The listing is
//! returned as Reddit sends it; scoring the mood is left to the caller.

use async_trait::async_trait;
use chainscope_config::model::{ProviderHints, RedditConfig};
use chainscope_core::{
    ChainscopeError, ProviderAdapter, ProviderError, QueryRequest, QueryType, RawResult,
};
use reqwest::header::HeaderMap;
use serde_json::Value;

use crate::client::{JsonClient, endpoint};

pub const ID: &str = "reddit";

const CAPABILITIES: &[QueryType] = &[QueryType::SocialSentiment];

/// Most posts a single listing page returns.
const MAX_LIMIT: i64 = 100;

pub struct RedditAdapter {
    client: JsonClient,
    base_url: String,
    default_subreddit: String,
    confidence: f64,
}

impl RedditAdapter {
    pub fn new(config: &RedditConfig) -> Result<Self, ChainscopeError> {
        Ok(Self {
            client: JsonClient::new(ID, config.timeout(), HeaderMap::new())?,
            base_url: config.base_url.clone(),
            default_subreddit: config.default_subreddit.clone(),
            confidence: config.confidence,
        })
    }

    fn limit(query: &QueryRequest) -> Result<i64, ProviderError> {
        match query.param("limit") {
            None => Ok(MAX_LIMIT),
            Some(v) => v
                .as_i64()
                .filter(|n| (1..=MAX_LIMIT).contains(n))
                .ok_or_else(|| {
                    ProviderError::bad_request(format!("limit must be 1 to {MAX_LIMIT}, got {v}"))
                }),
        }
    }
}

#[async_trait]
impl ProviderAdapter for RedditAdapter {
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
        if query.query_type() != QueryType::SocialSentiment {
            return Err(ProviderError::bad_request(format!(
                "{ID} does not serve {}",
                query.query_type()
            )));
        }
        let subreddit = query
            .str_param("subreddit")
            .unwrap_or(&self.default_subreddit)
            .trim();
        let subreddit = subreddit.strip_prefix("r/").unwrap_or(subreddit);
        let limit = Self::limit(query)?;

        let url = endpoint(
            &self.base_url,
            "r",
            &[subreddit, "hot.json"],
            &[("limit", limit.to_string()), ("raw_json", "1".to_string())],
        )?;
        let body = self.client.get(url).await?;
        if body.pointer("/data/children").and_then(Value::as_array).is_none() {
            return Err(ProviderError::unavailable("reddit response has no listing"));
        }
        Ok(RawResult::new(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn adapter(server: &MockServer) -> RedditAdapter {
        RedditAdapter::new(&RedditConfig {
            base_url: server.uri(),
            ..RedditConfig::default()
        })
        .unwrap()
    }

    fn listing() -> Value {
        json!({
            "kind": "Listing",
            "data": {"children": [
                {"kind": "t3", "data": {"title": "ETH ATH?", "score": 420, "upvote_ratio": 0.91, "num_comments": 88}}
            ]}
        })
    }

    #[tokio::test]
    async fn hot_listing_for_default_subreddit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/r/cryptocurrency/hot.json"))
            .and(query_param("limit", "100"))
            .respond_with(ResponseTemplate::new(200).set_body_json(listing()))
            .expect(1)
            .mount(&server)
            .await;

        let raw = adapter(&server)
            .fetch(&QueryRequest::new(QueryType::SocialSentiment))
            .await
            .unwrap();
        assert_eq!(raw.data, listing());
    }

    #[tokio::test]
    async fn prefix_is_stripped_and_limit_forwarded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/r/ethereum/hot.json"))
            .and(query_param("limit", "25"))
            .respond_with(ResponseTemplate::new(200).set_body_json(listing()))
            .expect(1)
            .mount(&server)
            .await;

        let query = QueryRequest::new(QueryType::SocialSentiment)
            .with_param("subreddit", "r/ethereum")
            .with_param("limit", 25);
        adapter(&server).fetch(&query).await.unwrap();
    }

    #[tokio::test]
    async fn out_of_range_limit_is_bad_request() {
        let server = MockServer::start().await;
        for limit in [0, 101] {
            let query = QueryRequest::new(QueryType::SocialSentiment).with_param("limit", limit);
            assert!(adapter(&server).fetch(&query).await.unwrap_err().is_bad_request());
        }
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn blank_subreddit_is_rejected() {
        let server = MockServer::start().await;
        let query = QueryRequest::new(QueryType::SocialSentiment).with_param("subreddit", "r/");
        assert!(adapter(&server).fetch(&query).await.unwrap_err().is_bad_request());
    }

    #[tokio::test]
    async fn non_listing_body_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Forbidden"})))
            .mount(&server)
            .await;

        let err = adapter(&server)
            .fetch(&QueryRequest::new(QueryType::SocialSentiment))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Unavailable { .. }));
    }
}
