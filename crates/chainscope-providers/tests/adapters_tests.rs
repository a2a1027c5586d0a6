// SPDX-FileCopyrightText: 2026 Chainscope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapters built from configuration, exercised against a local mock server.

use std::sync::Arc;
use std::time::Duration;

use chainscope_config::model::ProvidersConfig;
use chainscope_core::{ProviderAdapter, ProviderError, QueryRequest, QueryType};
use chainscope_providers::default_adapters;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn pointed_at(server: &MockServer) -> ProvidersConfig {
    let mut config = ProvidersConfig::default();
    let uri = server.uri();
    config.defillama.base_url = uri.clone();
    config.defillama.coins_url = uri.clone();
    config.defillama.stablecoins_url = uri.clone();
    config.coingecko.base_url = uri.clone();
    config.dune.base_url = uri.clone();
    config.dune.api_key = Some("dune-key".into());
    config.dune.poll_interval_ms = 5;
    config.etherscan.base_url = uri.clone();
    config.etherscan.api_key = Some("es-key".into());
    config.cryptopanic.base_url = uri.clone();
    config.deribit.base_url = uri.clone();
    config.reddit.base_url = uri.clone();
    config.github.base_url = uri;
    config
}

fn find(adapters: &[Arc<dyn ProviderAdapter>], id: &str) -> Arc<dyn ProviderAdapter> {
    adapters.iter().find(|a| a.id() == id).unwrap().clone()
}

#[tokio::test]
async fn token_price_served_by_both_price_providers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/simple/price"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"bitcoin": {"usd": 1.0}})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/prices/current/coingecko:bitcoin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"coins": {}})))
        .mount(&server)
        .await;

    let adapters = default_adapters(&pointed_at(&server)).unwrap();
    let query = QueryRequest::new(QueryType::TokenPrice).with_param("ids", "bitcoin");

    let serving: Vec<_> = adapters
        .iter()
        .filter(|a| a.supports(QueryType::TokenPrice))
        .map(|a| a.id().to_string())
        .collect();
    assert_eq!(serving, ["defillama", "coingecko"]);

    for id in &serving {
        find(&adapters, id).fetch(&query).await.unwrap();
    }
}

#[tokio::test]
async fn keyed_adapters_activate_with_keys() {
    let server = MockServer::start().await;
    let adapters = default_adapters(&pointed_at(&server)).unwrap();
    assert!(find(&adapters, "dune").supports(QueryType::CustomQuery));
    assert!(find(&adapters, "etherscan").supports(QueryType::WalletActivity));
    assert!(find(&adapters, "etherscan").supports(QueryType::TokenBalance));
}

#[tokio::test]
async fn dune_full_execution_cycle() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/query/99/execute"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"execution_id": "E1"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/execution/E1/status"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"state": "QUERY_STATE_PENDING"})),
        )
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/execution/E1/status"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"state": "QUERY_STATE_COMPLETED"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/execution/E1/results"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"result": {"rows": [{"n": 1}]}})),
        )
        .mount(&server)
        .await;

    let adapters = default_adapters(&pointed_at(&server)).unwrap();
    let query = QueryRequest::new(QueryType::CustomQuery).with_param("query_id", 99);
    let raw = find(&adapters, "dune").fetch(&query).await.unwrap();
    assert_eq!(raw.data["result"]["rows"][0]["n"], 1);
}

#[tokio::test]
async fn dune_cancelled_execution_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"execution_id": "E2"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/execution/E2/status"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"state": "QUERY_STATE_CANCELLED"})),
        )
        .mount(&server)
        .await;

    let adapters = default_adapters(&pointed_at(&server)).unwrap();
    let query = QueryRequest::new(QueryType::CustomQuery).with_param("sql", "SELECT 1");
    let err = find(&adapters, "dune").fetch(&query).await.unwrap_err();
    assert!(matches!(err, ProviderError::Unavailable { .. }));
}

#[tokio::test]
async fn options_and_news_adapters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get_book_summary_by_currency"))
        .and(query_param("currency", "ETH"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"jsonrpc": "2.0", "result": []})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/posts/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .expect(1)
        .mount(&server)
        .await;

    let adapters = default_adapters(&pointed_at(&server)).unwrap();
    let options = QueryRequest::new(QueryType::OptionsData).with_param("currency", "eth");
    find(&adapters, "deribit").fetch(&options).await.unwrap();
    let news = QueryRequest::new(QueryType::NewsSentiment);
    find(&adapters, "cryptopanic").fetch(&news).await.unwrap();
}

#[tokio::test]
async fn social_and_development_adapters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/r/bitcoin/hot.json"))
        .and(query_param("limit", "10"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"data": {"children": []}})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/ethereum/go-ethereum"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"forks_count": 20000})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/ethereum/go-ethereum/stats/commit_activity"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"total": 12}])))
        .expect(1)
        .mount(&server)
        .await;

    let adapters = default_adapters(&pointed_at(&server)).unwrap();
    let social = QueryRequest::new(QueryType::SocialSentiment)
        .with_param("subreddit", "bitcoin")
        .with_param("limit", 10);
    find(&adapters, "reddit").fetch(&social).await.unwrap();

    let activity = QueryRequest::new(QueryType::GithubActivity)
        .with_param("owner", "ethereum")
        .with_param("repo", "go-ethereum");
    let raw = find(&adapters, "github").fetch(&activity).await.unwrap();
    assert_eq!(raw.data["repository"]["forks_count"], 20000);
    assert_eq!(raw.data["commit_activity"][0]["total"], 12);
}

#[tokio::test]
async fn slow_provider_hits_client_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let mut config = pointed_at(&server);
    config.defillama.timeout_secs = 1;
    let adapters = default_adapters(&config).unwrap();
    let query = QueryRequest::new(QueryType::ProtocolTvl).with_param("protocol", "aave");
    let err = find(&adapters, "defillama").fetch(&query).await.unwrap_err();
    assert!(matches!(err, ProviderError::Timeout { .. }));
}

#[tokio::test]
async fn path_values_cannot_escape_their_segment() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/historicalChainTvl/Ethereum%2F..%2F..%2Fprotocol%2Faave"))
        .respond_with(ResponseTemplate::new(404).set_body_string("unknown chain"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/protocol/aave"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"tvl": []})))
        .expect(0)
        .mount(&server)
        .await;

    let adapters = default_adapters(&pointed_at(&server)).unwrap();
    let query = QueryRequest::new(QueryType::ChainMetrics)
        .with_param("chain", "Ethereum/../../protocol/aave");
    let err = find(&adapters, "defillama").fetch(&query).await.unwrap_err();
    assert!(err.is_bad_request(), "{err}");
}

#[tokio::test]
async fn empty_coin_id_is_rejected_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let adapters = default_adapters(&pointed_at(&server)).unwrap();
    let coingecko = find(&adapters, "coingecko");
    for id in ["", "   "] {
        let query = QueryRequest::new(QueryType::TokenMetrics).with_param("id", id);
        let err = coingecko.fetch(&query).await.unwrap_err();
        assert!(err.is_bad_request(), "{id:?}: {err}");
    }
    assert!(server.received_requests().await.unwrap().is_empty());
}
