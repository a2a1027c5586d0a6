// SPDX-FileCopyrightText: 2026 Chainscope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dune Analytics adapter for `custom_query`.
//!
//! Parameters:
//! - `query_id`: saved query to execute, or
//! - `sql`: raw SQL executed through the SQL endpoint;
//! - `use_latest` (bool): return the last stored result of `query_id`
//!   without starting a new execution;
//! - `param.<name>`: forwarded as `query_parameters.<name>`;
//! - `performance`: `medium` or `large`, overriding the configured tier.
//!
//! Executions are asynchronous on Dune's side. The adapter starts one, polls
//! its status every `poll_interval` up to `max_polls` times, then fetches the
//! results. The whole sequence counts as a single adapter call.
//!
//! An execution that is still running when polling gives up is remembered
//! under the request's cache key. The next fetch of the same request polls
//! that execution again instead of starting (and paying for) a new one.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chainscope_config::model::{DuneConfig, ProviderHints};
use chainscope_core::{
    CacheKey, ChainscopeError, ProviderAdapter, ProviderError, QueryRequest, QueryType, RawResult,
};
use reqwest::header::HeaderMap;
use secrecy::ExposeSecret;
use serde_json::{Map, Value, json};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::client::{JsonClient, api_key, endpoint, header};

pub const ID: &str = "dune";

const CAPABILITIES: &[QueryType] = &[QueryType::CustomQuery];

const PARAM_PREFIX: &str = "param.";

/// Terminal execution states reported by `/execution/{id}/status`.
const STATE_COMPLETED: &str = "QUERY_STATE_COMPLETED";
const STATE_FAILED: &str = "QUERY_STATE_FAILED";
const STATE_CANCELLED: &str = "QUERY_STATE_CANCELLED";
const STATE_EXPIRED: &str = "QUERY_STATE_EXPIRED";

pub struct DuneAdapter {
    client: JsonClient,
    base_url: String,
    enabled: bool,
    poll_interval: Duration,
    max_polls: u32,
    performance: String,
    confidence: f64,
    /// Executions that outlived their polling budget, by request.
    pending: Mutex<HashMap<CacheKey, String>>,
}

impl DuneAdapter {
    pub fn new(config: &DuneConfig) -> Result<Self, ChainscopeError> {
        let (headers, enabled) = match api_key(config.api_key.as_deref()) {
            Some(key) => (header("x-dune-api-key", key.expose_secret())?, true),
            None => {
                warn!(provider = ID, "no API key configured, custom queries disabled");
                (HeaderMap::new(), false)
            }
        };
        Ok(Self {
            client: JsonClient::new(ID, config.timeout(), headers)?,
            base_url: config.base_url.clone(),
            enabled,
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            max_polls: config.max_polls.max(1),
            performance: config.performance.clone(),
            confidence: config.confidence,
            pending: Mutex::new(HashMap::new()),
        })
    }

    fn query_id(query: &QueryRequest) -> Result<Option<i64>, ProviderError> {
        match query.param("query_id") {
            None => Ok(None),
            Some(v) => v
                .as_i64()
                .filter(|id| *id > 0)
                .map(Some)
                .ok_or_else(|| ProviderError::bad_request(format!("invalid query_id: {v}"))),
        }
    }

    fn execution_body(&self, query: &QueryRequest) -> Value {
        let parameters: Map<String, Value> = query
            .parameters()
            .iter()
            .filter_map(|(k, v)| {
                let name = k.strip_prefix(PARAM_PREFIX)?;
                Some((name.to_string(), serde_json::to_value(v).unwrap_or(Value::Null)))
            })
            .collect();
        let performance = query.str_param("performance").unwrap_or(&self.performance);
        let mut body = json!({ "performance": performance });
        if !parameters.is_empty() {
            body["query_parameters"] = Value::Object(parameters);
        }
        body
    }

    async fn start(&self, query: &QueryRequest) -> Result<String, ProviderError> {
        let mut body = self.execution_body(query);
        let url = match (Self::query_id(query)?, query.str_param("sql")) {
            (Some(id), _) => endpoint(&self.base_url, "query", &[&id.to_string(), "execute"], &[])?,
            (None, Some(sql)) if !sql.trim().is_empty() => {
                body["sql"] = Value::String(sql.to_string());
                endpoint(&self.base_url, "sql/execute", &[], &[])?
            }
            _ => {
                return Err(ProviderError::bad_request(
                    "custom_query requires 'query_id' or 'sql'",
                ));
            }
        };
        let response = self.client.post(url, &body).await?;
        response
            .get("execution_id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| ProviderError::unavailable("dune execute response has no execution_id"))
    }

    async fn wait_for_completion(&self, execution_id: &str) -> Result<(), ProviderError> {
        let url = endpoint(&self.base_url, "execution", &[execution_id, "status"], &[])?;
        for poll in 1..=self.max_polls {
            let status = self.client.get(url.clone()).await?;
            let state = status.get("state").and_then(Value::as_str).unwrap_or_default();
            debug!(provider = ID, execution_id, poll, state, "execution status");
            match state {
                STATE_COMPLETED => return Ok(()),
                STATE_FAILED => {
                    let reason = status
                        .pointer("/error/message")
                        .and_then(Value::as_str)
                        .unwrap_or("query execution failed");
                    return Err(ProviderError::bad_request(format!("dune: {reason}")));
                }
                STATE_CANCELLED | STATE_EXPIRED => {
                    return Err(ProviderError::unavailable(format!("dune execution {state}")));
                }
                _ => tokio::time::sleep(self.poll_interval).await,
            }
        }
        Err(ProviderError::timeout(format!(
            "dune execution {execution_id} not finished after {} polls",
            self.max_polls
        )))
    }

    async fn latest(&self, query_id: i64) -> Result<RawResult, ProviderError> {
        let url = endpoint(&self.base_url, "query", &[&query_id.to_string(), "results"], &[])?;
        self.client.get(url).await.map(RawResult::new)
    }

    async fn results(&self, execution_id: &str) -> Result<RawResult, ProviderError> {
        self.wait_for_completion(execution_id).await?;
        let url = endpoint(&self.base_url, "execution", &[execution_id, "results"], &[])?;
        self.client.get(url).await.map(RawResult::new)
    }
}

#[async_trait]
impl ProviderAdapter for DuneAdapter {
    fn id(&self) -> &str {
        ID
    }

    fn capabilities(&self) -> &[QueryType] {
        if self.enabled { CAPABILITIES } else { &[] }
    }

    fn confidence(&self) -> f64 {
        self.confidence
    }

    async fn fetch(&self, query: &QueryRequest) -> Result<RawResult, ProviderError> {
        if !self.enabled {
            return Err(ProviderError::bad_request("dune API key not configured"));
        }
        if query.query_type() != QueryType::CustomQuery {
            return Err(ProviderError::bad_request(format!(
                "{ID} does not serve {}",
                query.query_type()
            )));
        }

        let use_latest = query
            .param("use_latest")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        if use_latest {
            let id = Self::query_id(query)?
                .ok_or_else(|| ProviderError::bad_request("use_latest requires 'query_id'"))?;
            return self.latest(id).await;
        }

        let key = query.cache_key();
        let resumed = self.pending.lock().await.remove(&key);
        let execution_id = match resumed {
            Some(id) => {
                debug!(provider = ID, execution_id = %id, "resuming unfinished execution");
                id
            }
            None => self.start(query).await?,
        };
        match self.results(&execution_id).await {
            Err(e @ ProviderError::Timeout { .. }) => {
                self.pending.lock().await.insert(key, execution_id);
                Err(e)
            }
            other => other,
        }
    }
}
