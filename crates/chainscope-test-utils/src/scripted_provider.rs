// SPDX-FileCopyrightText: 2026 Chainscope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted provider adapter for deterministic routing tests.
//!
//! `ScriptedProvider` implements `ProviderAdapter` with a FIFO queue of
//! outcomes. When the queue is empty the fallback outcome is returned
//! (by default a small JSON object naming the provider).

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::sync::Mutex;
use tokio::time::Instant;

use chainscope_core::{ProviderAdapter, ProviderError, QueryRequest, QueryType, RawResult};

type Outcome = Result<Value, ProviderError>;

/// A provider that replays pre-configured outcomes and records its calls.
pub struct ScriptedProvider {
    id: String,
    capabilities: Vec<QueryType>,
    confidence: f64,
    delay: Duration,
    script: Mutex<VecDeque<Outcome>>,
    fallback: Outcome,
    calls: Mutex<Vec<(Instant, QueryRequest)>>,
}

impl ScriptedProvider {
    pub fn new(id: impl Into<String>, capabilities: &[QueryType]) -> Self {
        let id = id.into();
        Self {
            fallback: Ok(json!({ "provider": id })),
            id,
            capabilities: capabilities.to_vec(),
            confidence: 1.0,
            delay: Duration::ZERO,
            script: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    /// Sleep this long inside every call before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Queue a successful response.
    pub fn then_ok(mut self, data: Value) -> Self {
        self.script.get_mut().push_back(Ok(data));
        self
    }

    /// Queue a failure.
    pub fn then_err(mut self, error: ProviderError) -> Self {
        self.script.get_mut().push_back(Err(error));
        self
    }

    /// Outcome returned once the queue is empty.
    pub fn otherwise(mut self, outcome: Outcome) -> Self {
        self.fallback = outcome;
        self
    }

    /// Fail every call with `error`.
    pub fn always_failing(self, error: ProviderError) -> Self {
        self.otherwise(Err(error))
    }

    /// Queue an outcome on a shared provider.
    pub async fn push(&self, outcome: Outcome) {
        self.script.lock().await.push_back(outcome);
    }

    /// Number of `fetch` calls so far.
    pub async fn calls(&self) -> usize {
        self.calls.lock().await.len()
    }

    /// Start time of every `fetch` call, in order.
    pub async fn call_times(&self) -> Vec<Instant> {
        self.calls.lock().await.iter().map(|(at, _)| *at).collect()
    }

    /// Gaps between consecutive calls.
    pub async fn call_gaps(&self) -> Vec<Duration> {
        let times = self.call_times().await;
        times.windows(2).map(|w| w[1] - w[0]).collect()
    }

    /// Requests received so far.
    pub async fn requests(&self) -> Vec<QueryRequest> {
        self.calls.lock().await.iter().map(|(_, q)| q.clone()).collect()
    }
}

#[async_trait]
impl ProviderAdapter for ScriptedProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn capabilities(&self) -> &[QueryType] {
        &self.capabilities
    }

    fn confidence(&self) -> f64 {
        self.confidence
    }

    async fn fetch(&self, query: &QueryRequest) -> Result<RawResult, ProviderError> {
        self.calls.lock().await.push((Instant::now(), query.clone()));
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let next = self.script.lock().await.pop_front();
        next.unwrap_or_else(|| self.fallback.clone())
            .map(RawResult::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replays_script_then_fallback() {
        let provider = ScriptedProvider::new("a", &[QueryType::TokenPrice])
            .then_err(ProviderError::timeout("slow"))
            .then_ok(json!({"price": 1}));
        let query = QueryRequest::new(QueryType::TokenPrice);

        assert!(provider.fetch(&query).await.is_err());
        assert_eq!(provider.fetch(&query).await.unwrap().data, json!({"price": 1}));
        assert_eq!(
            provider.fetch(&query).await.unwrap().data,
            json!({"provider": "a"})
        );
        assert_eq!(provider.calls().await, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn records_call_gaps() {
        let provider = ScriptedProvider::new("b", &[]).always_failing(ProviderError::unavailable("down"));
        let query = QueryRequest::new(QueryType::TokenPrice);
        let _ = provider.fetch(&query).await;
        tokio::time::advance(Duration::from_secs(2)).await;
        let _ = provider.fetch(&query).await;
        assert_eq!(provider.call_gaps().await, vec![Duration::from_secs(2)]);
    }
}
