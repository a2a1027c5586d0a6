// SPDX-FileCopyrightText: 2026 Chainscope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fallback routing across providers.
//!
//! Orchestrates one request: configured chain > capability filter > band
//! ordering > stats re-ranking > sequential walk under the retry policy.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use chainscope_config::ChainscopeConfig;
use chainscope_config::model::RoutingConfig;
use chainscope_core::{
    AttemptFailure, ChainscopeError, FailureReason, ProviderError, ProviderRecord, QueryRequest,
    QueryType, RawResult,
};
use chainscope_resilience::{BreakerSettings, RetryPolicy};
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::classifier::{Classification, ComplexityBand, ComplexityClassifier};
use crate::ranking::{RerankPolicy, band_order};
use crate::recording;
use crate::registry::ProviderRegistry;
use crate::stats::StatsTracker;

/// Provider order chosen for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutePlan {
    pub classification: Classification,
    pub order: Vec<String>,
}

/// Successful walk outcome.
#[derive(Debug, Clone)]
pub struct Routed {
    pub provider_id: String,
    pub raw: RawResult,
    /// Confidence declared by the serving provider.
    pub confidence: f64,
    /// Wall time of the whole walk, including failed providers and waits.
    pub latency: Duration,
    /// Providers that failed or were skipped before the serving one.
    pub failed: Vec<AttemptFailure>,
}

/// Walks fallback chains with breakers, retries and stats.
#[derive(Debug)]
pub struct FallbackRouter {
    registry: ProviderRegistry,
    stats: StatsTracker,
    classifier: ComplexityClassifier,
    retry: RetryPolicy,
    rerank: RerankPolicy,
    routing: RoutingConfig,
}

impl FallbackRouter {
    pub fn new(registry: ProviderRegistry, config: &ChainscopeConfig) -> Self {
        Self {
            registry,
            stats: StatsTracker::new(BreakerSettings::from_config(&config.circuit_breaker)),
            classifier: ComplexityClassifier::new(&config.classifier),
            retry: RetryPolicy::from_config(&config.retry),
            rerank: RerankPolicy {
                min_samples: config.routing.min_samples,
                margin: config.routing.rerank_margin,
            },
            routing: config.routing.clone(),
        }
    }

    /// Replaces the retry policy built from configuration.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn stats(&self) -> &StatsTracker {
        &self.stats
    }

    pub fn classifier(&self) -> &ComplexityClassifier {
        &self.classifier
    }

    /// Registered providers from the configured chain that declare `query_type`,
    /// in configured order without duplicates.
    pub fn chain_for(&self, query_type: QueryType) -> Vec<&ProviderRecord> {
        let mut seen = HashSet::new();
        self.routing
            .chain_for(query_type)
            .iter()
            .filter(|id| seen.insert(id.as_str()))
            .filter_map(|id| self.registry.record(id))
            .filter(|record| record.supports(query_type))
            .collect()
    }

    pub fn is_supported(&self, query_type: QueryType) -> bool {
        !self.chain_for(query_type).is_empty()
    }

    /// Classifies `request` and orders its chain.
    pub async fn plan(&self, request: &QueryRequest) -> Result<RoutePlan, ChainscopeError> {
        let query_type = request.query_type();
        let mut chain = self.chain_for(query_type);
        if chain.is_empty() {
            return Err(ChainscopeError::UnsupportedQuery { query_type });
        }

        let classification = self.classifier.classify(request);
        let heavyweight = self.routing.heavyweight_provider.as_deref();
        band_order(&mut chain, classification.band, heavyweight);
        let mut order: Vec<String> = chain.iter().map(|r| r.provider_id.clone()).collect();

        let mut snapshots = HashMap::with_capacity(order.len());
        for id in &order {
            if let Some(stats) = self.stats.get(id).await {
                snapshots.insert(id.clone(), stats);
            }
        }

        // A pinned heavyweight provider keeps the head of the chain.
        let pinned = classification.band == ComplexityBand::Heavy
            && heavyweight.is_some_and(|h| order.first().is_some_and(|first| first == h));
        let tail = if pinned { &mut order[1..] } else { &mut order[..] };
        self.rerank.rerank(tail, |id| snapshots.get(id).cloned());

        Ok(RoutePlan {
            classification,
            order,
        })
    }

    /// Walks the chain for `request` until a provider succeeds, the chain is
    /// exhausted, or `deadline` passes.
    pub async fn route(
        &self,
        request: &QueryRequest,
        deadline: Instant,
    ) -> Result<Routed, ChainscopeError> {
        let query_type = request.query_type();
        let plan = self.plan(request).await?;
        debug!(
            query_type = %query_type,
            band = %plan.classification.band,
            score = plan.classification.score,
            chain = ?plan.order,
            "routing request"
        );

        let started = Instant::now();
        let mut failed = Vec::new();
        let mut deadline_exceeded = false;

        for id in &plan.order {
            if Instant::now() >= deadline {
                deadline_exceeded = true;
                break;
            }
            let (Some(adapter), Some(record)) =
                (self.registry.adapter(id), self.registry.record(id))
            else {
                continue;
            };

            let health = self.stats.health(id);
            let health_ref = health.as_ref();
            let openings_before = health.breaker().snapshot().await.openings;
            let mut calls_made = 0u32;

            let outcome = self
                .retry
                .run(health.breaker(), deadline, |attempt| {
                    calls_made = attempt;
                    async move {
                        let call_started = Instant::now();
                        let result = adapter.fetch(request).await;
                        let latency = call_started.elapsed();
                        health_ref.record_attempt(result.is_ok(), latency).await;
                        recording::record_attempt(id, outcome_label(&result), latency);
                        debug!(
                            provider = %id,
                            query_type = %query_type,
                            attempt,
                            latency_ms = latency.as_millis() as u64,
                            ok = result.is_ok(),
                            "provider call finished"
                        );
                        result
                    }
                })
                .await;

            match outcome {
                Ok(raw) => {
                    let latency = started.elapsed();
                    debug!(
                        provider = %id,
                        query_type = %query_type,
                        latency_ms = latency.as_millis() as u64,
                        fallbacks = failed.len(),
                        "request served"
                    );
                    return Ok(Routed {
                        provider_id: id.clone(),
                        raw,
                        confidence: record.confidence,
                        latency,
                        failed,
                    });
                }
                Err(FailureReason::DeadlineExceeded) => {
                    warn!(provider = %id, query_type = %query_type, "deadline exceeded mid-chain");
                    failed.push(AttemptFailure::new(id, FailureReason::DeadlineExceeded));
                    deadline_exceeded = true;
                    break;
                }
                Err(reason @ FailureReason::CircuitOpen { .. }) => {
                    // Calls already made were counted when they finished.
                    if calls_made == 0 {
                        health.record_skip().await;
                        recording::record_skip(id);
                    }
                    debug!(provider = %id, %reason, "provider skipped");
                    failed.push(AttemptFailure::new(id, reason));
                }
                Err(reason) => {
                    if health.breaker().snapshot().await.openings > openings_before {
                        recording::record_circuit_open(id);
                    }
                    warn!(
                        provider = %id,
                        query_type = %query_type,
                        error = %reason,
                        "provider failed, advancing chain"
                    );
                    failed.push(AttemptFailure::new(id, reason));
                }
            }
        }

        recording::record_exhausted(&query_type.to_string());
        warn!(
            query_type = %query_type,
            attempts = failed.len(),
            deadline_exceeded,
            "all providers exhausted"
        );
        Err(ChainscopeError::AllProvidersExhausted {
            query_type,
            attempts: failed,
            deadline_exceeded,
        })
    }
}

fn outcome_label<T>(result: &Result<T, ProviderError>) -> &'static str {
    match result {
        Ok(_) => "success",
        Err(e) => e.kind(),
    }
}
