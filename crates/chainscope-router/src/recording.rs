// SPDX-FileCopyrightText: 2026 Chainscope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric registration and recording helpers.
//!
//! Uses the metrics-rs facade. Nothing is exported unless the host
//! application installs a recorder.

use std::time::Duration;

use metrics::{describe_counter, describe_histogram};

/// Register all Chainscope metric descriptions.
pub fn register_metrics() {
    describe_counter!(
        "chainscope_provider_attempts_total",
        "Provider calls by provider and outcome"
    );
    describe_histogram!(
        "chainscope_provider_latency_seconds",
        "Latency of individual provider calls in seconds"
    );
    describe_counter!("chainscope_cache_hits_total", "Cache hits by query type");
    describe_counter!("chainscope_cache_misses_total", "Cache misses by query type");
    describe_counter!(
        "chainscope_circuit_open_total",
        "Circuit breaker openings by provider"
    );
    describe_counter!(
        "chainscope_exhausted_total",
        "Requests that exhausted every provider, by query type"
    );
}

/// Record one provider call. `outcome` is `success` or a failure kind.
pub fn record_attempt(provider: &str, outcome: &'static str, latency: Duration) {
    metrics::counter!(
        "chainscope_provider_attempts_total",
        "provider" => provider.to_string(),
        "outcome" => outcome
    )
    .increment(1);
    metrics::histogram!("chainscope_provider_latency_seconds", "provider" => provider.to_string())
        .record(latency.as_secs_f64());
}

/// Record a call skipped by an open breaker.
pub fn record_skip(provider: &str) {
    metrics::counter!(
        "chainscope_provider_attempts_total",
        "provider" => provider.to_string(),
        "outcome" => "circuit_open"
    )
    .increment(1);
}

pub fn record_circuit_open(provider: &str) {
    metrics::counter!("chainscope_circuit_open_total", "provider" => provider.to_string())
        .increment(1);
}

pub fn record_cache_hit(query_type: &str) {
    metrics::counter!("chainscope_cache_hits_total", "query_type" => query_type.to_string())
        .increment(1);
}

pub fn record_cache_miss(query_type: &str) {
    metrics::counter!("chainscope_cache_misses_total", "query_type" => query_type.to_string())
        .increment(1);
}

pub fn record_exhausted(query_type: &str) {
    metrics::counter!("chainscope_exhausted_total", "query_type" => query_type.to_string())
        .increment(1);
}
