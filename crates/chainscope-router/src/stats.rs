// SPDX-FileCopyrightText: 2026 Chainscope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-provider runtime health: counters, latency average and circuit breaker.
//!
//! Entries are created lazily on first use and live until the tracker is
//! dropped. Each entry sits behind an `Arc` in a [`DashMap`] shard, so the
//! map lock is never held across an await.

use std::sync::Arc;
use std::time::Duration;

use chainscope_core::ProviderStats;
use chainscope_resilience::{BreakerSettings, CircuitBreaker};
use dashmap::DashMap;
use tokio::sync::Mutex;

/// Weight of the newest sample in the latency average.
pub const LATENCY_EMA_ALPHA: f64 = 0.3;

#[derive(Debug, Default, Clone, Copy)]
struct Counters {
    total: u64,
    successes: u64,
    failures: u64,
    avg_latency_ms: Option<f64>,
}

impl Counters {
    fn sample_latency(&mut self, latency: Duration) {
        let sample = latency.as_secs_f64() * 1000.0;
        self.avg_latency_ms = Some(match self.avg_latency_ms {
            Some(old) => LATENCY_EMA_ALPHA * sample + (1.0 - LATENCY_EMA_ALPHA) * old,
            None => sample,
        });
    }
}

/// Health record for one provider.
#[derive(Debug)]
pub struct ProviderHealth {
    breaker: CircuitBreaker,
    counters: Mutex<Counters>,
}

impl ProviderHealth {
    fn new(provider_id: &str, settings: BreakerSettings) -> Self {
        Self {
            breaker: CircuitBreaker::new(provider_id, settings),
            counters: Mutex::new(Counters::default()),
        }
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    pub fn provider_id(&self) -> &str {
        self.breaker.provider_id()
    }

    /// Records one completed attempt.
    pub async fn record_attempt(&self, success: bool, latency: Duration) {
        let mut counters = self.counters.lock().await;
        counters.total += 1;
        if success {
            counters.successes += 1;
        } else {
            counters.failures += 1;
        }
        counters.sample_latency(latency);
    }

    /// Records a call skipped because the breaker was open. Counts as a
    /// failure without a latency sample.
    pub async fn record_skip(&self) {
        let mut counters = self.counters.lock().await;
        counters.total += 1;
        counters.failures += 1;
    }

    pub async fn reset(&self) {
        *self.counters.lock().await = Counters::default();
        self.breaker.reset().await;
    }

    pub async fn snapshot(&self) -> ProviderStats {
        let counters = *self.counters.lock().await;
        let breaker = self.breaker.snapshot().await;
        ProviderStats {
            provider_id: self.provider_id().to_string(),
            total_queries: counters.total,
            successes: counters.successes,
            failures: counters.failures,
            consecutive_failures: breaker.consecutive_failures,
            rolling_avg_latency_ms: counters.avg_latency_ms.unwrap_or(0.0),
            circuit_state: breaker.state,
            circuit_opened_at: breaker.opened_at,
        }
    }
}

/// Registry of [`ProviderHealth`] entries keyed by provider id.
#[derive(Debug)]
pub struct StatsTracker {
    entries: DashMap<String, Arc<ProviderHealth>>,
    settings: BreakerSettings,
}

impl StatsTracker {
    pub fn new(settings: BreakerSettings) -> Self {
        Self {
            entries: DashMap::new(),
            settings,
        }
    }

    /// Health entry for `provider_id`, created on first use.
    pub fn health(&self, provider_id: &str) -> Arc<ProviderHealth> {
        if let Some(entry) = self.entries.get(provider_id) {
            return Arc::clone(entry.value());
        }
        let entry = self
            .entries
            .entry(provider_id.to_string())
            .or_insert_with(|| Arc::new(ProviderHealth::new(provider_id, self.settings)));
        Arc::clone(entry.value())
    }

    /// Snapshot for one provider, `None` if it has never been used.
    pub async fn get(&self, provider_id: &str) -> Option<ProviderStats> {
        let entry = self.entries.get(provider_id).map(|e| Arc::clone(e.value()))?;
        Some(entry.snapshot().await)
    }

    /// Snapshots of every tracked provider, sorted by id.
    pub async fn snapshot_all(&self) -> Vec<ProviderStats> {
        let entries: Vec<Arc<ProviderHealth>> =
            self.entries.iter().map(|e| Arc::clone(e.value())).collect();
        let mut stats = Vec::with_capacity(entries.len());
        for entry in entries {
            stats.push(entry.snapshot().await);
        }
        stats.sort_by(|a, b| a.provider_id.cmp(&b.provider_id));
        stats
    }

    /// Clears counters and closes the breaker for one provider.
    /// Returns `false` if the provider was never tracked.
    pub async fn reset(&self, provider_id: &str) -> bool {
        let Some(entry) = self.entries.get(provider_id).map(|e| Arc::clone(e.value())) else {
            return false;
        };
        entry.reset().await;
        true
    }

    pub async fn reset_all(&self) {
        let entries: Vec<Arc<ProviderHealth>> =
            self.entries.iter().map(|e| Arc::clone(e.value())).collect();
        for entry in entries {
            entry.reset().await;
        }
    }
}

impl Default for StatsTracker {
    fn default() -> Self {
        Self::new(BreakerSettings::default())
    }
}
