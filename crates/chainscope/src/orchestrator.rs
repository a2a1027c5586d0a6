// SPDX-FileCopyrightText: 2026 Chainscope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The orchestrator facade: cache lookup, fallback routing and write-through
//! behind a single `execute` call.

use std::sync::Arc;

use chainscope_cache::{CacheEntry, CacheStore};
use chainscope_config::ChainscopeConfig;
use chainscope_core::{
    CacheKey, ChainscopeError, ProviderAdapter, ProviderRecord, ProviderStats, QueryRequest,
    QueryResult,
};
use chainscope_resilience::RetryPolicy;
use chainscope_router::{FallbackRouter, ProviderRegistry, RoutePlan, recording};
use chrono::Utc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Source reported for results served from the cache.
pub const CACHE_SOURCE: &str = "cache";

/// Assembles an [`Orchestrator`] from configuration and adapters.
///
/// Without explicit adapters the built-in HTTP adapters are created from the
/// `[providers]` section.
pub struct OrchestratorBuilder {
    config: ChainscopeConfig,
    adapters: Option<Vec<Arc<dyn ProviderAdapter>>>,
    retry: Option<RetryPolicy>,
    cache: Option<CacheStore>,
}

impl OrchestratorBuilder {
    pub fn new(config: ChainscopeConfig) -> Self {
        Self {
            config,
            adapters: None,
            retry: None,
            cache: None,
        }
    }

    /// Registers one adapter. Replaces the built-in set.
    pub fn adapter(mut self, adapter: Arc<dyn ProviderAdapter>) -> Self {
        self.adapters.get_or_insert_with(Vec::new).push(adapter);
        self
    }

    /// Registers several adapters. Replaces the built-in set.
    pub fn adapters(mut self, adapters: impl IntoIterator<Item = Arc<dyn ProviderAdapter>>) -> Self {
        self.adapters
            .get_or_insert_with(Vec::new)
            .extend(adapters);
        self
    }

    /// Overrides the retry policy derived from `[retry]`.
    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = Some(retry);
        self
    }

    /// Uses an already opened cache instead of opening `cache.path`.
    pub fn cache(mut self, cache: CacheStore) -> Self {
        self.cache = Some(cache);
        self
    }

    pub async fn build(self) -> Result<Orchestrator, ChainscopeError> {
        let adapters = match self.adapters {
            Some(adapters) => adapters,
            None => chainscope_providers::default_adapters(&self.config.providers)?,
        };
        let registry = ProviderRegistry::new(adapters, &self.config.providers)?;

        let mut router = FallbackRouter::new(registry, &self.config);
        if let Some(retry) = self.retry {
            router = router.with_retry_policy(retry);
        }

        let cache = match self.cache {
            Some(cache) => cache,
            None => CacheStore::from_config(&self.config.cache).await?,
        };

        recording::register_metrics();
        info!(
            providers = router.registry().len(),
            cache = %self.config.cache.path,
            "orchestrator ready"
        );

        Ok(Orchestrator {
            config: self.config,
            cache,
            router,
        })
    }
}

/// Entry point for every data request.
pub struct Orchestrator {
    config: ChainscopeConfig,
    cache: CacheStore,
    router: FallbackRouter,
}

impl Orchestrator {
    pub fn builder(config: ChainscopeConfig) -> OrchestratorBuilder {
        OrchestratorBuilder::new(config)
    }

    /// Answers `request` within the deadline its priority allows.
    pub async fn execute(&self, request: &QueryRequest) -> Result<QueryResult, ChainscopeError> {
        let budget = self.config.routing.deadline_for(request.priority());
        self.execute_with_deadline(request, Instant::now() + budget)
            .await
    }

    /// Answers `request` from the cache, or from the first provider in its
    /// chain that succeeds before `deadline`.
    pub async fn execute_with_deadline(
        &self,
        request: &QueryRequest,
        deadline: Instant,
    ) -> Result<QueryResult, ChainscopeError> {
        let query_type = request.query_type();
        if !self.router.is_supported(query_type) {
            return Err(ChainscopeError::UnsupportedQuery { query_type });
        }

        let started = Instant::now();
        let key = request.cache_key();
        let label = query_type.to_string();

        if let Some(entry) = self.lookup(&key).await {
            recording::record_cache_hit(&label);
            debug!(
                query_type = %query_type,
                tier = %entry.tier,
                provider = %entry.source,
                "served from cache"
            );
            return Ok(self.from_entry(entry, started));
        }
        recording::record_cache_miss(&label);

        let routed = self.router.route(request, deadline).await?;
        let tier = self.config.cache.tier_for(query_type);
        let fetched_at = match self
            .cache
            .put(&key, routed.raw.data.clone(), tier, &routed.provider_id)
            .await
        {
            Ok(entry) => entry.fetched_at,
            Err(e) => {
                warn!(
                    query_type = %query_type,
                    tier = %tier,
                    error = %e,
                    "cache write failed, result not cached"
                );
                Utc::now()
            }
        };

        Ok(QueryResult {
            data: routed.raw.data,
            source: routed.provider_id,
            latency_ms: elapsed_ms(started),
            confidence_score: routed.confidence,
            from_cache: false,
            fetched_at,
        })
    }

    /// Provider order `request` would be walked in right now.
    pub async fn plan(&self, request: &QueryRequest) -> Result<RoutePlan, ChainscopeError> {
        self.router.plan(request).await
    }

    /// Drops every cached tier for `request`. Returns whether anything was removed.
    pub async fn invalidate(&self, request: &QueryRequest) -> Result<bool, ChainscopeError> {
        self.cache.invalidate(&request.cache_key()).await
    }

    pub async fn clear_cache(&self) -> Result<(), ChainscopeError> {
        self.cache.clear().await
    }

    /// Health of every registered provider, sorted by id.
    pub async fn provider_stats(&self) -> Vec<ProviderStats> {
        let mut stats = Vec::with_capacity(self.router.registry().len());
        for record in self.router.registry().records() {
            let health = self.router.stats().health(&record.provider_id);
            stats.push(health.snapshot().await);
        }
        stats.sort_by(|a, b| a.provider_id.cmp(&b.provider_id));
        stats
    }

    /// Resets one provider's counters and breaker, or all of them with `None`.
    ///
    /// Returns `false` when the named provider has no stats yet.
    pub async fn reset_stats(&self, provider_id: Option<&str>) -> bool {
        match provider_id {
            Some(id) => self.router.stats().reset(id).await,
            None => {
                self.router.stats().reset_all().await;
                true
            }
        }
    }

    /// Registered provider records, sorted by id.
    pub fn providers(&self) -> Vec<&ProviderRecord> {
        let mut records: Vec<_> = self.router.registry().records().collect();
        records.sort_by(|a, b| a.provider_id.cmp(&b.provider_id));
        records
    }

    pub fn config(&self) -> &ChainscopeConfig {
        &self.config
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// Checkpoints and closes the cache database.
    pub async fn close(&self) -> Result<(), ChainscopeError> {
        self.cache.close().await
    }

    async fn lookup(&self, key: &CacheKey) -> Option<CacheEntry> {
        match self.cache.get(key).await {
            Ok(entry) => entry,
            Err(e) => {
                warn!(key = %key, error = %e, "cache read failed, treating as miss");
                None
            }
        }
    }

    fn from_entry(&self, entry: CacheEntry, started: Instant) -> QueryResult {
        // Entries from providers no longer registered carry no confidence claim.
        let confidence = self
            .router
            .registry()
            .record(&entry.source)
            .map_or(0.0, |record| record.confidence);
        QueryResult {
            data: entry.value,
            source: CACHE_SOURCE.to_string(),
            latency_ms: elapsed_ms(started),
            confidence_score: confidence,
            from_cache: true,
            fetched_at: entry.fetched_at,
        }
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
