// SPDX-FileCopyrightText: 2026 Chainscope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Registered provider adapters and their static records.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use chainscope_config::model::ProvidersConfig;
use chainscope_core::{ChainscopeError, CostClass, ProviderAdapter, ProviderRecord, QueryType};

/// Latency estimate for adapters without configuration hints.
const DEFAULT_LATENCY_ESTIMATE: Duration = Duration::from_secs(1);

struct Registered {
    record: ProviderRecord,
    adapter: Arc<dyn ProviderAdapter>,
}

/// Adapters keyed by provider id, with records built once at construction.
pub struct ProviderRegistry {
    providers: Vec<Registered>,
    index: HashMap<String, usize>,
}

impl ProviderRegistry {
    /// Builds records from each adapter plus its configuration hints.
    ///
    /// Adapters without a configuration section (custom or mock adapters)
    /// get the light cost class and a one-second latency estimate.
    pub fn new(
        adapters: Vec<Arc<dyn ProviderAdapter>>,
        hints: &ProvidersConfig,
    ) -> Result<Self, ChainscopeError> {
        let mut providers = Vec::with_capacity(adapters.len());
        let mut index = HashMap::with_capacity(adapters.len());

        for adapter in adapters {
            let id = adapter.id().to_string();
            if index.contains_key(&id) {
                return Err(ChainscopeError::Config(format!(
                    "provider '{id}' registered twice"
                )));
            }
            let (latency, cost_class) = match hints.hints(&id) {
                Some(h) => (h.latency_hint(), h.cost_class()),
                None => (DEFAULT_LATENCY_ESTIMATE, CostClass::Light),
            };
            let record = ProviderRecord {
                provider_id: id.clone(),
                capabilities: adapter.capabilities().iter().copied().collect::<BTreeSet<_>>(),
                base_latency_estimate: latency,
                cost_class,
                confidence: adapter.confidence().clamp(0.0, 1.0),
            };
            index.insert(id, providers.len());
            providers.push(Registered { record, adapter });
        }

        Ok(Self { providers, index })
    }

    pub fn record(&self, provider_id: &str) -> Option<&ProviderRecord> {
        self.index.get(provider_id).map(|&i| &self.providers[i].record)
    }

    pub fn adapter(&self, provider_id: &str) -> Option<&Arc<dyn ProviderAdapter>> {
        self.index.get(provider_id).map(|&i| &self.providers[i].adapter)
    }

    /// Records in registration order.
    pub fn records(&self) -> impl Iterator<Item = &ProviderRecord> {
        self.providers.iter().map(|p| &p.record)
    }

    /// Whether `provider_id` is registered and declares `query_type`.
    pub fn serves(&self, provider_id: &str, query_type: QueryType) -> bool {
        self.record(provider_id).is_some_and(|r| r.supports(query_type))
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.providers.iter().map(|p| &p.record.provider_id))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainscope_test_utils::ScriptedProvider;

    #[test]
    fn records_use_config_hints() {
        let dune: Arc<dyn ProviderAdapter> =
            Arc::new(ScriptedProvider::new("dune", &[QueryType::CustomQuery]).with_confidence(0.9));
        let custom: Arc<dyn ProviderAdapter> =
            Arc::new(ScriptedProvider::new("custom", &[QueryType::TokenPrice]));
        let registry =
            ProviderRegistry::new(vec![dune, custom], &ProvidersConfig::default()).unwrap();

        let dune = registry.record("dune").unwrap();
        assert_eq!(dune.cost_class, CostClass::Heavy);
        assert_eq!(dune.base_latency_estimate, Duration::from_secs(20));
        assert_eq!(dune.confidence, 0.9);

        let custom = registry.record("custom").unwrap();
        assert_eq!(custom.cost_class, CostClass::Light);
        assert_eq!(custom.base_latency_estimate, DEFAULT_LATENCY_ESTIMATE);

        assert!(registry.serves("custom", QueryType::TokenPrice));
        assert!(!registry.serves("custom", QueryType::CustomQuery));
        assert!(!registry.serves("missing", QueryType::TokenPrice));
        assert_eq!(
            registry.records().map(|r| r.provider_id.as_str()).collect::<Vec<_>>(),
            ["dune", "custom"]
        );
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let a: Arc<dyn ProviderAdapter> = Arc::new(ScriptedProvider::new("a", &[]));
        let b: Arc<dyn ProviderAdapter> = Arc::new(ScriptedProvider::new("a", &[]));
        let err = ProviderRegistry::new(vec![a, b], &ProvidersConfig::default()).unwrap_err();
        assert!(matches!(err, ChainscopeError::Config(msg) if msg.contains("twice")));
    }
}
