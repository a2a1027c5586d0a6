// SPDX-FileCopyrightText: 2026 Chainscope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider adapter trait for external market data APIs (DefiLlama, CoinGecko, Dune, ...).

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::types::{QueryRequest, QueryType, RawResult};

/// Adapter for one external data provider.
///
/// Adapters translate a [`QueryRequest`] into a single provider call and
/// classify failures into [`ProviderError`]. They never retry and never
/// consult the cache; both are handled by the router.
#[async_trait]
pub trait ProviderAdapter: Send + Sync + 'static {
    /// Stable provider identifier used in chains, stats, and results.
    fn id(&self) -> &str;

    /// Query types this adapter can serve. Empty when unusable (e.g. missing API key).
    fn capabilities(&self) -> &[QueryType];

    fn supports(&self, query_type: QueryType) -> bool {
        self.capabilities().contains(&query_type)
    }

    /// Provider-declared reliability weight in [0.0, 1.0].
    fn confidence(&self) -> f64 {
        1.0
    }

    /// Performs one call against the provider.
    async fn fetch(&self, query: &QueryRequest) -> Result<RawResult, ProviderError>;
}
