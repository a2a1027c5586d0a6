// SPDX-FileCopyrightText: 2026 Chainscope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider adapters for external blockchain and market data APIs.
//!
//! Each adapter performs exactly one logical call per `fetch` and classifies
//! failures into [`ProviderError`](chainscope_core::ProviderError). Retries,
//! circuit breaking and caching live in the router.

pub mod client;
pub mod coingecko;
pub mod cryptopanic;
pub mod defillama;
pub mod deribit;
pub mod dune;
pub mod etherscan;
pub mod github;
pub mod reddit;

use std::sync::Arc;

use chainscope_config::model::{ProviderHints, ProvidersConfig};
use chainscope_core::{ChainscopeError, ProviderAdapter};
use tracing::debug;

pub use coingecko::CoinGeckoAdapter;
pub use cryptopanic::CryptoPanicAdapter;
pub use defillama::DefiLlamaAdapter;
pub use deribit::DeribitAdapter;
pub use dune::DuneAdapter;
pub use etherscan::EtherscanAdapter;
pub use github::GitHubAdapter;
pub use reddit::RedditAdapter;

/// Builds the built-in adapters enabled in `config`.
///
/// Adapters that need a key but have none are still returned; they report no
/// capabilities and the router never selects them.
pub fn default_adapters(
    config: &ProvidersConfig,
) -> Result<Vec<Arc<dyn ProviderAdapter>>, ChainscopeError> {
    let mut adapters: Vec<Arc<dyn ProviderAdapter>> = Vec::new();

    if config.defillama.enabled() {
        adapters.push(Arc::new(DefiLlamaAdapter::new(&config.defillama)?));
    }
    if config.coingecko.enabled() {
        adapters.push(Arc::new(CoinGeckoAdapter::new(&config.coingecko)?));
    }
    if config.dune.enabled() {
        adapters.push(Arc::new(DuneAdapter::new(&config.dune)?));
    }
    if config.etherscan.enabled() {
        adapters.push(Arc::new(EtherscanAdapter::new(&config.etherscan)?));
    }
    if config.cryptopanic.enabled() {
        adapters.push(Arc::new(CryptoPanicAdapter::new(&config.cryptopanic)?));
    }
    if config.deribit.enabled() {
        adapters.push(Arc::new(DeribitAdapter::new(&config.deribit)?));
    }
    if config.reddit.enabled() {
        adapters.push(Arc::new(RedditAdapter::new(&config.reddit)?));
    }
    if config.github.enabled() {
        adapters.push(Arc::new(GitHubAdapter::new(&config.github)?));
    }

    debug!(count = adapters.len(), "built provider adapters");
    Ok(adapters)
}
