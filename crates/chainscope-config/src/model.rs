// SPDX-FileCopyrightText: 2026 Chainscope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for Chainscope.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a misspelled key is
//! reported at startup instead of silently falling back to a default.

use std::collections::BTreeMap;
use std::time::Duration;

use chainscope_core::{CacheTier, CostClass, Priority, QueryType};
use serde::{Deserialize, Serialize};

/// Identifiers of the built-in provider adapters.
pub const KNOWN_PROVIDERS: [&str; 8] = [
    "defillama",
    "coingecko",
    "dune",
    "etherscan",
    "cryptopanic",
    "deribit",
    "reddit",
    "github",
];

/// Top-level Chainscope configuration.
///
/// Every section is optional and falls back to the compiled defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ChainscopeConfig {
    /// Logging settings.
    #[serde(default)]
    pub telemetry: TelemetryConfig,

    /// Tiered cache settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Per-provider circuit breaker settings.
    #[serde(default)]
    pub circuit_breaker: CircuitBreakerConfig,

    /// Retry/backoff settings.
    #[serde(default)]
    pub retry: RetryConfig,

    /// Fallback chains, re-ranking, and deadlines.
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Complexity classifier thresholds and weights.
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Per-provider endpoints, keys, and routing hints.
    #[serde(default)]
    pub providers: ProvidersConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelemetryConfig {
    /// Default level for the `chainscope` targets (trace, debug, info, warn, error).
    /// `RUST_LOG` takes precedence when set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Cache store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// Path to the SQLite cache file.
    #[serde(default = "default_cache_path")]
    pub path: String,

    #[serde(default = "default_hot_ttl_secs")]
    pub hot_ttl_secs: u64,

    #[serde(default = "default_warm_ttl_secs")]
    pub warm_ttl_secs: u64,

    #[serde(default = "default_cold_ttl_secs")]
    pub cold_ttl_secs: u64,

    /// Write-through tier per query type, overriding the volatility default.
    /// Keys are query type names (e.g. `token_price = "warm"`).
    #[serde(default)]
    pub tier_overrides: BTreeMap<String, CacheTier>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: default_cache_path(),
            hot_ttl_secs: default_hot_ttl_secs(),
            warm_ttl_secs: default_warm_ttl_secs(),
            cold_ttl_secs: default_cold_ttl_secs(),
            tier_overrides: BTreeMap::new(),
        }
    }
}

impl CacheConfig {
    /// Write-through tier for a query type.
    pub fn tier_for(&self, query_type: QueryType) -> CacheTier {
        self.tier_overrides
            .get(&query_type.to_string())
            .copied()
            .unwrap_or_else(|| query_type.default_tier())
    }
}

fn default_cache_path() -> String {
    dirs::cache_dir()
        .map(|p| p.join("chainscope").join("cache.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("chainscope-cache.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_hot_ttl_secs() -> u64 {
    60
}

fn default_warm_ttl_secs() -> u64 {
    300
}

fn default_cold_ttl_secs() -> u64 {
    86_400
}

/// Circuit breaker configuration, applied to every provider.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures that open the breaker.
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,

    /// Cool-down after the first opening; doubles on each consecutive reopening.
    #[serde(default = "default_base_cooldown_secs")]
    pub base_cooldown_secs: u64,

    #[serde(default = "default_max_cooldown_secs")]
    pub max_cooldown_secs: u64,

    /// When true, rate-limit failures do not count toward opening the breaker.
    #[serde(default)]
    pub ignore_rate_limits: bool,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: default_failure_threshold(),
            base_cooldown_secs: default_base_cooldown_secs(),
            max_cooldown_secs: default_max_cooldown_secs(),
            ignore_rate_limits: false,
        }
    }
}

fn default_failure_threshold() -> u32 {
    5
}

fn default_base_cooldown_secs() -> u64 {
    30
}

fn default_max_cooldown_secs() -> u64 {
    600
}

/// Retry policy configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RetryConfig {
    /// Attempts per provider invocation, including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Wait before the second attempt; doubles afterwards.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Relative jitter applied to every wait, in [0, 1).
    #[serde(default = "default_jitter")]
    pub jitter: f64,

    /// Also retry `Unavailable` failures against the same provider.
    #[serde(default)]
    pub retry_unavailable: bool,

    /// Upper bound for waits raised by a `Retry-After` hint.
    #[serde(default = "default_max_rate_limit_wait_secs")]
    pub max_rate_limit_wait_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            jitter: default_jitter(),
            retry_unavailable: false,
            max_rate_limit_wait_secs: default_max_rate_limit_wait_secs(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    2_000
}

fn default_jitter() -> f64 {
    0.2
}

fn default_max_rate_limit_wait_secs() -> u64 {
    60
}

/// Routing configuration: fallback chains, re-ranking, and deadlines.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RoutingConfig {
    /// Ordered provider ids per query type name.
    #[serde(default = "default_chains")]
    pub chains: BTreeMap<String, Vec<String>>,

    /// Provider moved to the front of the chain for heavy-band requests.
    #[serde(default = "default_heavyweight_provider")]
    pub heavyweight_provider: Option<String>,

    /// Queries both providers need before stats can reorder them.
    #[serde(default = "default_min_samples")]
    pub min_samples: u64,

    /// Success-rate advantage required to move a provider up.
    #[serde(default = "default_rerank_margin")]
    pub rerank_margin: f64,

    #[serde(default = "default_deadline_low_secs")]
    pub deadline_low_secs: u64,

    #[serde(default = "default_deadline_normal_secs")]
    pub deadline_normal_secs: u64,

    #[serde(default = "default_deadline_high_secs")]
    pub deadline_high_secs: u64,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            chains: default_chains(),
            heavyweight_provider: default_heavyweight_provider(),
            min_samples: default_min_samples(),
            rerank_margin: default_rerank_margin(),
            deadline_low_secs: default_deadline_low_secs(),
            deadline_normal_secs: default_deadline_normal_secs(),
            deadline_high_secs: default_deadline_high_secs(),
        }
    }
}

impl RoutingConfig {
    /// Time budget for a request of the given priority.
    pub fn deadline_for(&self, priority: Priority) -> Duration {
        let secs = match priority {
            Priority::Low => self.deadline_low_secs,
            Priority::Normal => self.deadline_normal_secs,
            Priority::High => self.deadline_high_secs,
        };
        Duration::from_secs(secs)
    }

    /// Configured chain for a query type, empty when none is configured.
    pub fn chain_for(&self, query_type: QueryType) -> &[String] {
        self.chains
            .get(&query_type.to_string())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

fn default_chains() -> BTreeMap<String, Vec<String>> {
    let chain = |ids: &[&str]| ids.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    BTreeMap::from([
        ("token_price".to_string(), chain(&["coingecko", "defillama"])),
        ("protocol_tvl".to_string(), chain(&["defillama"])),
        ("chain_metrics".to_string(), chain(&["defillama"])),
        ("stablecoin_data".to_string(), chain(&["defillama"])),
        ("token_metrics".to_string(), chain(&["coingecko"])),
        ("wallet_activity".to_string(), chain(&["etherscan"])),
        ("token_balance".to_string(), chain(&["etherscan"])),
        ("news_sentiment".to_string(), chain(&["cryptopanic"])),
        ("options_data".to_string(), chain(&["deribit"])),
        ("social_sentiment".to_string(), chain(&["reddit"])),
        ("github_activity".to_string(), chain(&["github"])),
        ("custom_query".to_string(), chain(&["dune"])),
    ])
}

fn default_heavyweight_provider() -> Option<String> {
    Some("dune".to_string())
}

fn default_min_samples() -> u64 {
    20
}

fn default_rerank_margin() -> f64 {
    0.20
}

fn default_deadline_low_secs() -> u64 {
    20
}

fn default_deadline_normal_secs() -> u64 {
    45
}

fn default_deadline_high_secs() -> u64 {
    90
}

/// Complexity classifier configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ClassifierConfig {
    /// Scores below this are light.
    #[serde(default = "default_light_max")]
    pub light_max: f64,

    /// Scores above this are heavy.
    #[serde(default = "default_heavy_min")]
    pub heavy_min: f64,

    /// Id lists longer than this add the large-list bonus.
    #[serde(default = "default_large_list_threshold")]
    pub large_list_threshold: usize,

    /// Base weight overrides per query type name.
    #[serde(default)]
    pub base_weights: BTreeMap<String, f64>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            light_max: default_light_max(),
            heavy_min: default_heavy_min(),
            large_list_threshold: default_large_list_threshold(),
            base_weights: BTreeMap::new(),
        }
    }
}

fn default_light_max() -> f64 {
    0.5
}

fn default_heavy_min() -> f64 {
    0.8
}

fn default_large_list_threshold() -> usize {
    10
}

/// Routing hints shared by every provider section.
pub trait ProviderHints {
    fn enabled(&self) -> bool;
    fn base_url(&self) -> &str;
    fn timeout(&self) -> Duration;
    fn confidence(&self) -> f64;
    fn cost_class(&self) -> CostClass;
    fn latency_hint(&self) -> Duration;
}

macro_rules! impl_provider_hints {
    ($ty:ty) => {
        impl ProviderHints for $ty {
            fn enabled(&self) -> bool {
                self.enabled
            }

            fn base_url(&self) -> &str {
                &self.base_url
            }

            fn timeout(&self) -> Duration {
                Duration::from_secs(self.timeout_secs)
            }

            fn confidence(&self) -> f64 {
                self.confidence
            }

            fn cost_class(&self) -> CostClass {
                self.cost_class
            }

            fn latency_hint(&self) -> Duration {
                Duration::from_millis(self.latency_hint_ms)
            }
        }
    };
}

/// All provider sections.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub defillama: DefiLlamaConfig,

    #[serde(default)]
    pub coingecko: CoinGeckoConfig,

    #[serde(default)]
    pub dune: DuneConfig,

    #[serde(default)]
    pub etherscan: EtherscanConfig,

    #[serde(default)]
    pub cryptopanic: CryptoPanicConfig,

    #[serde(default)]
    pub deribit: DeribitConfig,

    #[serde(default)]
    pub reddit: RedditConfig,

    #[serde(default)]
    pub github: GitHubConfig,
}

impl ProvidersConfig {
    /// Hints for a built-in provider by id.
    pub fn hints(&self, provider_id: &str) -> Option<&dyn ProviderHints> {
        match provider_id {
            "defillama" => Some(&self.defillama),
            "coingecko" => Some(&self.coingecko),
            "dune" => Some(&self.dune),
            "etherscan" => Some(&self.etherscan),
            "cryptopanic" => Some(&self.cryptopanic),
            "deribit" => Some(&self.deribit),
            "reddit" => Some(&self.reddit),
            "github" => Some(&self.github),
            _ => None,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    15
}

/// DefiLlama (TVL, chains, stablecoins, prices). No key needed.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DefiLlamaConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_defillama_url")]
    pub base_url: String,

    #[serde(default = "default_defillama_coins_url")]
    pub coins_url: String,

    #[serde(default = "default_defillama_stablecoins_url")]
    pub stablecoins_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_defillama_confidence")]
    pub confidence: f64,

    #[serde(default)]
    pub cost_class: CostClass,

    #[serde(default = "default_defillama_latency_ms")]
    pub latency_hint_ms: u64,
}

impl Default for DefiLlamaConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_defillama_url(),
            coins_url: default_defillama_coins_url(),
            stablecoins_url: default_defillama_stablecoins_url(),
            timeout_secs: default_timeout_secs(),
            confidence: default_defillama_confidence(),
            cost_class: CostClass::Light,
            latency_hint_ms: default_defillama_latency_ms(),
        }
    }
}

impl_provider_hints!(DefiLlamaConfig);

fn default_defillama_url() -> String {
    "https://api.llama.fi".to_string()
}

fn default_defillama_coins_url() -> String {
    "https://coins.llama.fi".to_string()
}

fn default_defillama_stablecoins_url() -> String {
    "https://stablecoins.llama.fi".to_string()
}

fn default_defillama_confidence() -> f64 {
    0.95
}

fn default_defillama_latency_ms() -> u64 {
    400
}

/// CoinGecko (prices, token market data). Works without a key on the public tier.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CoinGeckoConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Demo API key, sent as `x-cg-demo-api-key` when set.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_coingecko_url")]
    pub base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_coingecko_confidence")]
    pub confidence: f64,

    #[serde(default)]
    pub cost_class: CostClass,

    #[serde(default = "default_coingecko_latency_ms")]
    pub latency_hint_ms: u64,
}

impl Default for CoinGeckoConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: None,
            base_url: default_coingecko_url(),
            timeout_secs: default_timeout_secs(),
            confidence: default_coingecko_confidence(),
            cost_class: CostClass::Light,
            latency_hint_ms: default_coingecko_latency_ms(),
        }
    }
}

impl_provider_hints!(CoinGeckoConfig);

fn default_coingecko_url() -> String {
    "https://api.coingecko.com/api/v3".to_string()
}

fn default_coingecko_confidence() -> f64 {
    0.95
}

fn default_coingecko_latency_ms() -> u64 {
    300
}

/// Dune Analytics (saved queries and raw SQL). Requires an API key.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DuneConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// `None` leaves the adapter registered with no capabilities.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_dune_url")]
    pub base_url: String,

    /// Per-HTTP-call timeout; the whole execution is bounded by the request deadline.
    #[serde(default = "default_dune_timeout_secs")]
    pub timeout_secs: u64,

    /// Wait between execution status polls.
    #[serde(default = "default_dune_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Status polls before the execution is reported as timed out.
    #[serde(default = "default_dune_max_polls")]
    pub max_polls: u32,

    /// Execution tier requested from Dune (`medium` or `large`).
    #[serde(default = "default_dune_performance")]
    pub performance: String,

    #[serde(default = "default_dune_confidence")]
    pub confidence: f64,

    #[serde(default = "default_heavy")]
    pub cost_class: CostClass,

    #[serde(default = "default_dune_latency_ms")]
    pub latency_hint_ms: u64,
}

impl Default for DuneConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: None,
            base_url: default_dune_url(),
            timeout_secs: default_dune_timeout_secs(),
            poll_interval_ms: default_dune_poll_interval_ms(),
            max_polls: default_dune_max_polls(),
            performance: default_dune_performance(),
            confidence: default_dune_confidence(),
            cost_class: CostClass::Heavy,
            latency_hint_ms: default_dune_latency_ms(),
        }
    }
}

impl_provider_hints!(DuneConfig);

fn default_dune_url() -> String {
    "https://api.dune.com/api/v1".to_string()
}

fn default_dune_timeout_secs() -> u64 {
    30
}

fn default_dune_poll_interval_ms() -> u64 {
    2_000
}

fn default_dune_max_polls() -> u32 {
    30
}

fn default_dune_performance() -> String {
    "medium".to_string()
}

fn default_dune_confidence() -> f64 {
    0.9
}

fn default_heavy() -> CostClass {
    CostClass::Heavy
}

fn default_dune_latency_ms() -> u64 {
    20_000
}

/// Etherscan v2 multichain explorer API. Requires an API key.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EtherscanConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// `None` leaves the adapter registered with no capabilities.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_etherscan_url")]
    pub base_url: String,

    /// Chain used when a request names none.
    #[serde(default = "default_etherscan_chain")]
    pub default_chain: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_etherscan_confidence")]
    pub confidence: f64,

    #[serde(default = "default_moderate")]
    pub cost_class: CostClass,

    #[serde(default = "default_etherscan_latency_ms")]
    pub latency_hint_ms: u64,
}

impl Default for EtherscanConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: None,
            base_url: default_etherscan_url(),
            default_chain: default_etherscan_chain(),
            timeout_secs: default_timeout_secs(),
            confidence: default_etherscan_confidence(),
            cost_class: CostClass::Moderate,
            latency_hint_ms: default_etherscan_latency_ms(),
        }
    }
}

impl_provider_hints!(EtherscanConfig);

fn default_etherscan_url() -> String {
    "https://api.etherscan.io/v2/api".to_string()
}

fn default_etherscan_chain() -> String {
    "ethereum".to_string()
}

fn default_etherscan_confidence() -> f64 {
    0.95
}

fn default_moderate() -> CostClass {
    CostClass::Moderate
}

fn default_etherscan_latency_ms() -> u64 {
    600
}

/// CryptoPanic news aggregator. The auth token is optional.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CryptoPanicConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_cryptopanic_url")]
    pub base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_cryptopanic_confidence")]
    pub confidence: f64,

    #[serde(default = "default_moderate")]
    pub cost_class: CostClass,

    #[serde(default = "default_cryptopanic_latency_ms")]
    pub latency_hint_ms: u64,
}

impl Default for CryptoPanicConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: None,
            base_url: default_cryptopanic_url(),
            timeout_secs: default_timeout_secs(),
            confidence: default_cryptopanic_confidence(),
            cost_class: CostClass::Moderate,
            latency_hint_ms: default_cryptopanic_latency_ms(),
        }
    }
}

impl_provider_hints!(CryptoPanicConfig);

fn default_cryptopanic_url() -> String {
    "https://cryptopanic.com/api/v1".to_string()
}

fn default_cryptopanic_confidence() -> f64 {
    0.7
}

fn default_cryptopanic_latency_ms() -> u64 {
    800
}

/// Deribit public options API. No key needed.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DeribitConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_deribit_url")]
    pub base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_deribit_confidence")]
    pub confidence: f64,

    #[serde(default)]
    pub cost_class: CostClass,

    #[serde(default = "default_deribit_latency_ms")]
    pub latency_hint_ms: u64,
}

impl Default for DeribitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_deribit_url(),
            timeout_secs: default_timeout_secs(),
            confidence: default_deribit_confidence(),
            cost_class: CostClass::Light,
            latency_hint_ms: default_deribit_latency_ms(),
        }
    }
}

impl_provider_hints!(DeribitConfig);

fn default_deribit_url() -> String {
    "https://www.deribit.com/api/v2/public".to_string()
}

fn default_deribit_confidence() -> f64 {
    0.9
}

fn default_deribit_latency_ms() -> u64 {
    300
}

/// Reddit public listings. No key needed.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RedditConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_reddit_url")]
    pub base_url: String,

    /// Subreddit read when a request names none.
    #[serde(default = "default_subreddit")]
    pub default_subreddit: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_reddit_confidence")]
    pub confidence: f64,

    #[serde(default)]
    pub cost_class: CostClass,

    #[serde(default = "default_reddit_latency_ms")]
    pub latency_hint_ms: u64,
}

impl Default for RedditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_reddit_url(),
            default_subreddit: default_subreddit(),
            timeout_secs: default_timeout_secs(),
            confidence: default_reddit_confidence(),
            cost_class: CostClass::Light,
            latency_hint_ms: default_reddit_latency_ms(),
        }
    }
}

impl_provider_hints!(RedditConfig);

fn default_reddit_url() -> String {
    "https://www.reddit.com".to_string()
}

fn default_subreddit() -> String {
    "cryptocurrency".to_string()
}

fn default_reddit_confidence() -> f64 {
    0.6
}

fn default_reddit_latency_ms() -> u64 {
    700
}

/// GitHub REST API. The token is optional and only raises the rate limit.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GitHubConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_github_url")]
    pub base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_github_confidence")]
    pub confidence: f64,

    #[serde(default)]
    pub cost_class: CostClass,

    #[serde(default = "default_github_latency_ms")]
    pub latency_hint_ms: u64,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: None,
            base_url: default_github_url(),
            timeout_secs: default_timeout_secs(),
            confidence: default_github_confidence(),
            cost_class: CostClass::Light,
            latency_hint_ms: default_github_latency_ms(),
        }
    }
}

impl_provider_hints!(GitHubConfig);

fn default_github_url() -> String {
    "https://api.github.com".to_string()
}

fn default_github_confidence() -> f64 {
    0.85
}

fn default_github_latency_ms() -> u64 {
    500
}
