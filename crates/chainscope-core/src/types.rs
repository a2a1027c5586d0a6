// SPDX-FileCopyrightText: 2026 Chainscope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the cache, router, providers, and orchestrator.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::key::CacheKey;

/// Abstract data request kinds understood by the orchestration layer.
///
/// Wire names are snake_case (`token_price`, `custom_query`, ...) both for
/// serde and for `Display`/`FromStr`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum QueryType {
    /// Total value locked for a single DeFi protocol.
    ProtocolTvl,
    /// Chain-level TVL history.
    ChainMetrics,
    /// Stablecoin market cap charts.
    StablecoinData,
    /// Spot price for one or more tokens.
    TokenPrice,
    /// Full token market data (supply, volume, community).
    TokenMetrics,
    /// ERC-20 balance for a wallet.
    TokenBalance,
    /// Transaction history for a wallet.
    WalletActivity,
    /// Aggregated crypto news with community sentiment votes.
    NewsSentiment,
    /// Options book summary for a currency.
    OptionsData,
    /// Hot posts of a subreddit, for community mood.
    SocialSentiment,
    /// Repository metadata and weekly commit counts.
    GithubActivity,
    /// Arbitrary analytical query (saved query id or raw SQL).
    CustomQuery,
}

impl QueryType {
    /// Every query type, in declaration order.
    pub const ALL: [QueryType; 12] = [
        QueryType::ProtocolTvl,
        QueryType::ChainMetrics,
        QueryType::StablecoinData,
        QueryType::TokenPrice,
        QueryType::TokenMetrics,
        QueryType::TokenBalance,
        QueryType::WalletActivity,
        QueryType::NewsSentiment,
        QueryType::OptionsData,
        QueryType::SocialSentiment,
        QueryType::GithubActivity,
        QueryType::CustomQuery,
    ];

    /// Cache tier matching the volatility of this kind of data.
    pub fn default_tier(self) -> CacheTier {
        match self {
            QueryType::TokenPrice | QueryType::TokenMetrics | QueryType::TokenBalance => {
                CacheTier::Hot
            }
            QueryType::ProtocolTvl
            | QueryType::ChainMetrics
            | QueryType::StablecoinData
            | QueryType::WalletActivity
            | QueryType::NewsSentiment
            | QueryType::OptionsData
            | QueryType::SocialSentiment
            | QueryType::GithubActivity => CacheTier::Warm,
            QueryType::CustomQuery => CacheTier::Cold,
        }
    }
}

/// Cache bucket with a fixed TTL class. Ordered hottest first.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CacheTier {
    Hot,
    Warm,
    Cold,
}

impl CacheTier {
    /// Lookup order used by the cache store.
    pub const LOOKUP_ORDER: [CacheTier; 3] = [CacheTier::Hot, CacheTier::Warm, CacheTier::Cold];
}

/// Request priority. Only the timeout budget depends on it.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
}

/// Circuit breaker state for a provider.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    #[default]
    Closed,
    Open,
    HalfOpen,
}

/// Cost/latency class of a provider, used for complexity-band ordering.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CostClass {
    /// Low latency, free or effectively unlimited quota.
    #[default]
    Light,
    /// Keyed free tiers with tighter quotas.
    Moderate,
    /// Query-execution engines that accept multi-second latency.
    Heavy,
}

/// A provider-agnostic request parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<ParamValue>),
}

impl ParamValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ParamValue::Int(i) => Some(*i),
            ParamValue::Str(s) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ParamValue]> {
        match self {
            ParamValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Flattens a scalar or a list into display strings.
    ///
    /// A single string is treated as a one-element list, so `ids = "bitcoin"`
    /// and `ids = ["bitcoin"]` both yield `["bitcoin"]`.
    pub fn to_string_list(&self) -> Vec<String> {
        match self {
            ParamValue::List(items) => items.iter().map(|v| v.to_string()).collect(),
            other => vec![other.to_string()],
        }
    }

    /// Number of elements (1 for scalars).
    pub fn len(&self) -> usize {
        match self {
            ParamValue::List(items) => items.len(),
            _ => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ParamValue::List(items) if items.is_empty())
    }

    pub(crate) fn write_canonical(&self, out: &mut String) {
        match self {
            ParamValue::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
            ParamValue::Int(i) => out.push_str(&i.to_string()),
            ParamValue::Float(f) => out.push_str(&format!("{f:?}")),
            ParamValue::Str(s) => out.push_str(&format!("{s:?}")),
            ParamValue::List(items) => {
                out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    item.write_canonical(out);
                }
                out.push(']');
            }
        }
    }
}

/// Renders values the way HTTP query strings expect them (lists comma-joined).
impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(b) => write!(f, "{b}"),
            ParamValue::Int(i) => write!(f, "{i}"),
            ParamValue::Float(x) => write!(f, "{x}"),
            ParamValue::Str(s) => f.write_str(s),
            ParamValue::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
        }
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        ParamValue::Int(v.into())
    }
}

impl From<u32> for ParamValue {
    fn from(v: u32) -> Self {
        ParamValue::Int(v.into())
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Str(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Str(v)
    }
}

impl<T: Into<ParamValue>> From<Vec<T>> for ParamValue {
    fn from(v: Vec<T>) -> Self {
        ParamValue::List(v.into_iter().map(Into::into).collect())
    }
}

/// An immutable, provider-agnostic data request.
///
/// Built with [`QueryRequest::new`] and the consuming `with_*` methods;
/// there are no mutating accessors once construction finishes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    query_type: QueryType,
    #[serde(default)]
    parameters: BTreeMap<String, ParamValue>,
    #[serde(default)]
    priority: Priority,
}

impl QueryRequest {
    pub fn new(query_type: QueryType) -> Self {
        Self {
            query_type,
            parameters: BTreeMap::new(),
            priority: Priority::Normal,
        }
    }

    /// Adds (or replaces) a parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn query_type(&self) -> QueryType {
        self.query_type
    }

    /// Parameters in sorted key order.
    pub fn parameters(&self) -> &BTreeMap<String, ParamValue> {
        &self.parameters
    }

    pub fn param(&self, key: &str) -> Option<&ParamValue> {
        self.parameters.get(key)
    }

    /// String parameter lookup; non-string values are ignored.
    pub fn str_param(&self, key: &str) -> Option<&str> {
        self.param(key).and_then(ParamValue::as_str)
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// Target chains from the `chains` list or a single `chain` value.
    pub fn chains(&self) -> Vec<String> {
        if let Some(chains) = self.param("chains") {
            return chains.to_string_list();
        }
        self.param("chain")
            .map(ParamValue::to_string_list)
            .unwrap_or_default()
    }

    /// Canonical cache key for this request.
    pub fn cache_key(&self) -> CacheKey {
        CacheKey::for_request(self)
    }
}

/// Payload returned by a provider adapter, shape preserved verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawResult {
    pub data: serde_json::Value,
}

impl RawResult {
    pub fn new(data: serde_json::Value) -> Self {
        Self { data }
    }
}

/// Uniform result envelope returned to every caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    /// Opaque provider payload.
    pub data: serde_json::Value,
    /// Provider id, or `"cache"` for cache hits.
    pub source: String,
    pub latency_ms: u64,
    /// Provider-declared reliability weight in [0.0, 1.0].
    pub confidence_score: f64,
    pub from_cache: bool,
    /// When the provider originally produced the data.
    pub fetched_at: DateTime<Utc>,
}

/// Static description of a registered provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderRecord {
    pub provider_id: String,
    pub capabilities: BTreeSet<QueryType>,
    pub base_latency_estimate: Duration,
    pub cost_class: CostClass,
    pub confidence: f64,
}

impl ProviderRecord {
    pub fn supports(&self, query_type: QueryType) -> bool {
        self.capabilities.contains(&query_type)
    }
}

/// Snapshot of a provider's runtime health.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderStats {
    pub provider_id: String,
    pub total_queries: u64,
    pub successes: u64,
    pub failures: u64,
    pub consecutive_failures: u32,
    pub rolling_avg_latency_ms: f64,
    pub circuit_state: CircuitState,
    pub circuit_opened_at: Option<DateTime<Utc>>,
}

impl ProviderStats {
    /// Fraction of successful attempts, 0.0 when nothing was recorded yet.
    pub fn success_rate(&self) -> f64 {
        if self.total_queries == 0 {
            0.0
        } else {
            self.successes as f64 / self.total_queries as f64
        }
    }
}
