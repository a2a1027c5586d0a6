// SPDX-FileCopyrightText: 2026 Chainscope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Heuristic request complexity classification.
//!
//! Scores a [`QueryRequest`] from its type and parameters alone. No provider
//! call, no I/O. The resulting band only reorders the fallback chain.

use std::collections::BTreeMap;
use std::str::FromStr;

use chainscope_config::model::ClassifierConfig;
use chainscope_core::{ParamValue, QueryRequest, QueryType};
use strum::Display;

/// Complexity bands used to bias provider order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ComplexityBand {
    /// Prefer low-latency, unlimited-quota providers.
    Light,
    /// Prefer moderate-cost providers.
    Moderate,
    /// The heavyweight provider goes first.
    Heavy,
}

/// Result of classifying a request.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Score in [0.0, 1.0].
    pub score: f64,
    pub band: ComplexityBand,
    /// Signals that contributed beyond the base weight.
    pub signals: Vec<&'static str>,
}

/// Parameters that make a provider execute an analytical query.
const QUERY_EXECUTION: &[&str] = &["sql", "query_id"];

/// Parameters that ask for a historical range.
const HISTORICAL_RANGE: &[&str] = &[
    "historical", "start", "end", "from", "to", "days", "range", "interval",
];

/// Parameters that ask for server-side aggregation.
const AGGREGATION: &[&str] = &["group_by", "join", "aggregate", "window"];

const QUERY_EXECUTION_WEIGHT: f64 = 0.9;
const HISTORICAL_WEIGHT: f64 = 0.3;
const AGGREGATION_WEIGHT: f64 = 0.3;
const EXTRA_CHAIN_WEIGHT: f64 = 0.1;
const LARGE_LIST_WEIGHT: f64 = 0.1;

/// Base weight of a query type before parameter signals.
pub fn default_base_weight(query_type: QueryType) -> f64 {
    match query_type {
        QueryType::CustomQuery => 0.85,
        QueryType::WalletActivity => 0.3,
        QueryType::ProtocolTvl | QueryType::ChainMetrics | QueryType::OptionsData => 0.2,
        QueryType::StablecoinData | QueryType::TokenMetrics => 0.15,
        QueryType::GithubActivity => 0.2,
        QueryType::TokenPrice
        | QueryType::TokenBalance
        | QueryType::NewsSentiment
        | QueryType::SocialSentiment => 0.1,
    }
}

/// Heuristic complexity classifier.
#[derive(Debug, Clone)]
pub struct ComplexityClassifier {
    light_max: f64,
    heavy_min: f64,
    large_list_threshold: usize,
    base_weights: BTreeMap<QueryType, f64>,
}

impl ComplexityClassifier {
    pub fn new(config: &ClassifierConfig) -> Self {
        let base_weights = config
            .base_weights
            .iter()
            .filter_map(|(name, weight)| Some((QueryType::from_str(name).ok()?, *weight)))
            .collect();
        Self {
            light_max: config.light_max,
            heavy_min: config.heavy_min,
            large_list_threshold: config.large_list_threshold,
            base_weights,
        }
    }

    pub fn base_weight(&self, query_type: QueryType) -> f64 {
        self.base_weights
            .get(&query_type)
            .copied()
            .unwrap_or_else(|| default_base_weight(query_type))
    }

    pub fn classify(&self, request: &QueryRequest) -> Classification {
        let mut score = self.base_weight(request.query_type());
        let mut signals = Vec::new();

        if QUERY_EXECUTION.iter().any(|k| is_set(request.param(k))) {
            score += QUERY_EXECUTION_WEIGHT;
            signals.push("query execution");
        }

        if HISTORICAL_RANGE.iter().any(|k| is_set(request.param(k))) {
            score += HISTORICAL_WEIGHT;
            signals.push("historical range");
        }

        if AGGREGATION.iter().any(|k| is_set(request.param(k))) {
            score += AGGREGATION_WEIGHT;
            signals.push("aggregation");
        }

        let extra_chains = request.chains().len().saturating_sub(1);
        if extra_chains > 0 {
            score += EXTRA_CHAIN_WEIGHT * extra_chains as f64;
            signals.push("multi-chain");
        }

        let large_list = request
            .parameters()
            .values()
            .any(|v| v.as_list().is_some_and(|items| items.len() > self.large_list_threshold));
        if large_list {
            score += LARGE_LIST_WEIGHT;
            signals.push("large id list");
        }

        let score = score.clamp(0.0, 1.0);
        Classification {
            score,
            band: self.band_for(score),
            signals,
        }
    }

    pub fn band_for(&self, score: f64) -> ComplexityBand {
        if score > self.heavy_min {
            ComplexityBand::Heavy
        } else if score < self.light_max {
            ComplexityBand::Light
        } else {
            ComplexityBand::Moderate
        }
    }
}

impl Default for ComplexityClassifier {
    fn default() -> Self {
        Self::new(&ClassifierConfig::default())
    }
}

/// Present and not explicitly false or empty.
fn is_set(value: Option<&ParamValue>) -> bool {
    match value {
        None | Some(ParamValue::Bool(false)) => false,
        Some(ParamValue::Str(s)) => !s.trim().is_empty(),
        Some(other) => !other.is_empty(),
    }
}
