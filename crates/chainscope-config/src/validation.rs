// SPDX-FileCopyrightText: 2026 Chainscope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks constraints serde cannot express: TTL ordering, probability
//! ranges, chain contents, and query type names used as map keys.

use std::collections::HashSet;
use std::str::FromStr;

use chainscope_core::QueryType;

use crate::diagnostic::ConfigError;
use crate::model::{ChainscopeConfig, KNOWN_PROVIDERS, ProviderHints};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validates a deserialized configuration.
///
/// Collects every failure instead of stopping at the first one.
pub fn validate_config(config: &ChainscopeConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.telemetry.log_level.as_str()) {
        errors.push(ConfigError::validation(format!(
            "telemetry.log_level `{}` must be one of {}",
            config.telemetry.log_level,
            LOG_LEVELS.join(", ")
        )));
    }

    validate_cache(config, &mut errors);
    validate_resilience(config, &mut errors);
    validate_routing(config, &mut errors);
    validate_classifier(config, &mut errors);
    validate_providers(config, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn parse_query_type(section: &str, name: &str, errors: &mut Vec<ConfigError>) -> bool {
    if QueryType::from_str(name).is_ok() {
        return true;
    }
    let valid: Vec<String> = QueryType::ALL.iter().map(|q| q.to_string()).collect();
    errors.push(ConfigError::validation(format!(
        "{section}: unknown query type `{name}` (expected one of {})",
        valid.join(", ")
    )));
    false
}

fn validate_cache(config: &ChainscopeConfig, errors: &mut Vec<ConfigError>) {
    let cache = &config.cache;

    if cache.path.trim().is_empty() {
        errors.push(ConfigError::validation("cache.path must not be empty"));
    }

    for (name, ttl) in [
        ("hot_ttl_secs", cache.hot_ttl_secs),
        ("warm_ttl_secs", cache.warm_ttl_secs),
        ("cold_ttl_secs", cache.cold_ttl_secs),
    ] {
        if ttl == 0 {
            errors.push(ConfigError::validation(format!(
                "cache.{name} must be positive"
            )));
        }
    }

    if cache.hot_ttl_secs > cache.warm_ttl_secs || cache.warm_ttl_secs > cache.cold_ttl_secs {
        errors.push(ConfigError::validation(format!(
            "cache TTLs must satisfy hot <= warm <= cold, got {}/{}/{}",
            cache.hot_ttl_secs, cache.warm_ttl_secs, cache.cold_ttl_secs
        )));
    }

    for name in cache.tier_overrides.keys() {
        parse_query_type("cache.tier_overrides", name, errors);
    }
}

fn validate_resilience(config: &ChainscopeConfig, errors: &mut Vec<ConfigError>) {
    let breaker = &config.circuit_breaker;
    if breaker.failure_threshold < 1 {
        errors.push(ConfigError::validation(
            "circuit_breaker.failure_threshold must be at least 1",
        ));
    }
    if breaker.base_cooldown_secs == 0 {
        errors.push(ConfigError::validation(
            "circuit_breaker.base_cooldown_secs must be positive",
        ));
    }
    if breaker.base_cooldown_secs > breaker.max_cooldown_secs {
        errors.push(ConfigError::validation(format!(
            "circuit_breaker.base_cooldown_secs ({}) exceeds max_cooldown_secs ({})",
            breaker.base_cooldown_secs, breaker.max_cooldown_secs
        )));
    }

    let retry = &config.retry;
    if retry.max_attempts < 1 {
        errors.push(ConfigError::validation(
            "retry.max_attempts must be at least 1",
        ));
    }
    if !(0.0..1.0).contains(&retry.jitter) {
        errors.push(ConfigError::validation(format!(
            "retry.jitter must be in [0, 1), got {}",
            retry.jitter
        )));
    }
}

fn validate_routing(config: &ChainscopeConfig, errors: &mut Vec<ConfigError>) {
    let routing = &config.routing;

    for (name, chain) in &routing.chains {
        if !parse_query_type("routing.chains", name, errors) {
            continue;
        }
        if chain.is_empty() {
            errors.push(ConfigError::validation(format!(
                "routing.chains.{name} must not be empty"
            )));
        }
        let mut seen = HashSet::new();
        for provider in chain {
            if !seen.insert(provider.as_str()) {
                errors.push(ConfigError::validation(format!(
                    "routing.chains.{name} lists `{provider}` more than once"
                )));
            }
            if !KNOWN_PROVIDERS.contains(&provider.as_str()) {
                errors.push(ConfigError::validation(format!(
                    "routing.chains.{name}: unknown provider `{provider}`"
                )));
            }
        }
    }

    if let Some(heavy) = &routing.heavyweight_provider {
        if !KNOWN_PROVIDERS.contains(&heavy.as_str()) {
            errors.push(ConfigError::validation(format!(
                "routing.heavyweight_provider: unknown provider `{heavy}`"
            )));
        }
    }

    if !(0.0..=1.0).contains(&routing.rerank_margin) {
        errors.push(ConfigError::validation(format!(
            "routing.rerank_margin must be in [0, 1], got {}",
            routing.rerank_margin
        )));
    }

    for (name, secs) in [
        ("deadline_low_secs", routing.deadline_low_secs),
        ("deadline_normal_secs", routing.deadline_normal_secs),
        ("deadline_high_secs", routing.deadline_high_secs),
    ] {
        if secs == 0 {
            errors.push(ConfigError::validation(format!(
                "routing.{name} must be positive"
            )));
        }
    }
}

fn validate_classifier(config: &ChainscopeConfig, errors: &mut Vec<ConfigError>) {
    let classifier = &config.classifier;

    if !(0.0 < classifier.light_max
        && classifier.light_max <= classifier.heavy_min
        && classifier.heavy_min < 1.0)
    {
        errors.push(ConfigError::validation(format!(
            "classifier thresholds must satisfy 0 < light_max <= heavy_min < 1, got {} and {}",
            classifier.light_max, classifier.heavy_min
        )));
    }

    for (name, weight) in &classifier.base_weights {
        if parse_query_type("classifier.base_weights", name, errors)
            && !(0.0..=1.0).contains(weight)
        {
            errors.push(ConfigError::validation(format!(
                "classifier.base_weights.{name} must be in [0, 1], got {weight}"
            )));
        }
    }
}

fn validate_providers(config: &ChainscopeConfig, errors: &mut Vec<ConfigError>) {
    for id in KNOWN_PROVIDERS {
        let Some(hints) = config.providers.hints(id) else {
            continue;
        };
        if !(0.0..=1.0).contains(&hints.confidence()) {
            errors.push(ConfigError::validation(format!(
                "providers.{id}.confidence must be in [0, 1], got {}",
                hints.confidence()
            )));
        }
        if hints.base_url().trim().is_empty() {
            errors.push(ConfigError::validation(format!(
                "providers.{id}.base_url must not be empty"
            )));
        }
        if hints.timeout().is_zero() {
            errors.push(ConfigError::validation(format!(
                "providers.{id}.timeout_secs must be positive"
            )));
        }
    }

    let dune = &config.providers.dune;
    if !matches!(dune.performance.as_str(), "medium" | "large") {
        errors.push(ConfigError::validation(format!(
            "providers.dune.performance must be `medium` or `large`, got `{}`",
            dune.performance
        )));
    }
    if dune.max_polls == 0 {
        errors.push(ConfigError::validation(
            "providers.dune.max_polls must be at least 1",
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_error(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&ChainscopeConfig::default()).is_ok());
    }

    #[test]
    fn ttl_ordering_is_enforced() {
        let mut config = ChainscopeConfig::default();
        config.cache.hot_ttl_secs = 600;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "hot <= warm <= cold"));
    }

    #[test]
    fn zero_ttl_is_rejected() {
        let mut config = ChainscopeConfig::default();
        config.cache.hot_ttl_secs = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "cache.hot_ttl_secs must be positive"));
    }

    #[test]
    fn duplicate_and_unknown_chain_entries_are_reported_together() {
        let mut config = ChainscopeConfig::default();
        config.routing.chains.insert(
            "token_price".to_string(),
            vec![
                "coingecko".to_string(),
                "coingecko".to_string(),
                "binance".to_string(),
            ],
        );
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "more than once"));
        assert!(has_error(&errors, "unknown provider `binance`"));
    }

    #[test]
    fn empty_chain_is_rejected() {
        let mut config = ChainscopeConfig::default();
        config
            .routing
            .chains
            .insert("options_data".to_string(), Vec::new());
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "routing.chains.options_data must not be empty"));
    }

    #[test]
    fn unknown_query_type_key_is_rejected() {
        let mut config = ChainscopeConfig::default();
        config
            .routing
            .chains
            .insert("token_prices".to_string(), vec!["coingecko".to_string()]);
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "unknown query type `token_prices`"));
    }

    #[test]
    fn jitter_and_margin_ranges() {
        let mut config = ChainscopeConfig::default();
        config.retry.jitter = 1.0;
        config.routing.rerank_margin = 1.5;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "retry.jitter"));
        assert!(has_error(&errors, "routing.rerank_margin"));
    }

    #[test]
    fn cooldown_must_not_exceed_max() {
        let mut config = ChainscopeConfig::default();
        config.circuit_breaker.base_cooldown_secs = 900;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "exceeds max_cooldown_secs"));
    }

    #[test]
    fn classifier_thresholds_must_be_ordered() {
        let mut config = ChainscopeConfig::default();
        config.classifier.light_max = 0.9;
        config.classifier.heavy_min = 0.6;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "light_max <= heavy_min"));
    }

    #[test]
    fn provider_confidence_range() {
        let mut config = ChainscopeConfig::default();
        config.providers.cryptopanic.confidence = 1.2;
        assert!(config.providers.hints("cryptopanic").unwrap().confidence() > 1.0);
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "providers.cryptopanic.confidence"));
    }

    #[test]
    fn invalid_log_level() {
        let mut config = ChainscopeConfig::default();
        config.telemetry.log_level = "verbose".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "telemetry.log_level"));
    }
}
