// SPDX-FileCopyrightText: 2026 Chainscope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration loading with Figment.
//!
//! Merge order (later overrides earlier):
//! 1. Compiled defaults
//! 2. `/etc/chainscope/chainscope.toml`
//! 3. `$XDG_CONFIG_HOME/chainscope/chainscope.toml`
//! 4. `./chainscope.toml`
//! 5. `CHAINSCOPE_*` environment variables

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::ChainscopeConfig;

pub(crate) const SYSTEM_CONFIG: &str = "/etc/chainscope/chainscope.toml";
pub(crate) const LOCAL_CONFIG: &str = "chainscope.toml";

pub(crate) fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("chainscope").join("chainscope.toml"))
}

/// The figment with every layer applied, before extraction.
pub fn build_figment() -> Figment {
    let mut figment = Figment::new()
        .merge(Serialized::defaults(ChainscopeConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG));
    if let Some(user) = user_config_path() {
        figment = figment.merge(Toml::file(user));
    }
    figment.merge(Toml::file(LOCAL_CONFIG)).merge(env_provider())
}

/// Loads configuration from the standard file hierarchy plus env overrides.
pub fn load_config() -> Result<ChainscopeConfig, figment::Error> {
    let config: ChainscopeConfig = build_figment().extract()?;
    tracing::debug!(cache_path = %config.cache.path, "configuration loaded");
    Ok(config)
}

/// Loads configuration from a TOML string on top of the defaults (no files, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<ChainscopeConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ChainscopeConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Loads configuration from one explicit file, with env overrides.
pub fn load_config_from_path(path: &Path) -> Result<ChainscopeConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ChainscopeConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Section prefixes in the order they are matched. Provider sections come
/// first so `providers_dune_api_key` is not split at the wrong underscore.
const ENV_SECTIONS: [(&str, &str); 15] = [
    ("providers_defillama_", "providers.defillama."),
    ("providers_coingecko_", "providers.coingecko."),
    ("providers_dune_", "providers.dune."),
    ("providers_etherscan_", "providers.etherscan."),
    ("providers_cryptopanic_", "providers.cryptopanic."),
    ("providers_deribit_", "providers.deribit."),
    ("providers_reddit_", "providers.reddit."),
    ("providers_github_", "providers.github."),
    ("circuit_breaker_", "circuit_breaker."),
    ("telemetry_", "telemetry."),
    ("cache_", "cache."),
    ("retry_", "retry."),
    ("routing_", "routing."),
    ("classifier_", "classifier."),
    ("providers_", "providers."),
];

/// Maps a lowercased, prefix-stripped env var name to a dotted config path.
///
/// `providers_dune_api_key` becomes `providers.dune.api_key`; names that match
/// no section are passed through unchanged and rejected by `deny_unknown_fields`.
pub fn map_env_key(key: &str) -> String {
    for (prefix, dotted) in ENV_SECTIONS {
        if let Some(rest) = key.strip_prefix(prefix) {
            return format!("{dotted}{rest}");
        }
    }
    key.to_string()
}

fn env_provider() -> Env {
    Env::prefixed("CHAINSCOPE_").map(|key| map_env_key(key.as_str()).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_map_to_sections() {
        assert_eq!(map_env_key("providers_dune_api_key"), "providers.dune.api_key");
        assert_eq!(
            map_env_key("circuit_breaker_failure_threshold"),
            "circuit_breaker.failure_threshold"
        );
        assert_eq!(map_env_key("providers_github_api_key"), "providers.github.api_key");
        assert_eq!(
            map_env_key("providers_reddit_default_subreddit"),
            "providers.reddit.default_subreddit"
        );
        assert_eq!(map_env_key("cache_hot_ttl_secs"), "cache.hot_ttl_secs");
        assert_eq!(map_env_key("telemetry_log_level"), "telemetry.log_level");
        assert_eq!(
            map_env_key("routing_heavyweight_provider"),
            "routing.heavyweight_provider"
        );
    }

    #[test]
    fn unmatched_env_key_passes_through() {
        assert_eq!(map_env_key("something_else"), "something_else");
    }
}
