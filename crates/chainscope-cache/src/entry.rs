// SPDX-FileCopyrightText: 2026 Chainscope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cache entries and tier lifetimes.

use std::time::Duration;

use chainscope_config::model::CacheConfig;
use chainscope_core::{CacheKey, CacheTier};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Time-to-live for each cache tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierTtls {
    pub hot: Duration,
    pub warm: Duration,
    pub cold: Duration,
}

impl Default for TierTtls {
    fn default() -> Self {
        Self {
            hot: Duration::from_secs(60),
            warm: Duration::from_secs(300),
            cold: Duration::from_secs(86_400),
        }
    }
}

impl TierTtls {
    pub fn from_config(config: &CacheConfig) -> Self {
        Self {
            hot: Duration::from_secs(config.hot_ttl_secs),
            warm: Duration::from_secs(config.warm_ttl_secs),
            cold: Duration::from_secs(config.cold_ttl_secs),
        }
    }

    pub fn ttl(&self, tier: CacheTier) -> Duration {
        match tier {
            CacheTier::Hot => self.hot,
            CacheTier::Warm => self.warm,
            CacheTier::Cold => self.cold,
        }
    }

    /// `fetched_at + ttl(tier)`, saturating at the maximum representable time.
    pub fn expiry(&self, tier: CacheTier, fetched_at: DateTime<Utc>) -> DateTime<Utc> {
        TimeDelta::from_std(self.ttl(tier))
            .ok()
            .and_then(|ttl| fetched_at.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

/// One stored result.
///
/// `expires_at` is always `fetched_at + ttl(tier)`; the entry is valid while
/// `now < expires_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: CacheKey,
    pub value: serde_json::Value,
    pub tier: CacheTier,
    pub fetched_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Provider that produced the value.
    pub source: String,
}

impl CacheEntry {
    pub fn new(
        key: CacheKey,
        value: serde_json::Value,
        tier: CacheTier,
        source: impl Into<String>,
        fetched_at: DateTime<Utc>,
        ttls: &TierTtls,
    ) -> Self {
        Self {
            key,
            value,
            tier,
            fetched_at,
            expires_at: ttls.expiry(tier, fetched_at),
            source: source.into(),
        }
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    /// Copy of this entry in the hot tier, keeping the original `fetched_at`.
    pub fn promoted(&self, ttls: &TierTtls) -> CacheEntry {
        CacheEntry {
            tier: CacheTier::Hot,
            expires_at: ttls.expiry(CacheTier::Hot, self.fetched_at),
            ..self.clone()
        }
    }

    /// Age of the data relative to `now`.
    pub fn age_at(&self, now: DateTime<Utc>) -> Duration {
        (now - self.fetched_at).to_std().unwrap_or_default()
    }
}
