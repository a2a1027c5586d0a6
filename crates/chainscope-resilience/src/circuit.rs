// SPDX-FileCopyrightText: 2026 Chainscope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-provider circuit breaker.
//!
//! State machine: `closed -> open -> half-open -> closed`. While open, calls
//! are short-circuited without touching the adapter. After the cool-down a
//! single trial call is admitted; its outcome closes the breaker or reopens it with
//! a doubled cool-down.

use std::time::Duration;

use chainscope_config::model::CircuitBreakerConfig;
use chainscope_core::{CircuitState, FailureReason, ProviderError};
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{info, warn};

/// Thresholds for a [`CircuitBreaker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakerSettings {
    pub failure_threshold: u32,
    pub base_cooldown: Duration,
    pub max_cooldown: Duration,
    pub ignore_rate_limits: bool,
}

impl Default for BreakerSettings {
    fn default() -> Self {
        Self::from_config(&CircuitBreakerConfig::default())
    }
}

impl BreakerSettings {
    pub fn from_config(config: &CircuitBreakerConfig) -> Self {
        Self {
            failure_threshold: config.failure_threshold.max(1),
            base_cooldown: Duration::from_secs(config.base_cooldown_secs),
            max_cooldown: Duration::from_secs(config.max_cooldown_secs),
            ignore_rate_limits: config.ignore_rate_limits,
        }
    }

    /// Cool-down for the `openings`-th consecutive opening:
    /// `base * 2^(openings - 1)`, capped at `max_cooldown`.
    pub fn cooldown_for(&self, openings: u32) -> Duration {
        let factor = 1u32
            .checked_shl(openings.saturating_sub(1))
            .unwrap_or(u32::MAX);
        self.base_cooldown
            .saturating_mul(factor)
            .min(self.max_cooldown)
    }
}

/// Point-in-time view of a breaker, used to fill `ProviderStats`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakerSnapshot {
    pub state: CircuitState,
    pub consecutive_failures: u32,
    /// Consecutive openings without an intervening recovery.
    pub openings: u32,
    pub opened_at: Option<DateTime<Utc>>,
    /// Remaining cool-down while open.
    pub retry_in: Option<Duration>,
}

#[derive(Debug)]
struct BreakerState {
    state: CircuitState,
    consecutive_failures: u32,
    openings: u32,
    cooldown: Duration,
    opened_at: Option<Instant>,
    opened_at_wall: Option<DateTime<Utc>>,
    /// Set while the half-open trial call is outstanding.
    trial_started: Option<Instant>,
}

impl BreakerState {
    fn closed() -> Self {
        Self {
            state: CircuitState::Closed,
            consecutive_failures: 0,
            openings: 0,
            cooldown: Duration::ZERO,
            opened_at: None,
            opened_at_wall: None,
            trial_started: None,
        }
    }

    fn remaining(&self, now: Instant) -> Duration {
        self.opened_at
            .map(|at| self.cooldown.saturating_sub(now.saturating_duration_since(at)))
            .unwrap_or_default()
    }
}

/// Circuit breaker guarding one provider.
pub struct CircuitBreaker {
    provider_id: String,
    settings: BreakerSettings,
    inner: Mutex<BreakerState>,
}

impl CircuitBreaker {
    pub fn new(provider_id: impl Into<String>, settings: BreakerSettings) -> Self {
        Self {
            provider_id: provider_id.into(),
            settings,
            inner: Mutex::new(BreakerState::closed()),
        }
    }

    pub fn provider_id(&self) -> &str {
        &self.provider_id
    }

    pub fn settings(&self) -> &BreakerSettings {
        &self.settings
    }

    /// Asks for permission to call the provider.
    ///
    /// Returns [`FailureReason::CircuitOpen`] with the remaining cool-down when
    /// the call must be skipped. An open breaker whose cool-down has elapsed
    /// moves to half-open and admits exactly one trial call; concurrent callers are
    /// turned away until the trial call resolves. A trial call abandoned for longer than
    /// the current cool-down (e.g. dropped at a deadline) is replaced.
    pub async fn try_acquire(&self) -> Result<(), FailureReason> {
        let now = Instant::now();
        let mut inner = self.inner.lock().await;
        match inner.state {
            CircuitState::Closed => Ok(()),
            CircuitState::Open => {
                let retry_in = inner.remaining(now);
                if retry_in.is_zero() {
                    inner.state = CircuitState::HalfOpen;
                    inner.trial_started = Some(now);
                    info!(provider = %self.provider_id, "circuit half-open, admitting trial call");
                    Ok(())
                } else {
                    Err(FailureReason::CircuitOpen { retry_in })
                }
            }
            CircuitState::HalfOpen => {
                let stale = inner
                    .trial_started
                    .is_none_or(|started| now.saturating_duration_since(started) >= inner.cooldown);
                if stale {
                    inner.trial_started = Some(now);
                    Ok(())
                } else {
                    Err(FailureReason::CircuitOpen {
                        retry_in: Duration::ZERO,
                    })
                }
            }
        }
    }

    /// Whether calls are currently turned away. Does not claim the trial call.
    pub async fn is_open(&self) -> bool {
        let inner = self.inner.lock().await;
        match inner.state {
            CircuitState::Closed => false,
            CircuitState::Open => !inner.remaining(Instant::now()).is_zero(),
            CircuitState::HalfOpen => inner.trial_started.is_some(),
        }
    }

    pub async fn record_success(&self) {
        let mut inner = self.inner.lock().await;
        if inner.state != CircuitState::Closed {
            info!(
                provider = %self.provider_id,
                openings = inner.openings,
                "circuit closed after successful trial call"
            );
        }
        *inner = BreakerState::closed();
    }

    /// Records a failed call. Returns `true` when this failure opened the breaker.
    ///
    /// `BadRequest` never counts, and neither does `RateLimited` when
    /// `ignore_rate_limits` is set; both still release a half-open trial call.
    pub async fn record_failure(&self, error: &ProviderError) -> bool {
        let mut inner = self.inner.lock().await;
        let ignored = error.is_bad_request()
            || (error.is_rate_limited() && self.settings.ignore_rate_limits);
        if ignored {
            inner.trial_started = None;
            return false;
        }

        inner.consecutive_failures = inner.consecutive_failures.saturating_add(1);
        match inner.state {
            CircuitState::Closed if inner.consecutive_failures >= self.settings.failure_threshold => {
                self.open(&mut inner, error);
                true
            }
            CircuitState::HalfOpen => {
                self.open(&mut inner, error);
                true
            }
            _ => false,
        }
    }

    fn open(&self, inner: &mut BreakerState, error: &ProviderError) {
        inner.openings = inner.openings.saturating_add(1);
        inner.cooldown = self.settings.cooldown_for(inner.openings);
        inner.state = CircuitState::Open;
        inner.opened_at = Some(Instant::now());
        inner.opened_at_wall = Some(Utc::now());
        inner.trial_started = None;
        warn!(
            provider = %self.provider_id,
            consecutive_failures = inner.consecutive_failures,
            openings = inner.openings,
            cooldown_secs = inner.cooldown.as_secs(),
            error = %error,
            "circuit opened"
        );
    }

    /// Forces the breaker closed and forgets its history.
    pub async fn reset(&self) {
        *self.inner.lock().await = BreakerState::closed();
    }

    pub async fn state(&self) -> CircuitState {
        self.inner.lock().await.state
    }

    pub async fn snapshot(&self) -> BreakerSnapshot {
        let inner = self.inner.lock().await;
        BreakerSnapshot {
            state: inner.state,
            consecutive_failures: inner.consecutive_failures,
            openings: inner.openings,
            opened_at: inner.opened_at_wall,
            retry_in: (inner.state == CircuitState::Open).then(|| inner.remaining(Instant::now())),
        }
    }
}

impl std::fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("provider_id", &self.provider_id)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn breaker() -> CircuitBreaker {
        CircuitBreaker::new("defillama", BreakerSettings::default())
    }

    fn unavailable() -> ProviderError {
        ProviderError::unavailable("502 bad gateway")
    }

    #[test]
    fn cooldown_doubles_and_caps() {
        let s = BreakerSettings::default();
        assert_eq!(s.cooldown_for(1), Duration::from_secs(30));
        assert_eq!(s.cooldown_for(2), Duration::from_secs(60));
        assert_eq!(s.cooldown_for(3), Duration::from_secs(120));
        assert_eq!(s.cooldown_for(5), Duration::from_secs(480));
        assert_eq!(s.cooldown_for(6), Duration::from_secs(600));
        assert_eq!(s.cooldown_for(40), Duration::from_secs(600));
    }

    #[tokio::test(start_paused = true)]
    async fn opens_after_threshold() {
        let cb = breaker();
        for i in 0..4 {
            assert!(!cb.record_failure(&unavailable()).await, "failure {i}");
            assert!(cb.try_acquire().await.is_ok());
        }
        assert!(cb.record_failure(&unavailable()).await);
        assert_eq!(cb.state().await, CircuitState::Open);

        match cb.try_acquire().await {
            Err(FailureReason::CircuitOpen { retry_in }) => {
                assert_eq!(retry_in, Duration::from_secs(30));
            }
            other => panic!("expected CircuitOpen, got {other:?}"),
        }
        let snap = cb.snapshot().await;
        assert_eq!(snap.consecutive_failures, 5);
        assert!(snap.opened_at.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn success_in_closed_resets_counter() {
        let cb = breaker();
        for _ in 0..4 {
            cb.record_failure(&unavailable()).await;
        }
        cb.record_success().await;
        cb.record_failure(&unavailable()).await;
        assert_eq!(cb.state().await, CircuitState::Closed);
        assert_eq!(cb.snapshot().await.consecutive_failures, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn single_trial_call_after_cooldown() {
        let cb = breaker();
        for _ in 0..5 {
            cb.record_failure(&unavailable()).await;
        }
        tokio::time::advance(Duration::from_secs(30)).await;

        assert!(cb.try_acquire().await.is_ok());
        assert_eq!(cb.state().await, CircuitState::HalfOpen);
        assert!(matches!(
            cb.try_acquire().await,
            Err(FailureReason::CircuitOpen { .. })
        ));

        cb.record_success().await;
        let snap = cb.snapshot().await;
        assert_eq!(snap.state, CircuitState::Closed);
        assert_eq!(snap.consecutive_failures, 0);
        assert_eq!(snap.openings, 0);
        assert!(cb.try_acquire().await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn failed_trial_call_reopens_with_longer_cooldown() {
        let cb = breaker();
        for _ in 0..5 {
            cb.record_failure(&unavailable()).await;
        }
        tokio::time::advance(Duration::from_secs(30)).await;
        cb.try_acquire().await.unwrap();
        assert!(cb.record_failure(&ProviderError::timeout("trial")).await);

        match cb.try_acquire().await {
            Err(FailureReason::CircuitOpen { retry_in }) => {
                assert_eq!(retry_in, Duration::from_secs(60));
            }
            other => panic!("expected CircuitOpen, got {other:?}"),
        }
        assert_eq!(cb.snapshot().await.openings, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn abandoned_trial_call_is_replaced() {
        let cb = breaker();
        for _ in 0..5 {
            cb.record_failure(&unavailable()).await;
        }
        tokio::time::advance(Duration::from_secs(30)).await;
        cb.try_acquire().await.unwrap();
        tokio::time::advance(Duration::from_secs(30)).await;
        assert!(cb.try_acquire().await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn bad_request_does_not_count() {
        let cb = breaker();
        for _ in 0..10 {
            assert!(!cb.record_failure(&ProviderError::bad_request("missing ids")).await);
        }
        assert_eq!(cb.state().await, CircuitState::Closed);
        assert_eq!(cb.snapshot().await.consecutive_failures, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limits_count_unless_ignored() {
        let rl = ProviderError::rate_limited("429", None);

        let counted = breaker();
        for _ in 0..5 {
            counted.record_failure(&rl).await;
        }
        assert_eq!(counted.state().await, CircuitState::Open);

        let settings = BreakerSettings {
            ignore_rate_limits: true,
            ..BreakerSettings::default()
        };
        let ignoring = CircuitBreaker::new("coingecko", settings);
        for _ in 0..10 {
            ignoring.record_failure(&rl).await;
        }
        assert_eq!(ignoring.state().await, CircuitState::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_forces_closed() {
        let cb = breaker();
        for _ in 0..5 {
            cb.record_failure(&unavailable()).await;
        }
        assert!(cb.is_open().await);
        cb.reset().await;
        assert!(!cb.is_open().await);
        assert_eq!(cb.snapshot().await, BreakerSnapshot {
            state: CircuitState::Closed,
            consecutive_failures: 0,
            openings: 0,
            opened_at: None,
            retry_in: None,
        });
    }
}
