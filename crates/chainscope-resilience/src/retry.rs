// SPDX-FileCopyrightText: 2026 Chainscope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded retries against a single provider.

use std::future::Future;
use std::time::Duration;

use chainscope_config::model::RetryConfig;
use chainscope_core::{FailureReason, ProviderError};
use rand::Rng;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::circuit::CircuitBreaker;

/// Exponential backoff with jitter.
///
/// Waits are `base_delay * 2^(attempt - 1)` scaled by a random factor in
/// `[1 - jitter, 1 + jitter]`. A `Retry-After` hint raises the wait to at
/// least the hint, capped at `max_rate_limit_wait`.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub jitter: f64,
    pub retry_unavailable: bool,
    pub max_rate_limit_wait: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

impl RetryPolicy {
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: Duration::from_millis(config.base_delay_ms),
            jitter: config.jitter.clamp(0.0, 0.99),
            retry_unavailable: config.retry_unavailable,
            max_rate_limit_wait: Duration::from_secs(config.max_rate_limit_wait_secs),
        }
    }

    /// Single attempt, no waiting.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    pub fn should_retry(&self, error: &ProviderError) -> bool {
        error.is_retryable()
            || (self.retry_unavailable && matches!(error, ProviderError::Unavailable { .. }))
    }

    /// Un-jittered wait after the `attempt`-th failure (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32
            .checked_shl(attempt.saturating_sub(1))
            .unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }

    /// Wait to apply after the `attempt`-th failure with `error`.
    pub fn delay_for(&self, attempt: u32, error: &ProviderError) -> Duration {
        let base = self.backoff(attempt);
        let jittered = if self.jitter > 0.0 {
            let factor = 1.0 + rand::thread_rng().gen_range(-self.jitter..=self.jitter);
            Duration::try_from_secs_f64(base.as_secs_f64() * factor).unwrap_or(Duration::MAX)
        } else {
            base
        };
        match error.retry_after() {
            Some(hint) => jittered.max(hint.min(self.max_rate_limit_wait)),
            None => jittered,
        }
    }

    /// Runs `op` under this policy against the provider guarded by `breaker`.
    ///
    /// The breaker is consulted before every attempt and told about every
    /// outcome. `op` receives the 1-based attempt number. An attempt still in
    /// flight at `deadline` is dropped and reported as
    /// [`FailureReason::DeadlineExceeded`]; a retry whose wait would end past
    /// the deadline is abandoned and the last provider error is returned. A
    /// failure that opens the breaker ends the run at once with that error.
    pub async fn run<T, F, Fut>(
        &self,
        breaker: &CircuitBreaker,
        deadline: Instant,
        mut op: F,
    ) -> Result<T, FailureReason>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let provider = breaker.provider_id();
        let mut attempt = 1;
        loop {
            breaker.try_acquire().await?;
            if Instant::now() >= deadline {
                return Err(FailureReason::DeadlineExceeded);
            }

            let error = match tokio::time::timeout_at(deadline, op(attempt)).await {
                Err(_) => {
                    debug!(provider, attempt, "attempt dropped at deadline");
                    return Err(FailureReason::DeadlineExceeded);
                }
                Ok(Ok(value)) => {
                    breaker.record_success().await;
                    return Ok(value);
                }
                Ok(Err(error)) => error,
            };

            if breaker.record_failure(&error).await {
                debug!(provider, attempt, "breaker opened, giving up on provider");
                return Err(error.into());
            }
            if attempt >= self.max_attempts || !self.should_retry(&error) {
                return Err(error.into());
            }

            let wait = self.delay_for(attempt, &error);
            if Instant::now() + wait >= deadline {
                debug!(
                    provider,
                    attempt,
                    wait_ms = wait.as_millis() as u64,
                    "retry would pass the deadline"
                );
                return Err(error.into());
            }
            warn!(
                provider,
                attempt,
                wait_ms = wait.as_millis() as u64,
                error = %error,
                "provider call failed, retrying"
            );
            tokio::time::sleep(wait).await;
            attempt += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::Mutex;

    use tracing_test::traced_test;

    use super::*;
    use crate::circuit::BreakerSettings;

    fn breaker() -> CircuitBreaker {
        CircuitBreaker::new("coingecko", BreakerSettings::default())
    }

    fn far_deadline() -> Instant {
        Instant::now() + Duration::from_secs(3600)
    }

    #[test]
    fn backoff_doubles() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(1), Duration::from_secs(2));
        assert_eq!(policy.backoff(2), Duration::from_secs(4));
        assert_eq!(policy.backoff(3), Duration::from_secs(8));
    }

    #[test]
    fn jitter_stays_within_band() {
        let policy = RetryPolicy::default();
        let err = ProviderError::timeout("slow");
        for _ in 0..200 {
            let d = policy.delay_for(1, &err);
            assert!(d >= Duration::from_millis(1600) && d <= Duration::from_millis(2400), "{d:?}");
        }
    }

    #[test]
    fn retry_after_raises_wait_up_to_cap() {
        let policy = RetryPolicy {
            jitter: 0.0,
            ..RetryPolicy::default()
        };
        let hinted = ProviderError::rate_limited("429", Some(Duration::from_secs(15)));
        assert_eq!(policy.delay_for(1, &hinted), Duration::from_secs(15));

        let huge = ProviderError::rate_limited("429", Some(Duration::from_secs(3600)));
        assert_eq!(policy.delay_for(1, &huge), Duration::from_secs(60));

        let small = ProviderError::rate_limited("429", Some(Duration::from_millis(10)));
        assert_eq!(policy.delay_for(1, &small), Duration::from_secs(2));
    }

    #[test]
    fn unavailable_retry_is_opt_in() {
        let err = ProviderError::unavailable("503");
        assert!(!RetryPolicy::default().should_retry(&err));
        let opted = RetryPolicy {
            retry_unavailable: true,
            ..RetryPolicy::default()
        };
        assert!(opted.should_retry(&err));
        assert!(!opted.should_retry(&ProviderError::bad_request("nope")));
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limited_three_times_with_increasing_waits() {
        let policy = RetryPolicy::default();
        let cb = breaker();
        let calls = Arc::new(Mutex::new(Vec::new()));

        let recorded = Arc::clone(&calls);
        let result: Result<(), _> = policy
            .run(&cb, far_deadline(), move |_| {
                recorded.lock().unwrap().push(Instant::now());
                async { Err(ProviderError::rate_limited("429", None)) }
            })
            .await;

        assert!(matches!(
            result,
            Err(FailureReason::Provider(ProviderError::RateLimited { .. }))
        ));
        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 3);
        let first_wait = calls[1] - calls[0];
        let second_wait = calls[2] - calls[1];
        assert!(first_wait >= Duration::from_millis(1600));
        assert!(second_wait > first_wait);
    }

    #[tokio::test(start_paused = true)]
    async fn bad_request_is_not_retried() {
        let policy = RetryPolicy::default();
        let cb = breaker();
        let mut count = 0;
        let result: Result<(), _> = policy
            .run(&cb, far_deadline(), |_| {
                count += 1;
                async { Err(ProviderError::bad_request("unknown coin")) }
            })
            .await;
        assert_eq!(count, 1);
        assert!(matches!(
            result,
            Err(FailureReason::Provider(ProviderError::BadRequest { .. }))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_after_transient_timeout() {
        let policy = RetryPolicy::default();
        let cb = breaker();
        let result = policy
            .run(&cb, far_deadline(), |attempt| async move {
                if attempt == 1 {
                    Err(ProviderError::timeout("read timed out"))
                } else {
                    Ok(attempt)
                }
            })
            .await;
        assert_eq!(result, Ok(2));
        assert_eq!(cb.snapshot().await.consecutive_failures, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn never_sleeps_past_deadline() {
        let policy = RetryPolicy::default();
        let cb = breaker();
        let start = Instant::now();
        let deadline = start + Duration::from_secs(3);
        let mut count = 0;
        let result: Result<(), _> = policy
            .run(&cb, deadline, |_| {
                count += 1;
                async { Err(ProviderError::timeout("slow")) }
            })
            .await;
        // first wait fits (<= 2.4s), second (>= 3.2s) would overrun
        assert_eq!(count, 2);
        assert!(result.is_err());
        assert!(Instant::now() <= deadline);
    }

    #[tokio::test(start_paused = true)]
    async fn in_flight_attempt_dropped_at_deadline() {
        let policy = RetryPolicy::default();
        let cb = breaker();
        let deadline = Instant::now() + Duration::from_secs(5);
        let result: Result<(), _> = policy
            .run(&cb, deadline, |_| async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(())
            })
            .await;
        assert_eq!(result, Err(FailureReason::DeadlineExceeded));
        assert!(Instant::now() >= deadline);
        assert!(Instant::now() < deadline + Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn opening_failure_ends_run_without_waiting() {
        let policy = RetryPolicy {
            max_attempts: 10,
            base_delay: Duration::from_millis(100),
            jitter: 0.0,
            ..RetryPolicy::default()
        };
        let cb = breaker();
        let start = Instant::now();
        let mut count = 0;
        let result: Result<(), _> = policy
            .run(&cb, far_deadline(), |_| {
                count += 1;
                async { Err(ProviderError::timeout("down")) }
            })
            .await;
        assert_eq!(count, 5);
        assert!(matches!(
            result,
            Err(FailureReason::Provider(ProviderError::Timeout { .. }))
        ));
        // waits after failures 1..=4 only: 100 + 200 + 400 + 800 ms
        assert_eq!(Instant::now() - start, Duration::from_millis(1500));
        assert_eq!(cb.state().await, chainscope_core::CircuitState::Open);

        let again: Result<(), _> = policy
            .run(&cb, far_deadline(), |_| async { Ok(()) })
            .await;
        assert!(matches!(again, Err(FailureReason::CircuitOpen { .. })));
    }

    #[tokio::test(start_paused = true)]
    #[traced_test]
    async fn retries_are_logged() {
        let policy = RetryPolicy::default();
        let cb = breaker();
        let _: Result<(), _> = policy
            .run(&cb, far_deadline(), |_| async { Err(ProviderError::timeout("slow")) })
            .await;
        assert!(logs_contain("provider call failed, retrying"));
    }
}
