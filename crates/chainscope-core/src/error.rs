// SPDX-FileCopyrightText: 2026 Chainscope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Chainscope orchestration layer.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::types::QueryType;

/// Failure reported by a single provider adapter call.
///
/// Adapters never retry; the router decides what to do with each variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// Quota exhausted (HTTP 429). `retry_after` carries the server hint, if any.
    #[error("rate limited: {message}")]
    RateLimited {
        message: String,
        retry_after: Option<Duration>,
    },

    /// Provider down, unreachable, or returned an unusable body.
    #[error("unavailable: {message}")]
    Unavailable { message: String },

    /// The request was rejected as malformed or unauthorized.
    #[error("bad request: {message}")]
    BadRequest { message: String },

    /// The provider did not answer in time.
    #[error("timeout: {message}")]
    Timeout { message: String },
}

impl ProviderError {
    pub fn rate_limited(message: impl Into<String>, retry_after: Option<Duration>) -> Self {
        Self::RateLimited {
            message: message.into(),
            retry_after,
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Whether the failure is transient enough to retry against the same provider.
    ///
    /// `Unavailable` is not retryable here; the retry policy can opt into it.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited { .. } | Self::Timeout { .. })
    }

    pub fn is_bad_request(&self) -> bool {
        matches!(self, Self::BadRequest { .. })
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    /// Server-provided wait hint for rate-limit responses.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    /// Short label used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RateLimited { .. } => "rate_limited",
            Self::Unavailable { .. } => "unavailable",
            Self::BadRequest { .. } => "bad_request",
            Self::Timeout { .. } => "timeout",
        }
    }
}

/// Why a provider in the fallback chain did not produce a result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailureReason {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Skipped without calling the adapter because its breaker is open.
    #[error("circuit open, retry in {retry_in:?}")]
    CircuitOpen { retry_in: Duration },

    /// The request deadline passed before or during this provider's attempt.
    #[error("deadline exceeded")]
    DeadlineExceeded,
}

impl FailureReason {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Provider(e) => e.kind(),
            Self::CircuitOpen { .. } => "circuit_open",
            Self::DeadlineExceeded => "deadline_exceeded",
        }
    }

    pub fn as_provider_error(&self) -> Option<&ProviderError> {
        match self {
            Self::Provider(e) => Some(e),
            _ => None,
        }
    }
}

/// One entry in an exhaustion report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptFailure {
    pub provider_id: String,
    pub reason: FailureReason,
}

impl AttemptFailure {
    pub fn new(provider_id: impl Into<String>, reason: impl Into<FailureReason>) -> Self {
        Self {
            provider_id: provider_id.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.provider_id, self.reason)
    }
}

/// Formats the attempt list as `a: reason; b: reason`.
struct Attempts<'a>(&'a [AttemptFailure]);

impl fmt::Display for Attempts<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("no provider attempted");
        }
        for (i, attempt) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{attempt}")?;
        }
        Ok(())
    }
}

fn deadline_note(exceeded: &bool) -> &'static str {
    if *exceeded { " (deadline exceeded)" } else { "" }
}

/// The primary error type returned by the orchestrator.
#[derive(Debug, Error)]
pub enum ChainscopeError {
    /// Configuration errors (invalid TOML, unknown provider, bad thresholds).
    #[error("configuration error: {0}")]
    Config(String),

    /// Cache backend errors (database open, migration, query failure).
    #[error("cache error: {source}")]
    Cache {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// No registered provider can serve this query type.
    #[error("unsupported query type: {query_type}")]
    UnsupportedQuery { query_type: QueryType },

    /// Every provider in the chain failed, was skipped, or the deadline passed.
    #[error(
        "all providers exhausted for {query_type}{}: {}",
        deadline_note(.deadline_exceeded),
        Attempts(.attempts)
    )]
    AllProvidersExhausted {
        query_type: QueryType,
        attempts: Vec<AttemptFailure>,
        deadline_exceeded: bool,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ChainscopeError {
    /// True when the chain was exhausted and every attempt was rejected as a bad request.
    pub fn is_malformed_query(&self) -> bool {
        match self {
            Self::AllProvidersExhausted { attempts, .. } => {
                !attempts.is_empty()
                    && attempts.iter().all(|a| {
                        a.reason
                            .as_provider_error()
                            .is_some_and(ProviderError::is_bad_request)
                    })
            }
            _ => false,
        }
    }

    /// Failure records for an exhaustion error, empty otherwise.
    pub fn attempts(&self) -> &[AttemptFailure] {
        match self {
            Self::AllProvidersExhausted { attempts, .. } => attempts,
            _ => &[],
        }
    }
}
