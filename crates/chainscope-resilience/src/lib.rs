// SPDX-FileCopyrightText: 2026 Chainscope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resilience primitives for provider calls.
//!
//! [`CircuitBreaker`] keeps a failing provider out of the fallback walk until
//! its cool-down elapses. [`RetryPolicy`] re-invokes a single provider on
//! transient failures with exponential, jittered backoff, re-checking the
//! breaker before each attempt and never sleeping past the request deadline.

pub mod circuit;
pub mod retry;

pub use circuit::{BreakerSettings, BreakerSnapshot, CircuitBreaker};
pub use retry::RetryPolicy;
