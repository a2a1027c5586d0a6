// SPDX-FileCopyrightText: 2026 Chainscope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Complexity classification and fallback routing for Chainscope.
//!
//! This crate provides:
//! - [`ComplexityClassifier`]: heuristic request scoring into light/moderate/heavy bands
//! - [`StatsTracker`]: per-provider counters, latency average and circuit breaker
//! - [`ProviderRegistry`]: registered adapters and their static records
//! - [`FallbackRouter`]: ordered, deadline-bounded walk of a provider chain
//!
//! The router never touches the cache; the facade crate wraps it with cache
//! lookups and write-through.

pub mod classifier;
pub mod ranking;
pub mod recording;
pub mod registry;
pub mod router;
pub mod stats;

pub use classifier::{Classification, ComplexityBand, ComplexityClassifier};
pub use ranking::RerankPolicy;
pub use registry::ProviderRegistry;
pub use router::{FallbackRouter, RoutePlan, Routed};
pub use stats::{ProviderHealth, StatsTracker};
