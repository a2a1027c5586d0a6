// SPDX-FileCopyrightText: 2026 Chainscope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chainscope: one query interface over many crypto market data providers.
//!
//! Requests are answered from a three-tier SQLite cache when possible, and
//! otherwise routed through a complexity-ordered provider chain with retries,
//! circuit breakers and a per-request deadline.
//!
//! ```no_run
//! # async fn demo() -> Result<(), chainscope::ChainscopeError> {
//! use chainscope::{Orchestrator, QueryRequest, QueryType};
//!
//! let config = match chainscope::load_and_validate() {
//!     Ok(config) => config,
//!     Err(errors) => {
//!         chainscope::render_errors(&errors);
//!         return Err(chainscope::ChainscopeError::Config("invalid configuration".into()));
//!     }
//! };
//! chainscope::telemetry::init_tracing(&config.telemetry.log_level);
//!
//! let orchestrator = Orchestrator::builder(config).build().await?;
//! let request = QueryRequest::new(QueryType::TokenPrice).with_param("ids", "bitcoin");
//! let result = orchestrator.execute(&request).await?;
//! println!("{} via {}", result.data, result.source);
//! # Ok(())
//! # }
//! ```

pub mod orchestrator;
pub mod telemetry;

pub use orchestrator::{CACHE_SOURCE, Orchestrator, OrchestratorBuilder};

pub use chainscope_cache::{CacheEntry, CacheStore};
pub use chainscope_config::{
    ChainscopeConfig, ConfigError, load_and_validate, load_and_validate_str, render_errors,
};
pub use chainscope_core::{
    AttemptFailure, CacheKey, CacheTier, ChainscopeError, CircuitState, CostClass, FailureReason,
    ParamValue, Priority, ProviderAdapter, ProviderError, ProviderRecord, ProviderStats,
    QueryRequest, QueryResult, QueryType, RawResult,
};
pub use chainscope_resilience::RetryPolicy;
pub use chainscope_router::{Classification, ComplexityBand, RoutePlan};
