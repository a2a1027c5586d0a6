// SPDX-FileCopyrightText: 2026 Chainscope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Chainscope data orchestration layer.
//!
//! This crate provides the request/result model, cache keys, the error
//! taxonomy, and the [`ProviderAdapter`] trait implemented by every
//! external data source.

pub mod error;
pub mod key;
pub mod traits;
pub mod types;

pub use error::{AttemptFailure, ChainscopeError, FailureReason, ProviderError};
pub use key::CacheKey;
pub use traits::ProviderAdapter;
pub use types::{
    CacheTier, CircuitState, CostClass, ParamValue, Priority, ProviderRecord, ProviderStats,
    QueryRequest, QueryResult, QueryType, RawResult,
};
