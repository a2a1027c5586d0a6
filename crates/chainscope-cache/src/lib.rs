// SPDX-FileCopyrightText: 2026 Chainscope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Durable three-tier cache for query results.
//!
//! Entries live in a single SQLite file so repeated short-lived runs reuse
//! results instead of spending provider quota again. Every operation runs on
//! the one tokio-rusqlite connection thread, which serializes writers.

pub mod database;
pub mod entry;
pub mod migrations;
pub mod store;

pub use entry::{CacheEntry, TierTtls};
pub use store::CacheStore;
