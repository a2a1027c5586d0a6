// SPDX-FileCopyrightText: 2026 Chainscope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test environment: a temp cache directory plus a configuration tuned for
//! fast, deterministic runs.

use std::path::PathBuf;

use chainscope_config::ChainscopeConfig;
use chainscope_core::QueryType;
use tempfile::TempDir;

/// Owns a temp directory for the cache file; dropped with the test.
pub struct TestEnv {
    dir: TempDir,
    pub config: ChainscopeConfig,
}

impl TestEnv {
    /// Config with the cache inside a fresh temp dir, no retry jitter, and
    /// 10ms base backoff.
    pub fn new() -> std::io::Result<Self> {
        let dir = TempDir::new()?;
        let mut config = ChainscopeConfig::default();
        config.cache.path = dir.path().join("cache.db").to_string_lossy().into_owned();
        config.retry.base_delay_ms = 10;
        config.retry.jitter = 0.0;
        Ok(Self { dir, config })
    }

    /// Replaces the fallback chain for `query_type`.
    pub fn with_chain(mut self, query_type: QueryType, providers: &[&str]) -> Self {
        self.config.routing.chains.insert(
            query_type.to_string(),
            providers.iter().map(|p| p.to_string()).collect(),
        );
        self
    }

    pub fn cache_path(&self) -> PathBuf {
        self.dir.path().join("cache.db")
    }

    pub fn dir(&self) -> &std::path::Path {
        self.dir.path()
    }
}
