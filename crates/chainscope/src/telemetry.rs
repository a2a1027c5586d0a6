// SPDX-FileCopyrightText: 2026 Chainscope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tracing subscriber setup for binaries embedding the orchestrator.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset.
pub fn default_filter(log_level: &str) -> String {
    format!("chainscope={log_level},warn")
}

/// Installs a fmt subscriber filtered by `RUST_LOG`, falling back to
/// `chainscope=<log_level>,warn`.
///
/// Returns `false` if a global subscriber was already installed.
pub fn init_tracing(log_level: &str) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(log_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .try_init()
        .is_ok()
}
