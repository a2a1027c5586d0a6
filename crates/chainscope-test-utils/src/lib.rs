// SPDX-FileCopyrightText: 2026 Chainscope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Chainscope integration tests.
//!
//! # Components
//!
//! - [`ScriptedProvider`] - provider adapter replaying queued outcomes
//! - [`TestEnv`] - temp cache directory and fast-retry configuration

pub mod harness;
pub mod scripted_provider;

pub use harness::TestEnv;
pub use scripted_provider::ScriptedProvider;
