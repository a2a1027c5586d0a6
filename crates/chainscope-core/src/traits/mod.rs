// SPDX-FileCopyrightText: 2026 Chainscope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter traits.

pub mod provider;

pub use provider::ProviderAdapter;
