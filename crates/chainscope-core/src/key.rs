// SPDX-FileCopyrightText: 2026 Chainscope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic cache keys.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{QueryRequest, QueryType};

/// Canonical identifier for a request: `"<query_type>:<sorted params>"`.
///
/// Parameters are rendered as a JSON-style object with keys in sorted order,
/// so two requests built with the same parameters in a different insertion
/// order produce the same key. Order inside list values is kept.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CacheKey {
    query_type: QueryType,
    canonical: String,
}

impl CacheKey {
    pub fn for_request(request: &QueryRequest) -> Self {
        let mut out = String::with_capacity(64);
        out.push_str(&request.query_type().to_string());
        out.push(':');
        out.push('{');
        for (i, (name, value)) in request.parameters().iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            out.push_str(&format!("{name:?}"));
            out.push(':');
            value.write_canonical(&mut out);
        }
        out.push('}');
        Self {
            query_type: request.query_type(),
            canonical: out,
        }
    }

    /// Rebuilds a key from its stored parts (e.g. a cache row).
    pub fn from_parts(query_type: QueryType, canonical: impl Into<String>) -> Self {
        Self {
            query_type,
            canonical: canonical.into(),
        }
    }

    pub fn query_type(&self) -> QueryType {
        self.query_type
    }

    pub fn as_str(&self) -> &str {
        &self.canonical
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}
