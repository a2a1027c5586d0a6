// SPDX-FileCopyrightText: 2026 Chainscope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cache key canonicalization properties.

use chainscope_core::{ParamValue, QueryRequest, QueryType};
use proptest::prelude::*;

fn param_value() -> impl Strategy<Value = ParamValue> {
    let scalar = prop_oneof![
        any::<bool>().prop_map(ParamValue::Bool),
        any::<i64>().prop_map(ParamValue::Int),
        (-1.0e6f64..1.0e6).prop_map(ParamValue::Float),
        "[a-z0-9_\" ]{0,12}".prop_map(ParamValue::Str),
    ];
    prop_oneof![
        3 => scalar.clone(),
        1 => prop::collection::vec(scalar, 0..5).prop_map(ParamValue::List),
    ]
}

fn query_type() -> impl Strategy<Value = QueryType> {
    prop::sample::select(QueryType::ALL.to_vec())
}

proptest! {
    #[test]
    fn insertion_order_does_not_change_key(
        qt in query_type(),
        params in prop::collection::btree_map("[a-z_]{1,10}", param_value(), 0..8),
        seed in any::<u64>(),
    ) {
        let forward: Vec<_> = params.iter().collect();

        // Deterministic shuffle driven by the seed.
        let mut shuffled = forward.clone();
        let mut state = seed | 1;
        for i in (1..shuffled.len()).rev() {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            let j = (state % (i as u64 + 1)) as usize;
            shuffled.swap(i, j);
        }

        let build = |pairs: &[(&String, &ParamValue)]| {
            pairs.iter().fold(QueryRequest::new(qt), |req, (k, v)| {
                req.with_param(k.as_str(), (*v).clone())
            })
        };

        let a = build(&forward);
        let b = build(&shuffled);
        prop_assert_eq!(a.cache_key(), b.cache_key());
        let prefix = format!("{qt}:");
        prop_assert!(a.cache_key().as_str().starts_with(&prefix));
    }

    #[test]
    fn different_query_types_never_collide(
        params in prop::collection::btree_map("[a-z_]{1,10}", param_value(), 0..4),
    ) {
        let build = |qt: QueryType| {
            params.iter().fold(QueryRequest::new(qt), |req, (k, v)| {
                req.with_param(k.as_str(), v.clone())
            })
        };
        prop_assert_ne!(
            build(QueryType::TokenPrice).cache_key(),
            build(QueryType::TokenMetrics).cache_key()
        );
    }
}

#[test]
fn reversed_insertion_produces_identical_key() {
    let a = QueryRequest::new(QueryType::WalletActivity)
        .with_param("address", "0xdead")
        .with_param("chain", "ethereum")
        .with_param("limit", 50);
    let b = QueryRequest::new(QueryType::WalletActivity)
        .with_param("limit", 50)
        .with_param("chain", "ethereum")
        .with_param("address", "0xdead");
    assert_eq!(a.cache_key(), b.cache_key());
    assert_eq!(a.cache_key().to_string(), b.cache_key().to_string());
}
