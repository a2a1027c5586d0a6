// SPDX-FileCopyrightText: 2026 Chainscope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chain ordering: complexity band bias followed by stats-driven re-ranking.

use chainscope_core::{CostClass, ProviderRecord, ProviderStats};

use crate::classifier::ComplexityBand;

/// Reorders `chain` for a complexity band.
///
/// - light: cheapest cost class first;
/// - moderate: moderate-cost providers first;
/// - heavy: `heavyweight` first, if it is in the chain.
///
/// Every reordering is stable, so providers of equal preference keep their
/// configured order.
pub fn band_order(
    chain: &mut [&ProviderRecord],
    band: ComplexityBand,
    heavyweight: Option<&str>,
) {
    match band {
        ComplexityBand::Light => chain.sort_by_key(|r| r.cost_class),
        ComplexityBand::Moderate => chain.sort_by_key(|r| r.cost_class != CostClass::Moderate),
        ComplexityBand::Heavy => {
            if let Some(heavy) = heavyweight {
                chain.sort_by_key(|r| r.provider_id != heavy);
            }
        }
    }
}

/// Re-ranking thresholds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RerankPolicy {
    pub min_samples: u64,
    pub margin: f64,
}

impl RerankPolicy {
    /// Whether `lower` has earned a place ahead of `higher`.
    pub fn promotes(&self, lower: &ProviderStats, higher: &ProviderStats) -> bool {
        lower.total_queries >= self.min_samples
            && higher.total_queries >= self.min_samples
            && lower.success_rate() - higher.success_rate() > self.margin
    }

    /// Moves providers ahead of their predecessors when their observed
    /// success rate is better by more than `margin`.
    ///
    /// Runs adjacent-swap passes until nothing moves. Providers without
    /// stats, or with too few samples, never move.
    pub fn rerank<T>(&self, chain: &mut [T], stats: impl Fn(&T) -> Option<ProviderStats>) {
        let snapshots: Vec<Option<ProviderStats>> = chain.iter().map(&stats).collect();
        let mut order: Vec<usize> = (0..chain.len()).collect();

        for _ in 0..order.len() {
            let mut moved = false;
            for i in 1..order.len() {
                let (higher, lower) = (&snapshots[order[i - 1]], &snapshots[order[i]]);
                if let (Some(h), Some(l)) = (higher, lower) {
                    if self.promotes(l, h) {
                        order.swap(i - 1, i);
                        moved = true;
                    }
                }
            }
            if !moved {
                break;
            }
        }

        apply_permutation(chain, &order);
    }
}

/// Rearranges `items` so that position `i` holds the element previously at `order[i]`.
fn apply_permutation<T>(items: &mut [T], order: &[usize]) {
    let mut placed = vec![false; items.len()];
    for start in 0..items.len() {
        if placed[start] {
            continue;
        }
        let mut current = start;
        loop {
            placed[current] = true;
            let source = order[current];
            if source == start {
                break;
            }
            items.swap(current, source);
            current = source;
        }
    }
}
