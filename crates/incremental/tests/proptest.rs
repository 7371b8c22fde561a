//! Property-based tests for cascade-incremental using proptest.

use cascade_incremental::{
    flat_map_incremental, map_incremental, Delta, DeltaBatch, DeltaBatchExt, Multiplicity, Transition,
};
use proptest::prelude::*;
use std::collections::HashMap;

/// Insert/delete sequences that never remove an absent contributor.
fn balanced_edits() -> impl Strategy<Value = Vec<Delta<u8>>> {
    prop::collection::vec((any::<bool>(), 0u8..16), 0..120).prop_map(|raw| {
        let mut live: HashMap<u8, usize> = HashMap::new();
        let mut edits = Vec::new();
        for (insert, x) in raw {
            let count = live.entry(x).or_insert(0);
            if insert || *count == 0 {
                *count += 1;
                edits.push(Delta::insert(x));
            } else {
                *count -= 1;
                edits.push(Delta::delete(x));
            }
        }
        edits
    })
}

proptest! {
    /// Test that presence follows a naive per-element counter.
    #[test]
    fn multiplicity_matches_naive_counts(edits in balanced_edits()) {
        let mut counts = Multiplicity::new();
        let mut naive: HashMap<u8, i64> = HashMap::new();

        for delta in &edits {
            let before = naive.get(&delta.data).copied().unwrap_or(0);
            let after = before + i64::from(delta.diff);
            naive.insert(delta.data, after);

            let expected = match (before, after) {
                (0, a) if a > 0 => Transition::Appeared,
                (b, 0) if b > 0 => Transition::Vanished,
                _ => Transition::Unchanged,
            };
            prop_assert_eq!(counts.apply(delta.data, delta.diff), expected);
            prop_assert_eq!(counts.count(&delta.data) as i64, after);
        }

        let present = naive.values().filter(|c| **c > 0).count();
        prop_assert_eq!(counts.len(), present);
    }

    /// Test that batch transitions alternate per element.
    #[test]
    fn apply_batch_transitions_alternate(edits in balanced_edits()) {
        let mut counts = Multiplicity::new();
        let transitions = counts.apply_batch(edits);

        let mut present: HashMap<u8, bool> = HashMap::new();
        for delta in &transitions {
            let was = present.get(&delta.data).copied().unwrap_or(false);
            prop_assert_eq!(was, delta.is_delete());
            present.insert(delta.data, delta.is_insert());
        }
        for (data, is_present) in present {
            prop_assert_eq!(counts.contains(&data), is_present);
        }
    }

    /// Test that consolidation keeps every element's net weight.
    #[test]
    fn consolidate_preserves_weights(raw in prop::collection::vec((0u8..10, -3i32..4), 0..60)) {
        let batch: DeltaBatch<u8> = raw.iter().map(|(x, w)| Delta::new(*x, *w)).collect();
        let net = batch.net_count();
        let consolidated = batch.clone().consolidate();

        prop_assert_eq!(consolidated.net_count(), net);
        for delta in &consolidated {
            prop_assert!(!delta.is_noop());
            let expected: i32 = batch.iter().filter(|d| d.data == delta.data).map(|d| d.diff).sum();
            prop_assert_eq!(delta.diff, expected);
        }
        let distinct: std::collections::HashSet<u8> = consolidated.iter().map(|d| d.data).collect();
        prop_assert_eq!(distinct.len(), consolidated.len());
    }

    /// Test that the incremental operators keep each delta's weight.
    #[test]
    fn operators_preserve_weights(raw in prop::collection::vec((0u8..50, -2i32..3), 0..40)) {
        let batch: DeltaBatch<u8> = raw.iter().map(|(x, w)| Delta::new(*x, *w)).collect();

        let mapped = map_incremental(&batch, |x| u16::from(*x) * 2);
        prop_assert_eq!(mapped.net_count(), batch.net_count());

        let expanded = flat_map_incremental(&batch, |x| [*x, x / 2]);
        prop_assert_eq!(expanded.net_count(), batch.net_count() * 2);
        prop_assert_eq!(expanded.len(), batch.len() * 2);
    }
}
