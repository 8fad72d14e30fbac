//! Property tests for batch admission.

use std::collections::HashMap;

use proptest::prelude::*;

use super::admission::{StockDelta, admit_batch, aggregate_deltas};
use super::error::StockError;

const SKUS: &[&str] = &["TV-1001", "RD-2002", "FN-3003", "AC-4004"];

fn delta_strategy() -> impl Strategy<Value = StockDelta> {
    (0..SKUS.len(), prop_oneof![-20i64..0, 1i64..20])
        .prop_map(|(i, delta)| StockDelta::new(SKUS[i], delta))
}

fn batch_strategy() -> impl Strategy<Value = Vec<StockDelta>> {
    prop::collection::vec(delta_strategy(), 1..12)
}

fn snapshot_strategy() -> impl Strategy<Value = HashMap<String, i64>> {
    prop::collection::vec(0i64..100, SKUS.len()).prop_map(|levels| {
        SKUS.iter()
            .map(|s| (*s).to_string())
            .zip(levels)
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Aggregation preserves the net effect per SKU.
    #[test]
    fn prop_aggregate_preserves_net_effect(batch in batch_strategy()) {
        let aggregated = aggregate_deltas(&batch).unwrap();

        for sku in SKUS {
            let raw: i64 = batch.iter().filter(|d| d.sku == *sku).map(|d| d.delta).sum();
            let agg: i64 = aggregated
                .iter()
                .filter(|d| d.sku == *sku)
                .map(|d| d.delta)
                .sum();
            prop_assert_eq!(raw, agg);
        }
    }

    /// Each SKU appears at most once after aggregation.
    #[test]
    fn prop_aggregate_dedupes_skus(batch in batch_strategy()) {
        let aggregated = aggregate_deltas(&batch).unwrap();
        let mut skus: Vec<&str> = aggregated.iter().map(|d| d.sku.as_str()).collect();
        skus.sort_unstable();
        let before = skus.len();
        skus.dedup();
        prop_assert_eq!(before, skus.len());
    }

    /// Admission is order-independent: any permutation of the batch admits
    /// or rejects identically (modulo which violation is reported first).
    #[test]
    fn prop_admission_is_order_independent(
        batch in batch_strategy(),
        snap in snapshot_strategy(),
    ) {
        let forward = admit_batch(&snap, &batch);
        let reversed: Vec<StockDelta> = batch.iter().rev().cloned().collect();
        let backward = admit_batch(&snap, &reversed);

        prop_assert_eq!(forward.is_ok(), backward.is_ok());
    }

    /// An admitted batch never drives any snapshot quantity negative.
    #[test]
    fn prop_admitted_batch_keeps_quantities_non_negative(
        batch in batch_strategy(),
        snap in snapshot_strategy(),
    ) {
        if let Ok(admitted) = admit_batch(&snap, &batch) {
            for d in &admitted {
                prop_assert!(snap[&d.sku] + d.delta >= 0);
            }
        }
    }

    /// A rejection reports a real violation: either an unknown SKU or a
    /// genuine overdraw of the net effect.
    #[test]
    fn prop_rejection_is_genuine(
        batch in batch_strategy(),
        snap in snapshot_strategy(),
    ) {
        if let Err(StockError::InsufficientStock { sku, on_hand, requested }) =
            admit_batch(&snap, &batch)
        {
            let net: i64 = batch.iter().filter(|d| d.sku == sku).map(|d| d.delta).sum();
            prop_assert_eq!(requested, -net);
            prop_assert_eq!(on_hand, snap[&sku]);
            prop_assert!(on_hand + net < 0);
        }
    }
}
