//! Batch admission for signed stock deltas.
//!
//! A batch is admitted or rejected as a whole: the cumulative effect of all
//! deltas per SKU is evaluated against one snapshot of on-hand quantities,
//! never line-by-line in submission order. Two lines of `-3` and `+1` on a
//! product holding 2 units therefore admit (net `-2`), while a single `-3`
//! line does not.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use super::error::StockError;

/// A signed quantity delta against one product.
///
/// Negative for outgoing stock (sale, swap-out), positive for incoming
/// (swap-in, buyback, restock).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockDelta {
    /// The product SKU within the (tenant, company) scope.
    pub sku: String,
    /// The signed quantity change.
    pub delta: i64,
}

impl StockDelta {
    /// Creates a new delta.
    #[must_use]
    pub fn new(sku: impl Into<String>, delta: i64) -> Self {
        Self {
            sku: sku.into(),
            delta,
        }
    }
}

/// Aggregates a batch into one net delta per SKU.
///
/// SKUs keep the order of their first appearance so callers get a
/// deterministic application order.
///
/// # Errors
///
/// Returns `StockError::EmptyBatch` for an empty batch and
/// `StockError::ZeroDelta` if any line carries a zero delta.
pub fn aggregate_deltas(deltas: &[StockDelta]) -> Result<Vec<StockDelta>, StockError> {
    if deltas.is_empty() {
        return Err(StockError::EmptyBatch);
    }

    let mut order: Vec<String> = Vec::new();
    let mut net: HashMap<String, i64> = HashMap::new();

    for d in deltas {
        if d.delta == 0 {
            return Err(StockError::ZeroDelta(d.sku.clone()));
        }
        match net.entry(d.sku.clone()) {
            Entry::Vacant(entry) => {
                order.push(d.sku.clone());
                entry.insert(d.delta);
            }
            Entry::Occupied(mut entry) => *entry.get_mut() += d.delta,
        }
    }

    Ok(order
        .into_iter()
        .map(|sku| {
            let delta = net[&sku];
            StockDelta { sku, delta }
        })
        .collect())
}

/// Validates a batch of deltas against a snapshot of on-hand quantities.
///
/// The snapshot maps SKU to on-hand quantity as seen at the start of the
/// enclosing unit of work. On success the aggregated net deltas are
/// returned in first-appearance order, ready to apply.
///
/// Net-zero aggregates are kept: they still pin the product row and prove
/// the SKU exists.
///
/// # Errors
///
/// Returns the first violation found: `EmptyBatch`, `ZeroDelta`,
/// `NotFound` for a SKU missing from the snapshot, or `InsufficientStock`
/// when the net effect would drive a quantity negative.
pub fn admit_batch(
    snapshot: &HashMap<String, i64>,
    deltas: &[StockDelta],
) -> Result<Vec<StockDelta>, StockError> {
    let aggregated = aggregate_deltas(deltas)?;

    for d in &aggregated {
        let on_hand = *snapshot
            .get(&d.sku)
            .ok_or_else(|| StockError::NotFound(d.sku.clone()))?;

        if on_hand + d.delta < 0 {
            return Err(StockError::InsufficientStock {
                sku: d.sku.clone(),
                on_hand,
                requested: -d.delta,
            });
        }
    }

    Ok(aggregated)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(levels: &[(&str, i64)]) -> HashMap<String, i64> {
        levels
            .iter()
            .map(|(sku, q)| ((*sku).to_string(), *q))
            .collect()
    }

    #[test]
    fn test_aggregate_sums_per_sku() {
        let deltas = vec![
            StockDelta::new("TV-1001", -3),
            StockDelta::new("RD-2002", -1),
            StockDelta::new("TV-1001", 1),
        ];
        let aggregated = aggregate_deltas(&deltas).unwrap();
        assert_eq!(
            aggregated,
            vec![StockDelta::new("TV-1001", -2), StockDelta::new("RD-2002", -1)]
        );
    }

    #[test]
    fn test_aggregate_rejects_empty_batch() {
        assert_eq!(aggregate_deltas(&[]), Err(StockError::EmptyBatch));
    }

    #[test]
    fn test_aggregate_rejects_zero_delta() {
        let deltas = vec![StockDelta::new("TV-1001", 0)];
        assert_eq!(
            aggregate_deltas(&deltas),
            Err(StockError::ZeroDelta("TV-1001".into()))
        );
    }

    #[test]
    fn test_admit_within_stock() {
        let snap = snapshot(&[("TV-1001", 10)]);
        let admitted = admit_batch(&snap, &[StockDelta::new("TV-1001", -3)]).unwrap();
        assert_eq!(admitted, vec![StockDelta::new("TV-1001", -3)]);
    }

    #[test]
    fn test_admit_rejects_overdraw() {
        let snap = snapshot(&[("TV-1001", 2)]);
        let result = admit_batch(&snap, &[StockDelta::new("TV-1001", -3)]);
        assert_eq!(
            result,
            Err(StockError::InsufficientStock {
                sku: "TV-1001".into(),
                on_hand: 2,
                requested: 3,
            })
        );
    }

    #[test]
    fn test_admit_net_effect_not_line_order() {
        // A line-by-line check in submission order would reject the -3
        // before seeing the +2; the batch admission nets them first.
        let snap = snapshot(&[("TV-1001", 2)]);
        let deltas = vec![StockDelta::new("TV-1001", -3), StockDelta::new("TV-1001", 2)];
        let admitted = admit_batch(&snap, &deltas).unwrap();
        assert_eq!(admitted, vec![StockDelta::new("TV-1001", -1)]);
    }

    #[test]
    fn test_admit_unknown_sku() {
        let snap = snapshot(&[("TV-1001", 10)]);
        let result = admit_batch(&snap, &[StockDelta::new("RD-2002", -1)]);
        assert_eq!(result, Err(StockError::NotFound("RD-2002".into())));
    }

    #[test]
    fn test_admit_mixed_batch() {
        let snap = snapshot(&[("TV-1001", 5), ("RD-2002", 0)]);
        let deltas = vec![
            StockDelta::new("TV-1001", -5),
            StockDelta::new("RD-2002", 4),
        ];
        let admitted = admit_batch(&snap, &deltas).unwrap();
        assert_eq!(admitted.len(), 2);
    }
}
