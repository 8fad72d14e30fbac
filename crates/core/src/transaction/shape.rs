//! Transaction kind rules and line totals.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::TransactionError;

/// Transaction kind classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// A single-item sale.
    Sale,
    /// A multi-line sale recorded as one transaction.
    BulkSale,
    /// One outgoing product exchanged for one or more incoming products.
    Swap,
    /// Stock bought back from a customer.
    Buyback,
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sale => write!(f, "sale"),
            Self::BulkSale => write!(f, "bulk_sale"),
            Self::Swap => write!(f, "swap"),
            Self::Buyback => write!(f, "buyback"),
        }
    }
}

/// Direction of a transaction item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemDirection {
    /// Stock decreases, revenue comes in.
    Debit,
    /// Stock increases, refund or buyback money goes out.
    Credit,
}

/// Validates that the item directions match the declared kind.
///
/// - `Sale`: exactly one DEBIT item
/// - `Buyback`: exactly one CREDIT item
/// - `BulkSale`: one or more items, all DEBIT
/// - `Swap`: exactly one DEBIT item and one or more CREDIT items
///
/// # Errors
///
/// Returns `TransactionError::InvalidShape` naming the violated rule.
pub fn validate_shape(
    kind: TransactionKind,
    directions: &[ItemDirection],
) -> Result<(), TransactionError> {
    let debits = directions
        .iter()
        .filter(|d| **d == ItemDirection::Debit)
        .count();
    let credits = directions.len() - debits;

    let ok = match kind {
        TransactionKind::Sale => debits == 1 && credits == 0,
        TransactionKind::Buyback => debits == 0 && credits == 1,
        TransactionKind::BulkSale => debits >= 1 && credits == 0,
        TransactionKind::Swap => debits == 1 && credits >= 1,
    };

    if ok {
        return Ok(());
    }

    let reason = match kind {
        TransactionKind::Sale => "exactly one debit item",
        TransactionKind::Buyback => "exactly one credit item",
        TransactionKind::BulkSale => "at least one item, all debit",
        TransactionKind::Swap => "exactly one debit item and at least one credit item",
    };

    Err(TransactionError::InvalidShape { kind, reason })
}

/// Computes a line total, validating quantity and unit price.
///
/// # Errors
///
/// Returns `NonPositiveQuantity` or `NegativePrice` on invalid inputs.
pub fn line_total(quantity: i64, price_per_unit: Decimal) -> Result<Decimal, TransactionError> {
    if quantity <= 0 {
        return Err(TransactionError::NonPositiveQuantity);
    }
    if price_per_unit.is_sign_negative() {
        return Err(TransactionError::NegativePrice);
    }

    Ok(Decimal::from(quantity) * price_per_unit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    use ItemDirection::{Credit, Debit};

    #[rstest]
    #[case(TransactionKind::Sale, vec![Debit], true)]
    #[case(TransactionKind::Sale, vec![Credit], false)]
    #[case(TransactionKind::Sale, vec![Debit, Debit], false)]
    #[case(TransactionKind::Sale, vec![], false)]
    #[case(TransactionKind::Buyback, vec![Credit], true)]
    #[case(TransactionKind::Buyback, vec![Debit], false)]
    #[case(TransactionKind::BulkSale, vec![Debit], true)]
    #[case(TransactionKind::BulkSale, vec![Debit, Debit, Debit], true)]
    #[case(TransactionKind::BulkSale, vec![Debit, Credit], false)]
    #[case(TransactionKind::BulkSale, vec![], false)]
    #[case(TransactionKind::Swap, vec![Debit, Credit], true)]
    #[case(TransactionKind::Swap, vec![Debit, Credit, Credit], true)]
    #[case(TransactionKind::Swap, vec![Debit], false)]
    #[case(TransactionKind::Swap, vec![Credit, Credit], false)]
    #[case(TransactionKind::Swap, vec![Debit, Debit, Credit], false)]
    fn test_shape_rules(
        #[case] kind: TransactionKind,
        #[case] directions: Vec<ItemDirection>,
        #[case] expected_ok: bool,
    ) {
        assert_eq!(validate_shape(kind, &directions).is_ok(), expected_ok);
    }

    #[test]
    fn test_line_total() {
        assert_eq!(line_total(3, dec!(500)).unwrap(), dec!(1500));
        assert_eq!(line_total(1, dec!(0)).unwrap(), dec!(0));
    }

    #[test]
    fn test_line_total_rejects_bad_inputs() {
        assert_eq!(
            line_total(0, dec!(500)),
            Err(TransactionError::NonPositiveQuantity)
        );
        assert_eq!(
            line_total(-2, dec!(500)),
            Err(TransactionError::NonPositiveQuantity)
        );
        assert_eq!(line_total(2, dec!(-1)), Err(TransactionError::NegativePrice));
    }
}
