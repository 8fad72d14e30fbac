//! Invoice status transitions.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Invoice status.
///
/// `Draft` invoices become `Overdue` once past their payment date; paid
/// status tracks the owning plan's balance: `Paid` iff the latest payment's
/// balance owed is zero, `PartPaid` otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    /// Invoice issued, no payment recorded against it yet.
    Draft,
    /// Partially paid: the latest balance owed is positive.
    PartPaid,
    /// Fully paid: the latest balance owed is zero.
    Paid,
    /// Draft invoice past its payment date.
    Overdue,
}

impl InvoiceStatus {
    /// Derives the status implied by an outstanding balance.
    #[must_use]
    pub fn from_balance(balance_owed: Decimal) -> Self {
        if balance_owed.is_zero() {
            Self::Paid
        } else {
            Self::PartPaid
        }
    }

    /// Returns true if the overdue sweep should mark this invoice.
    ///
    /// Only `Draft` invoices are swept; a part-paid invoice keeps its
    /// status until it is settled.
    #[must_use]
    pub fn should_mark_overdue(self, payment_date: NaiveDate, today: NaiveDate) -> bool {
        self == Self::Draft && payment_date < today
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_status_from_balance() {
        assert_eq!(InvoiceStatus::from_balance(dec!(0)), InvoiceStatus::Paid);
        assert_eq!(
            InvoiceStatus::from_balance(dec!(250)),
            InvoiceStatus::PartPaid
        );
    }

    #[test]
    fn test_overdue_sweep_only_drafts() {
        let due = date(2026, 7, 1);
        let today = date(2026, 7, 15);

        assert!(InvoiceStatus::Draft.should_mark_overdue(due, today));
        assert!(!InvoiceStatus::PartPaid.should_mark_overdue(due, today));
        assert!(!InvoiceStatus::Paid.should_mark_overdue(due, today));
        assert!(!InvoiceStatus::Overdue.should_mark_overdue(due, today));
    }

    #[test]
    fn test_overdue_sweep_respects_due_date() {
        let due = date(2026, 7, 20);
        let today = date(2026, 7, 15);
        assert!(!InvoiceStatus::Draft.should_mark_overdue(due, today));
        assert!(!InvoiceStatus::Draft.should_mark_overdue(today, today));
    }
}
