//! Pure payment plan transitions.
//!
//! Each function takes the latest installment's state and returns the next
//! one; persistence (appending the payment row, bumping the installment
//! count) is the database layer's job.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::PaymentError;

/// Customer classification, owned by the payment plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomerType {
    /// No outstanding balance on the latest installment.
    Customer,
    /// The latest installment carries a nonzero balance owed.
    Debtor,
}

impl CustomerType {
    /// Classifies strictly by the latest payment's balance owed.
    #[must_use]
    pub fn from_balance(balance_owed: Decimal) -> Self {
        if balance_owed.is_zero() {
            Self::Customer
        } else {
            Self::Debtor
        }
    }
}

/// Plan lifecycle state, derived from the latest balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanState {
    /// Balance owed is positive.
    Open,
    /// Balance owed is zero.
    Settled,
}

impl PlanState {
    /// Derives the state implied by an outstanding balance.
    #[must_use]
    pub fn from_balance(balance_owed: Decimal) -> Self {
        if balance_owed.is_zero() {
            Self::Settled
        } else {
            Self::Open
        }
    }
}

/// The money fields of one installment.
///
/// The latest installment's `balance_owed` is the plan's current balance;
/// there is no separately stored balance anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentState {
    /// The invoiced total at the time of this installment.
    pub total_amount: Decimal,
    /// Remaining balance after this installment.
    pub balance_owed: Decimal,
    /// This installment's amount.
    pub balance_paid: Decimal,
    /// Cumulative amount paid to date.
    pub total_pay: Decimal,
    /// 1-based installment position.
    pub installment_no: i32,
}

impl PaymentState {
    /// The plan's current balance: always read from the latest installment.
    #[must_use]
    pub const fn current_balance(&self) -> Decimal {
        self.balance_owed
    }

    /// The customer classification implied by this installment.
    #[must_use]
    pub fn customer_type(&self) -> CustomerType {
        CustomerType::from_balance(self.balance_owed)
    }

    /// The plan state implied by this installment.
    #[must_use]
    pub fn plan_state(&self) -> PlanState {
        PlanState::from_balance(self.balance_owed)
    }
}

/// Result of a price correction against a settled plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceCorrection {
    /// The amended latest installment (same installment number).
    pub amended: PaymentState,
    /// The difference between new and old total price.
    pub delta: Decimal,
}

/// Opens a plan: the first installment records the invoiced total and
/// whatever part of it is financed.
///
/// # Errors
///
/// Rejects non-positive totals, negative balances, and balances exceeding
/// the total.
pub fn open_plan(total_amount: Decimal, balance_owed: Decimal) -> Result<PaymentState, PaymentError> {
    if total_amount <= Decimal::ZERO {
        return Err(PaymentError::NonPositiveAmount);
    }
    if balance_owed.is_sign_negative() {
        return Err(PaymentError::NonPositiveAmount);
    }
    if balance_owed > total_amount {
        return Err(PaymentError::BalanceExceedsTotal {
            total: total_amount,
            balance: balance_owed,
        });
    }

    let paid_now = total_amount - balance_owed;
    Ok(PaymentState {
        total_amount,
        balance_owed,
        balance_paid: paid_now,
        total_pay: paid_now,
        installment_no: 1,
    })
}

/// Applies a payment to the latest installment, producing the next one.
///
/// # Errors
///
/// `NoOutstandingBalance` when the plan is settled, `NonPositiveAmount`
/// for zero/negative payments, `Overpayment` when the amount exceeds the
/// balance owed.
pub fn record_payment(latest: &PaymentState, amount: Decimal) -> Result<PaymentState, PaymentError> {
    if latest.balance_owed.is_zero() {
        return Err(PaymentError::NoOutstandingBalance);
    }
    if amount <= Decimal::ZERO {
        return Err(PaymentError::NonPositiveAmount);
    }
    if amount > latest.balance_owed {
        return Err(PaymentError::Overpayment {
            balance: latest.balance_owed,
            amount,
        });
    }

    Ok(PaymentState {
        total_amount: latest.total_amount,
        balance_owed: latest.balance_owed - amount,
        balance_paid: amount,
        total_pay: latest.total_pay + amount,
        installment_no: latest.installment_no + 1,
    })
}

/// Applies a price correction to the latest installment of a settled plan.
///
/// The installment is amended in place (no new installment): its total
/// moves by `new_total_price - old_total_price`, and an increase reopens
/// the plan with the difference owed. A decrease leaves the plan settled;
/// no refund record is produced.
///
/// # Errors
///
/// `OutstandingBalance` when the plan is not settled,
/// `NonPositiveAmount` for a non-positive new total.
pub fn correct_price(
    latest: &PaymentState,
    old_total_price: Decimal,
    new_total_price: Decimal,
) -> Result<PriceCorrection, PaymentError> {
    if !latest.balance_owed.is_zero() {
        return Err(PaymentError::OutstandingBalance(latest.balance_owed));
    }
    if new_total_price <= Decimal::ZERO {
        return Err(PaymentError::NonPositiveAmount);
    }

    let delta = new_total_price - old_total_price;
    let reopened = delta.max(Decimal::ZERO);

    Ok(PriceCorrection {
        amended: PaymentState {
            total_amount: latest.total_amount + delta,
            balance_owed: reopened,
            balance_paid: latest.balance_paid,
            total_pay: latest.total_pay,
            installment_no: latest.installment_no,
        },
        delta,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_open_fully_paid_plan() {
        let state = open_plan(dec!(1500), dec!(0)).unwrap();
        assert_eq!(state.balance_owed, dec!(0));
        assert_eq!(state.balance_paid, dec!(1500));
        assert_eq!(state.total_pay, dec!(1500));
        assert_eq!(state.installment_no, 1);
        assert_eq!(state.customer_type(), CustomerType::Customer);
        assert_eq!(state.plan_state(), PlanState::Settled);
    }

    #[test]
    fn test_open_financed_plan() {
        let state = open_plan(dec!(1500), dec!(600)).unwrap();
        assert_eq!(state.balance_owed, dec!(600));
        assert_eq!(state.balance_paid, dec!(900));
        assert_eq!(state.customer_type(), CustomerType::Debtor);
        assert_eq!(state.plan_state(), PlanState::Open);
    }

    #[test]
    fn test_open_rejects_balance_above_total() {
        assert_eq!(
            open_plan(dec!(100), dec!(150)),
            Err(PaymentError::BalanceExceedsTotal {
                total: dec!(100),
                balance: dec!(150),
            })
        );
    }

    #[test]
    fn test_open_rejects_non_positive_total() {
        assert_eq!(open_plan(dec!(0), dec!(0)), Err(PaymentError::NonPositiveAmount));
        assert_eq!(
            open_plan(dec!(-10), dec!(0)),
            Err(PaymentError::NonPositiveAmount)
        );
    }

    #[test]
    fn test_record_payment_reduces_balance() {
        let opened = open_plan(dec!(1000), dec!(400)).unwrap();
        let next = record_payment(&opened, dec!(150)).unwrap();

        assert_eq!(next.balance_owed, dec!(250));
        assert_eq!(next.balance_paid, dec!(150));
        assert_eq!(next.total_pay, dec!(750));
        assert_eq!(next.installment_no, 2);
        assert_eq!(next.customer_type(), CustomerType::Debtor);
    }

    #[test]
    fn test_record_payment_settles_plan() {
        let opened = open_plan(dec!(1000), dec!(100)).unwrap();
        let next = record_payment(&opened, dec!(100)).unwrap();

        assert_eq!(next.balance_owed, dec!(0));
        assert_eq!(next.total_pay, dec!(1000));
        assert_eq!(next.customer_type(), CustomerType::Customer);
        assert_eq!(next.plan_state(), PlanState::Settled);
    }

    #[test]
    fn test_record_payment_rejects_overpayment() {
        let opened = open_plan(dec!(1000), dec!(100)).unwrap();
        assert_eq!(
            record_payment(&opened, dec!(150)),
            Err(PaymentError::Overpayment {
                balance: dec!(100),
                amount: dec!(150),
            })
        );
    }

    #[test]
    fn test_record_payment_rejects_settled_plan() {
        let settled = open_plan(dec!(1000), dec!(0)).unwrap();
        assert_eq!(
            record_payment(&settled, dec!(1)),
            Err(PaymentError::NoOutstandingBalance)
        );
    }

    #[test]
    fn test_record_payment_rejects_non_positive_amount() {
        let opened = open_plan(dec!(1000), dec!(100)).unwrap();
        assert_eq!(
            record_payment(&opened, dec!(0)),
            Err(PaymentError::NonPositiveAmount)
        );
    }

    #[test]
    fn test_correct_price_increase_reopens() {
        let settled = open_plan(dec!(1000), dec!(0)).unwrap();
        let correction = correct_price(&settled, dec!(1000), dec!(1200)).unwrap();

        assert_eq!(correction.delta, dec!(200));
        assert_eq!(correction.amended.total_amount, dec!(1200));
        assert_eq!(correction.amended.balance_owed, dec!(200));
        assert_eq!(correction.amended.installment_no, 1);
        assert_eq!(correction.amended.customer_type(), CustomerType::Debtor);
    }

    #[test]
    fn test_correct_price_decrease_stays_settled() {
        let settled = open_plan(dec!(1000), dec!(0)).unwrap();
        let correction = correct_price(&settled, dec!(1000), dec!(800)).unwrap();

        assert_eq!(correction.delta, dec!(-200));
        assert_eq!(correction.amended.total_amount, dec!(800));
        assert_eq!(correction.amended.balance_owed, dec!(0));
        assert_eq!(correction.amended.customer_type(), CustomerType::Customer);
    }

    #[test]
    fn test_correct_price_blocked_by_outstanding_balance() {
        let open = open_plan(dec!(1000), dec!(300)).unwrap();
        assert_eq!(
            correct_price(&open, dec!(1000), dec!(900)),
            Err(PaymentError::OutstandingBalance(dec!(300)))
        );
    }

    #[test]
    fn test_current_balance_reads_latest() {
        let opened = open_plan(dec!(1000), dec!(400)).unwrap();
        assert_eq!(opened.current_balance(), dec!(400));
        let next = record_payment(&opened, dec!(400)).unwrap();
        assert_eq!(next.current_balance(), dec!(0));
    }
}
