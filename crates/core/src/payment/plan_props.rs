//! Property tests for the payment plan state machine.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::plan::{CustomerType, open_plan, record_payment};

fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000).prop_map(|n| Decimal::new(n, 2))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Balances along any payment sequence are non-increasing and the
    /// cumulative paid amount plus the balance always equals the total.
    #[test]
    fn prop_balance_trajectory_non_increasing(
        total in amount_strategy(),
        fractions in prop::collection::vec(1u32..100, 1..8),
    ) {
        let mut state = open_plan(total, total).unwrap();
        prop_assert_eq!(state.total_pay + state.balance_owed, total);

        for f in fractions {
            if state.balance_owed.is_zero() {
                break;
            }
            // Pay some fraction of the remaining balance, at least a cent.
            let amount = (state.balance_owed * Decimal::from(f) / Decimal::from(100u32))
                .round_dp(2)
                .max(Decimal::new(1, 2))
                .min(state.balance_owed);

            let next = record_payment(&state, amount).unwrap();
            prop_assert!(next.balance_owed <= state.balance_owed);
            prop_assert!(next.balance_owed >= Decimal::ZERO);
            prop_assert_eq!(next.total_pay + next.balance_owed, total);
            prop_assert_eq!(next.installment_no, state.installment_no + 1);
            state = next;
        }
    }

    /// Overpayments are always rejected and leave the state untouched.
    #[test]
    fn prop_overpayment_rejected(
        total in amount_strategy(),
        excess in amount_strategy(),
    ) {
        let state = open_plan(total, total).unwrap();
        let before = state.clone();

        let result = record_payment(&state, total + excess);
        prop_assert!(result.is_err());
        prop_assert_eq!(state, before);
    }

    /// Classification is exactly "latest balance is nonzero".
    #[test]
    fn prop_classification_matches_balance(
        total in amount_strategy(),
        financed in prop::bool::ANY,
    ) {
        let balance = if financed { total } else { Decimal::ZERO };
        let state = open_plan(total, balance).unwrap();

        let expected = if state.balance_owed.is_zero() {
            CustomerType::Customer
        } else {
            CustomerType::Debtor
        };
        prop_assert_eq!(state.customer_type(), expected);
    }

    /// Paying the full balance settles the plan in one step.
    #[test]
    fn prop_full_payment_settles(total in amount_strategy()) {
        let opened = open_plan(total, total).unwrap();
        let settled = record_payment(&opened, total).unwrap();

        prop_assert_eq!(settled.balance_owed, Decimal::ZERO);
        prop_assert_eq!(settled.total_pay, total);
        prop_assert_eq!(settled.customer_type(), CustomerType::Customer);
    }
}
