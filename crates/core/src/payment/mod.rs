//! Payment plan state machine and customer classification.
//!
//! A plan moves `NO_PLAN -> OPEN (balance > 0) -> SETTLED (balance == 0)`.
//! The installment history is append-only; the latest payment's balance
//! owed IS the plan's current balance. A settled plan can reopen through a
//! price correction that raises the balance.

pub mod error;
pub mod plan;

#[cfg(test)]
mod plan_props;

pub use error::PaymentError;
pub use plan::{
    CustomerType, PaymentState, PlanState, PriceCorrection, correct_price, open_plan,
    record_payment,
};
