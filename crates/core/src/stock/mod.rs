//! Signed stock deltas and batch admission checks.
//!
//! Product quantities are only ever mutated through signed deltas. The
//! admission check validates a whole batch against a single snapshot of
//! on-hand quantities before any delta is applied, so a batch that would
//! drive any product negative is rejected as a unit.

pub mod admission;
pub mod error;

#[cfg(test)]
mod admission_props;

pub use admission::{StockDelta, admit_batch, aggregate_deltas};
pub use error::StockError;
