//! Transaction kinds and item shape validation.
//!
//! The kind is a closed sum type; each variant carries its own item-shape
//! rule so call sites cannot scatter ad-hoc string checks.

pub mod error;
pub mod shape;

pub use error::TransactionError;
pub use shape::{ItemDirection, TransactionKind, line_total, validate_shape};
