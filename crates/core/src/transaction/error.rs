//! Transaction validation error types.

use thiserror::Error;

use super::shape::TransactionKind;

/// Errors that can occur while validating a transaction's items.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransactionError {
    /// The item composition does not match the declared kind.
    #[error("Invalid item shape for {kind}: {reason}")]
    InvalidShape {
        /// The declared transaction kind.
        kind: TransactionKind,
        /// What the kind requires.
        reason: &'static str,
    },

    /// A required field is missing or empty.
    #[error("Missing required field: {0}")]
    MissingRequiredField(&'static str),

    /// Item quantities must be positive.
    #[error("Item quantity must be positive")]
    NonPositiveQuantity,

    /// Item prices cannot be negative.
    #[error("Item price cannot be negative")]
    NegativePrice,
}

impl TransactionError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidShape { .. } => "INVALID_TRANSACTION_SHAPE",
            Self::MissingRequiredField(_) => "MISSING_REQUIRED_FIELD",
            Self::NonPositiveQuantity => "NON_POSITIVE_QUANTITY",
            Self::NegativePrice => "NEGATIVE_PRICE",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        400
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            TransactionError::InvalidShape {
                kind: TransactionKind::Sale,
                reason: "exactly one debit item",
            }
            .error_code(),
            "INVALID_TRANSACTION_SHAPE"
        );
        assert_eq!(
            TransactionError::MissingRequiredField("sku").error_code(),
            "MISSING_REQUIRED_FIELD"
        );
    }

    #[test]
    fn test_error_display() {
        let err = TransactionError::InvalidShape {
            kind: TransactionKind::Swap,
            reason: "exactly one debit item and at least one credit item",
        };
        assert_eq!(
            err.to_string(),
            "Invalid item shape for swap: exactly one debit item and at least one credit item"
        );
    }
}
