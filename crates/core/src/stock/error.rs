//! Stock error types.

use thiserror::Error;

/// Errors that can occur when admitting stock deltas.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StockError {
    /// No product with this SKU exists in the snapshot scope.
    #[error("Product not found: {0}")]
    NotFound(String),

    /// Applying the deltas would drive the quantity negative.
    #[error("Insufficient stock for {sku}: on hand {on_hand}, requested {requested}")]
    InsufficientStock {
        /// The product SKU.
        sku: String,
        /// Quantity on hand at the snapshot.
        on_hand: i64,
        /// Net outgoing quantity requested by the batch.
        requested: i64,
    },

    /// The batch contains no deltas.
    #[error("Stock batch must contain at least one delta")]
    EmptyBatch,

    /// A delta of zero is meaningless and almost certainly a caller bug.
    #[error("Stock delta for {0} must be non-zero")]
    ZeroDelta(String),
}

impl StockError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "PRODUCT_NOT_FOUND",
            Self::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            Self::EmptyBatch => "EMPTY_BATCH",
            Self::ZeroDelta(_) => "ZERO_DELTA",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::InsufficientStock { .. } => 422,
            Self::EmptyBatch | Self::ZeroDelta(_) => 400,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            StockError::NotFound("TV-1001".into()).error_code(),
            "PRODUCT_NOT_FOUND"
        );
        assert_eq!(
            StockError::InsufficientStock {
                sku: "TV-1001".into(),
                on_hand: 2,
                requested: 3,
            }
            .error_code(),
            "INSUFFICIENT_STOCK"
        );
        assert_eq!(StockError::EmptyBatch.error_code(), "EMPTY_BATCH");
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(StockError::NotFound("x".into()).http_status_code(), 404);
        assert_eq!(
            StockError::InsufficientStock {
                sku: "x".into(),
                on_hand: 0,
                requested: 1,
            }
            .http_status_code(),
            422
        );
        assert_eq!(StockError::EmptyBatch.http_status_code(), 400);
    }

    #[test]
    fn test_error_display() {
        let err = StockError::InsufficientStock {
            sku: "TV-1001".into(),
            on_hand: 2,
            requested: 3,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for TV-1001: on hand 2, requested 3"
        );
    }
}
