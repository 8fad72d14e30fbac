//! Payment plan error types.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur during payment plan transitions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaymentError {
    /// The plan is already settled; there is nothing to pay.
    #[error("Plan has no outstanding balance")]
    NoOutstandingBalance,

    /// The payment exceeds the outstanding balance.
    #[error("Overpayment: balance owed is {balance}, payment is {amount}")]
    Overpayment {
        /// The current outstanding balance.
        balance: Decimal,
        /// The attempted payment amount.
        amount: Decimal,
    },

    /// A price correction is blocked while a balance is outstanding.
    #[error("Outstanding balance of {0} blocks price correction")]
    OutstandingBalance(Decimal),

    /// Amounts must be strictly positive.
    #[error("Amount must be positive")]
    NonPositiveAmount,

    /// The initial balance owed cannot exceed the invoiced total.
    #[error("Balance owed {balance} exceeds invoiced total {total}")]
    BalanceExceedsTotal {
        /// The invoiced total.
        total: Decimal,
        /// The requested opening balance.
        balance: Decimal,
    },
}

impl PaymentError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NoOutstandingBalance => "NO_OUTSTANDING_BALANCE",
            Self::Overpayment { .. } => "OVERPAYMENT",
            Self::OutstandingBalance(_) => "OUTSTANDING_BALANCE",
            Self::NonPositiveAmount => "NON_POSITIVE_AMOUNT",
            Self::BalanceExceedsTotal { .. } => "BALANCE_EXCEEDS_TOTAL",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::NoOutstandingBalance
            | Self::Overpayment { .. }
            | Self::OutstandingBalance(_) => 422,
            Self::NonPositiveAmount | Self::BalanceExceedsTotal { .. } => 400,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            PaymentError::NoOutstandingBalance.error_code(),
            "NO_OUTSTANDING_BALANCE"
        );
        assert_eq!(
            PaymentError::Overpayment {
                balance: dec!(100),
                amount: dec!(150),
            }
            .error_code(),
            "OVERPAYMENT"
        );
        assert_eq!(
            PaymentError::OutstandingBalance(dec!(50)).error_code(),
            "OUTSTANDING_BALANCE"
        );
    }

    #[test]
    fn test_error_display() {
        let err = PaymentError::Overpayment {
            balance: dec!(100),
            amount: dec!(150),
        };
        assert_eq!(
            err.to_string(),
            "Overpayment: balance owed is 100, payment is 150"
        );
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(PaymentError::NoOutstandingBalance.http_status_code(), 422);
        assert_eq!(PaymentError::NonPositiveAmount.http_status_code(), 400);
    }
}
