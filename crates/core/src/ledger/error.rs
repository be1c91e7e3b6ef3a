//! Error taxonomy for ledger operations.
//!
//! Every failure surfaced to a caller carries one of these variants; the
//! HTTP layer branches on `error_code()`, never on message text.

use cortado_shared::types::{MinorUnits, TransactionId};
use thiserror::Error;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Malformed input: non-positive amount, missing field, or an
    /// idempotency key reused with a different request body.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A charge (or topup reversal) would overdraw the customer wallet.
    #[error("Insufficient funds: balance is {balance}, requested {requested}")]
    InsufficientFunds {
        /// Current wallet balance in minor units.
        balance: MinorUnits,
        /// Amount the operation tried to remove.
        requested: MinorUnits,
    },

    /// Transaction not found.
    #[error("Transaction not found: {0}")]
    TransactionNotFound(TransactionId),

    /// The target transaction has already been reversed.
    #[error("Transaction {0} already has a reversal")]
    ReversalAlreadyExists(TransactionId),

    /// The target transaction is itself a reversal.
    #[error("Transaction {0} is a reversal and cannot be reversed")]
    ReversalForbiddenType(TransactionId),

    /// Internal consistency failure. Fatal: must be surfaced to operators,
    /// never swallowed or retried.
    #[error("Ledger invariant broken: {0}")]
    InvariantBroken(String),

    /// A dev-only operation was invoked outside its allowed environment.
    #[error("Dev endpoint is disabled in this environment")]
    ForbiddenDevEndpoint,

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl LedgerError {
    /// Returns the stable error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_FAILED",
            Self::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            Self::TransactionNotFound(_) => "TX_NOT_FOUND",
            Self::ReversalAlreadyExists(_) => "REVERSAL_ALREADY_EXISTS",
            Self::ReversalForbiddenType(_) => "REVERSAL_FORBIDDEN_TYPE",
            Self::InvariantBroken(_) => "LEDGER_INVARIANT_BROKEN",
            Self::ForbiddenDevEndpoint => "FORBIDDEN_DEV_ENDPOINT",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::ForbiddenDevEndpoint => 403,
            Self::TransactionNotFound(_) => 404,
            Self::ReversalAlreadyExists(_) => 409,
            Self::InsufficientFunds { .. } | Self::ReversalForbiddenType(_) => 422,
            Self::InvariantBroken(_) | Self::Database(_) => 500,
        }
    }

    /// Returns true if this error should page an operator.
    ///
    /// Everything else is an expected, user-facing outcome.
    #[must_use]
    pub const fn is_alert(&self) -> bool {
        matches!(self, Self::InvariantBroken(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            LedgerError::Validation("bad amount".into()).error_code(),
            "VALIDATION_FAILED"
        );
        assert_eq!(
            LedgerError::InsufficientFunds {
                balance: MinorUnits::new(600),
                requested: MinorUnits::new(2000),
            }
            .error_code(),
            "INSUFFICIENT_FUNDS"
        );
        assert_eq!(
            LedgerError::TransactionNotFound(TransactionId::new()).error_code(),
            "TX_NOT_FOUND"
        );
        assert_eq!(
            LedgerError::ReversalAlreadyExists(TransactionId::new()).error_code(),
            "REVERSAL_ALREADY_EXISTS"
        );
        assert_eq!(
            LedgerError::ReversalForbiddenType(TransactionId::new()).error_code(),
            "REVERSAL_FORBIDDEN_TYPE"
        );
        assert_eq!(
            LedgerError::InvariantBroken("entries unbalanced".into()).error_code(),
            "LEDGER_INVARIANT_BROKEN"
        );
        assert_eq!(
            LedgerError::ForbiddenDevEndpoint.error_code(),
            "FORBIDDEN_DEV_ENDPOINT"
        );
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(LedgerError::Validation(String::new()).http_status_code(), 400);
        assert_eq!(LedgerError::ForbiddenDevEndpoint.http_status_code(), 403);
        assert_eq!(
            LedgerError::TransactionNotFound(TransactionId::new()).http_status_code(),
            404
        );
        assert_eq!(
            LedgerError::ReversalAlreadyExists(TransactionId::new()).http_status_code(),
            409
        );
        assert_eq!(
            LedgerError::InsufficientFunds {
                balance: MinorUnits::ZERO,
                requested: MinorUnits::new(1),
            }
            .http_status_code(),
            422
        );
        assert_eq!(
            LedgerError::InvariantBroken(String::new()).http_status_code(),
            500
        );
    }

    #[test]
    fn test_only_invariant_breaks_alert() {
        assert!(LedgerError::InvariantBroken(String::new()).is_alert());
        assert!(!LedgerError::Validation(String::new()).is_alert());
        assert!(!LedgerError::InsufficientFunds {
            balance: MinorUnits::ZERO,
            requested: MinorUnits::new(1),
        }
        .is_alert());
        assert!(!LedgerError::Database(String::new()).is_alert());
    }

    #[test]
    fn test_insufficient_funds_display() {
        let err = LedgerError::InsufficientFunds {
            balance: MinorUnits::new(600),
            requested: MinorUnits::new(2000),
        };
        assert_eq!(
            err.to_string(),
            "Insufficient funds: balance is 600, requested 2000"
        );
    }
}
