//! Ledger error types for validation and state errors.
//!
//! This module defines all errors that can occur while mutating or auditing
//! a party balance: entry validation, unknown parties, broken running
//! balances, and lost compare-and-set races.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::party::{BalanceKind, PartyKind};

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Entry amount cannot be zero.
    #[error("Entry amount cannot be zero")]
    ZeroAmount,

    /// Entry amount cannot be negative.
    #[error("Entry amount cannot be negative")]
    NegativeAmount,

    /// Every ledger row needs a human-readable description.
    #[error("Entry description cannot be empty")]
    EmptyDescription,

    /// The party kind does not carry this balance.
    #[error("A {party_kind} has no {balance_kind} balance")]
    UnsupportedBalance {
        /// Kind of the party addressed.
        party_kind: PartyKind,
        /// Balance the entry tried to touch.
        balance_kind: BalanceKind,
    },

    /// Balance arithmetic left the representable range.
    #[error("Balance arithmetic overflow")]
    Overflow,

    // ========== Party Errors ==========
    /// Party not found.
    #[error("Party not found: {0}")]
    PartyNotFound(Uuid),

    // ========== Audit Errors ==========
    /// A row's recorded `balance_after` disagrees with the replayed total.
    #[error(
        "Running balance mismatch at sequence {sequence}: expected {expected}, recorded {recorded}"
    )]
    RunningBalanceMismatch {
        /// Sequence number of the offending row.
        sequence: i64,
        /// Replayed balance after the row.
        expected: Decimal,
        /// Balance stored on the row.
        recorded: Decimal,
    },

    /// The replayed ledger does not reproduce the stored balance.
    #[error("Balance drift: ledger replays to {expected}, party holds {actual}")]
    BalanceDrift {
        /// Replayed balance.
        expected: Decimal,
        /// Stored balance.
        actual: Decimal,
    },

    // ========== Concurrency Errors ==========
    /// Concurrent modification detected.
    #[error("Concurrent modification detected, please retry")]
    ConcurrentModification,

    // ========== Internal Errors ==========
    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ZeroAmount => "ZERO_AMOUNT",
            Self::NegativeAmount => "NEGATIVE_AMOUNT",
            Self::EmptyDescription => "EMPTY_DESCRIPTION",
            Self::UnsupportedBalance { .. } => "UNSUPPORTED_BALANCE",
            Self::Overflow => "BALANCE_OVERFLOW",
            Self::PartyNotFound(_) => "PARTY_NOT_FOUND",
            Self::RunningBalanceMismatch { .. } => "RUNNING_BALANCE_MISMATCH",
            Self::BalanceDrift { .. } => "BALANCE_DRIFT",
            Self::ConcurrentModification => "CONCURRENT_MODIFICATION",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - validation errors
            Self::ZeroAmount
            | Self::NegativeAmount
            | Self::EmptyDescription
            | Self::UnsupportedBalance { .. }
            | Self::Overflow => 400,

            // 404 Not Found
            Self::PartyNotFound(_) => 404,

            // 409 Conflict - concurrency errors
            Self::ConcurrentModification => 409,

            // 500 Internal Server Error - a broken ledger is our fault
            Self::RunningBalanceMismatch { .. }
            | Self::BalanceDrift { .. }
            | Self::Internal(_) => 500,
        }
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrentModification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(LedgerError::ZeroAmount.error_code(), "ZERO_AMOUNT");
        assert_eq!(LedgerError::NegativeAmount.error_code(), "NEGATIVE_AMOUNT");
        assert_eq!(
            LedgerError::UnsupportedBalance {
                party_kind: PartyKind::Customer,
                balance_kind: BalanceKind::Credit,
            }
            .error_code(),
            "UNSUPPORTED_BALANCE"
        );
        assert_eq!(
            LedgerError::PartyNotFound(Uuid::nil()).error_code(),
            "PARTY_NOT_FOUND"
        );
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(LedgerError::ZeroAmount.http_status_code(), 400);
        assert_eq!(
            LedgerError::PartyNotFound(Uuid::nil()).http_status_code(),
            404
        );
        assert_eq!(LedgerError::ConcurrentModification.http_status_code(), 409);
        assert_eq!(
            LedgerError::BalanceDrift {
                expected: Decimal::ONE,
                actual: Decimal::ZERO,
            }
            .http_status_code(),
            500
        );
    }

    #[test]
    fn test_retryable_errors() {
        assert!(LedgerError::ConcurrentModification.is_retryable());
        assert!(!LedgerError::ZeroAmount.is_retryable());
        assert!(!LedgerError::Internal("gone".to_string()).is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = LedgerError::UnsupportedBalance {
            party_kind: PartyKind::Customer,
            balance_kind: BalanceKind::Credit,
        };
        assert_eq!(err.to_string(), "A customer has no credit balance");

        let err = LedgerError::RunningBalanceMismatch {
            sequence: 3,
            expected: Decimal::new(50000, 2),
            recorded: Decimal::new(45000, 2),
        };
        assert_eq!(
            err.to_string(),
            "Running balance mismatch at sequence 3: expected 500.00, recorded 450.00"
        );
    }
}
