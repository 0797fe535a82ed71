//! Settlement error types.

use thiserror::Error;

/// Errors raised while computing a settlement.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettlementError {
    /// An input or derived amount does not fit a money column.
    #[error("{field} is out of range")]
    AmountOutOfRange {
        /// The amount that overflowed.
        field: &'static str,
    },
}

impl SettlementError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::AmountOutOfRange { .. } => "AMOUNT_OUT_OF_RANGE",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::AmountOutOfRange { .. } => 400,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_out_of_range() {
        let err = SettlementError::AmountOutOfRange { field: "subtotal" };
        assert_eq!(err.error_code(), "AMOUNT_OUT_OF_RANGE");
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(err.to_string(), "subtotal is out of range");
    }
}
