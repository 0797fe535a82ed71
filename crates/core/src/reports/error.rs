//! Report error types.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Invalid date range.
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange {
        /// Start date.
        start: NaiveDate,
        /// End date.
        end: NaiveDate,
    },

    /// A custom period is missing one of its bounds.
    #[error("Custom period requires both from and to dates")]
    IncompleteCustomRange,

    /// Unknown period name.
    #[error("Unknown report period: {0}")]
    UnknownPeriod(String),
}

impl ReportError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
            Self::IncompleteCustomRange => "INCOMPLETE_CUSTOM_RANGE",
            Self::UnknownPeriod(_) => "UNKNOWN_PERIOD",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::InvalidDateRange { .. } | Self::IncompleteCustomRange | Self::UnknownPeriod(_) => {
                400
            }
        }
    }
}
