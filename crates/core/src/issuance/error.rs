//! Issuance error types.
//!
//! Draw amounts clamp to what is available, so there is no
//! insufficient-balance error: an issuance never fails for lack of funds.

use thiserror::Error;
use uuid::Uuid;

use super::types::DocumentStatus;
use crate::ledger::LedgerError;
use crate::party::PartyKind;
use crate::settlement::SettlementError;

/// Errors that can occur while issuing or updating invoices and tickets.
#[derive(Debug, Error)]
pub enum IssuanceError {
    // ========== Validation Errors ==========
    /// An invoice needs at least one line.
    #[error("Invoice must have at least one line item")]
    NoLineItems,

    /// Quantity must be at least one.
    #[error("Line {position}: quantity must be at least 1")]
    InvalidQuantity {
        /// Zero-based line position.
        position: usize,
    },

    /// Unit price cannot be negative.
    #[error("Line {position}: unit price cannot be negative")]
    NegativeUnitPrice {
        /// Zero-based line position.
        position: usize,
    },

    /// Line description cannot be blank.
    #[error("Line {position}: description cannot be empty")]
    EmptyLineDescription {
        /// Zero-based line position.
        position: usize,
    },

    /// Vendor cost cannot be negative.
    #[error("Vendor cost cannot be negative")]
    NegativeVendorCost,

    /// Ticket face value must be positive.
    #[error("Ticket face value must be greater than zero")]
    InvalidFaceValue,

    /// Ticket vendor price cannot be negative.
    #[error("Ticket vendor price cannot be negative")]
    NegativeVendorPrice,

    /// Ticket needs a passenger.
    #[error("Passenger name cannot be empty")]
    MissingPassengerName,

    /// Issuing operator is required.
    #[error("Issuing operator cannot be empty")]
    MissingIssuer,

    // ========== Business Rule Errors ==========
    /// A referenced party has the wrong kind for its role.
    #[error("Party {party_id} is a {actual}, expected a {expected}")]
    PartyKindMismatch {
        /// The party ID.
        party_id: Uuid,
        /// Kind required by the document.
        expected: PartyKind,
        /// Kind the party actually has.
        actual: PartyKind,
    },

    /// Attempted an invalid status transition.
    #[error("Invalid status transition from {from} to {to}")]
    InvalidStatusTransition {
        /// The current status.
        from: DocumentStatus,
        /// The attempted target status.
        to: DocumentStatus,
    },

    // ========== Not Found Errors ==========
    /// Party not found.
    #[error("Party not found: {0}")]
    PartyNotFound(Uuid),

    /// Invoice not found.
    #[error("Invoice not found: {0}")]
    InvoiceNotFound(Uuid),

    /// Ticket not found.
    #[error("Ticket not found: {0}")]
    TicketNotFound(Uuid),

    // ========== Settlement Errors ==========
    /// The settlement could not be computed.
    #[error(transparent)]
    Settlement(#[from] SettlementError),

    // ========== Ledger Errors ==========
    /// Applying a deduction failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl IssuanceError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NoLineItems => "NO_LINE_ITEMS",
            Self::InvalidQuantity { .. } => "INVALID_QUANTITY",
            Self::NegativeUnitPrice { .. } => "NEGATIVE_UNIT_PRICE",
            Self::EmptyLineDescription { .. } => "EMPTY_LINE_DESCRIPTION",
            Self::NegativeVendorCost => "NEGATIVE_VENDOR_COST",
            Self::InvalidFaceValue => "INVALID_FACE_VALUE",
            Self::NegativeVendorPrice => "NEGATIVE_VENDOR_PRICE",
            Self::MissingPassengerName => "MISSING_PASSENGER_NAME",
            Self::MissingIssuer => "MISSING_ISSUER",
            Self::PartyKindMismatch { .. } => "PARTY_KIND_MISMATCH",
            Self::InvalidStatusTransition { .. } => "INVALID_STATUS_TRANSITION",
            Self::PartyNotFound(_) => "PARTY_NOT_FOUND",
            Self::InvoiceNotFound(_) => "INVOICE_NOT_FOUND",
            Self::TicketNotFound(_) => "TICKET_NOT_FOUND",
            Self::Settlement(e) => e.error_code(),
            Self::Ledger(e) => e.error_code(),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::NoLineItems
            | Self::InvalidQuantity { .. }
            | Self::NegativeUnitPrice { .. }
            | Self::EmptyLineDescription { .. }
            | Self::NegativeVendorCost
            | Self::InvalidFaceValue
            | Self::NegativeVendorPrice
            | Self::MissingPassengerName
            | Self::MissingIssuer => 400,

            Self::PartyKindMismatch { .. } | Self::InvalidStatusTransition { .. } => 422,

            Self::PartyNotFound(_) | Self::InvoiceNotFound(_) | Self::TicketNotFound(_) => 404,

            Self::Settlement(e) => e.http_status_code(),
            Self::Ledger(e) => e.http_status_code(),
        }
    }

    /// Returns true if re-running the unit of work may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Ledger(e) if e.is_retryable())
    }
}
