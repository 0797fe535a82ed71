//! Invoice and ticket issuance.
//!
//! Issuance never trusts client-computed figures: the store reads the
//! parties' current balances inside its unit of work and hands them to
//! [`IssuanceService`], which validates the draft, recomputes the
//! settlement, and lists the debits to apply.

pub mod error;
pub mod service;
pub mod types;

pub use error::IssuanceError;
pub use service::IssuanceService;
pub use types::{
    BalanceDeduction, DocumentStatus, Invoice, InvoiceDraft, InvoiceLine, IssuancePlan,
    PaymentMethod, Ticket, TicketDraft,
};
