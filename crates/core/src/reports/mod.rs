//! Reporting over issued documents and ledger rows.
//!
//! Read-only: the store loads invoices, tickets, or ledger rows for a date
//! range and optional party, and this module aggregates them:
//! - Invoice totals, split by payment status
//! - Ticket totals and markup
//! - Ledger credits, debits, and net change

pub mod error;
pub mod service;
pub mod types;


pub use error::ReportError;
pub use service::ReportService;
pub use types::*;
