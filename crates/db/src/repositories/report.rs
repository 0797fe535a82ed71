//! Report repository: date-range and party filtered projections.
//!
//! Reads only. Documents and ledger rows are fetched through the owning
//! repositories and aggregated by [`ReportService`].

use sea_orm::DatabaseConnection;
use voyra_core::reports::{
    DateRange, InvoiceReport, LedgerReport, ReportError, ReportService, TicketReport,
};
use voyra_shared::types::PartyId;

use super::issuance::{DocumentFilter, IssuanceRepoError, IssuanceRepository};
use super::party_ledger::{LedgerFilter, PartyLedgerError, PartyLedgerRepository};

/// Error types for report operations.
#[derive(Debug, thiserror::Error)]
pub enum ReportRepoError {
    /// Report parameters rejected.
    #[error(transparent)]
    Report(#[from] ReportError),

    /// Reading documents failed.
    #[error(transparent)]
    Documents(#[from] IssuanceRepoError),

    /// Reading the ledger failed.
    #[error(transparent)]
    Ledger(#[from] PartyLedgerError),
}

impl ReportRepoError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Report(e) => e.error_code(),
            Self::Documents(e) => e.error_code(),
            Self::Ledger(e) => e.error_code(),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Report(e) => e.http_status_code(),
            Self::Documents(e) => e.http_status_code(),
            Self::Ledger(e) => e.http_status_code(),
        }
    }
}

/// Report repository.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    db: DatabaseConnection,
}

impl ReportRepository {
    /// Creates a new report repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Invoices created in `range`, optionally involving one party.
    ///
    /// An empty range yields zero counts and totals.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn invoice_report(
        &self,
        range: DateRange,
        party_id: Option<PartyId>,
    ) -> Result<InvoiceReport, ReportRepoError> {
        let invoices = IssuanceRepository::new(self.db.clone())
            .list_invoices(DocumentFilter {
                party_id,
                status: None,
                range: Some(range),
            })
            .await?;
        Ok(ReportService::invoice_report(range, party_id, invoices))
    }

    /// Tickets created in `range`, optionally involving one party.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn ticket_report(
        &self,
        range: DateRange,
        party_id: Option<PartyId>,
    ) -> Result<TicketReport, ReportRepoError> {
        let tickets = IssuanceRepository::new(self.db.clone())
            .list_tickets(DocumentFilter {
                party_id,
                status: None,
                range: Some(range),
            })
            .await?;
        Ok(ReportService::ticket_report(range, party_id, tickets))
    }

    /// Ledger rows created in `range`, optionally for one party.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn ledger_report(
        &self,
        range: DateRange,
        party_id: Option<PartyId>,
    ) -> Result<LedgerReport, ReportRepoError> {
        let transactions = PartyLedgerRepository::new(self.db.clone())
            .list_transactions(LedgerFilter {
                party_id,
                balance_kind: None,
                range: Some(range),
            })
            .await?;
        Ok(ReportService::ledger_report(range, party_id, transactions))
    }
}
