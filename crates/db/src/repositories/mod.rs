//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod admin;
pub mod issuance;
pub mod party_ledger;
pub mod report;
mod retry;

pub use admin::{AdminRepository, ResetSummary};
pub use issuance::{DocumentFilter, IssuanceRepoError, IssuanceRepository};
pub use party_ledger::{LedgerFilter, PartyLedgerError, PartyLedgerRepository};
pub use report::{ReportRepoError, ReportRepository};
