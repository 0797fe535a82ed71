//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions (crate-private)
//! - The party ledger store, issuance, report and admin repositories
//! - Database migrations
//!
//! Entities never leave the crate. Repositories hand out the read models
//! defined in `voyra-core`, so no caller can write a balance column
//! except through [`PartyLedgerRepository`].

mod conversions;
pub(crate) mod entities;
pub mod migration;
pub mod repositories;

pub use repositories::{
    AdminRepository, DocumentFilter, IssuanceRepoError, IssuanceRepository, LedgerFilter,
    PartyLedgerError, PartyLedgerRepository, ReportRepoError, ReportRepository, ResetSummary,
};

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use voyra_shared::config::DatabaseConfig;

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}

/// Establishes a pooled connection using the database settings.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect_with(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .sqlx_logging(false);
    Database::connect(options).await
}
