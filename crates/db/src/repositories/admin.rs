//! Administrative bulk operations.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::Expr;
use sea_orm::{DatabaseConnection, DbErr, EntityTrait, TransactionTrait};
use serde::Serialize;
use tracing::warn;

use crate::entities::{invoice_line_items, invoices, ledger_transactions, parties, tickets};

/// Rows removed or reset by [`AdminRepository::reset_finance_data`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResetSummary {
    /// Ledger rows deleted.
    pub ledger_transactions: u64,
    /// Tickets deleted.
    pub tickets: u64,
    /// Invoice lines deleted.
    pub invoice_line_items: u64,
    /// Invoices deleted.
    pub invoices: u64,
    /// Parties whose balances were zeroed.
    pub parties: u64,
}

/// Admin repository.
#[derive(Debug, Clone)]
pub struct AdminRepository {
    db: DatabaseConnection,
}

impl AdminRepository {
    /// Creates a new admin repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Deletes every document and ledger row and zeroes every balance.
    ///
    /// Runs as one transaction, so balances and ledgers are never seen out
    /// of step. Party versions keep counting up rather than restarting.
    ///
    /// # Errors
    ///
    /// Returns an error if any statement fails; nothing is changed then.
    pub async fn reset_finance_data(&self) -> Result<ResetSummary, DbErr> {
        let txn = self.db.begin().await?;

        let ledger = ledger_transactions::Entity::delete_many().exec(&txn).await?;
        let tickets = tickets::Entity::delete_many().exec(&txn).await?;
        let lines = invoice_line_items::Entity::delete_many().exec(&txn).await?;
        let invoices = invoices::Entity::delete_many().exec(&txn).await?;
        let parties = parties::Entity::update_many()
            .col_expr(parties::Column::DepositBalance, Expr::value(Decimal::ZERO))
            .col_expr(parties::Column::CreditBalance, Expr::value(Decimal::ZERO))
            .col_expr(
                parties::Column::Version,
                Expr::col(parties::Column::Version).add(1),
            )
            .col_expr(
                parties::Column::UpdatedAt,
                Expr::value(DateTimeWithTimeZone::from(Utc::now())),
            )
            .exec(&txn)
            .await?;

        txn.commit().await?;

        let summary = ResetSummary {
            ledger_transactions: ledger.rows_affected,
            tickets: tickets.rows_affected,
            invoice_line_items: lines.rows_affected,
            invoices: invoices.rows_affected,
            parties: parties.rows_affected,
        };
        warn!(?summary, "Finance data reset");

        Ok(summary)
    }
}
