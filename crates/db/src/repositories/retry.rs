//! Re-running units of work that lost a balance race.
//!
//! A unit of work reads balances, plans from them and writes. When another
//! writer moved a party first, the write fails with a retryable error and
//! the whole unit is run again, reading the balances afresh.

use std::future::Future;

use tracing::warn;

use super::issuance::IssuanceRepoError;
use super::party_ledger::PartyLedgerError;

/// Errors that say whether re-running the unit of work may succeed.
pub(crate) trait Retryable {
    fn is_retryable(&self) -> bool;
}

impl Retryable for PartyLedgerError {
    fn is_retryable(&self) -> bool {
        Self::is_retryable(self)
    }
}

impl Retryable for IssuanceRepoError {
    fn is_retryable(&self) -> bool {
        Self::is_retryable(self)
    }
}

/// Runs `unit` until it succeeds, fails for good, or `max_attempts` runs
/// have lost their race. `unit` receives the one-based attempt number.
pub(crate) async fn with_retry<T, E, F, Fut>(
    operation: &'static str,
    max_attempts: u32,
    mut unit: F,
) -> Result<T, E>
where
    E: Retryable,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match unit(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt < max_attempts => {
                warn!(operation, attempt, "Lost a balance race, retrying");
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PartyLedgerRepository;
    use crate::entities::parties;
    use crate::migration::{Migrator, MigratorTrait};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use sea_orm::{ConnectOptions, Database, DatabaseConnection, EntityTrait, TransactionTrait};
    use voyra_core::ledger::{EntryType, LedgerEntryInput, LedgerError, LedgerSource};
    use voyra_core::party::{BalanceKind, CreatePartyInput, PartyKind};
    use voyra_shared::types::{PartyId, round_money};

    async fn setup_db() -> DatabaseConnection {
        let mut options = ConnectOptions::new("sqlite::memory:");
        options
            .max_connections(1)
            .min_connections(1)
            .sqlx_logging(false);
        let db = Database::connect(options).await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        db
    }

    async fn customer_with_deposit(ledger: &PartyLedgerRepository, deposit: Decimal) -> PartyId {
        ledger
            .create_party(CreatePartyInput {
                kind: PartyKind::Customer,
                name: "Karim".to_string(),
                email: None,
                phone: None,
                address: None,
                opening_deposit: deposit,
                opening_credit: Decimal::ZERO,
            })
            .await
            .unwrap()
            .id
    }

    /// Draws up to `owed` from the deposit, planning from a snapshot read
    /// before the write. On the first attempt another writer debits the
    /// deposit between the snapshot and the write.
    async fn draw_deposit(
        db: &DatabaseConnection,
        ledger: &PartyLedgerRepository,
        party_id: PartyId,
        owed: Decimal,
        attempt: u32,
    ) -> Result<(u32, Decimal), PartyLedgerError> {
        let snapshot = parties::Entity::find_by_id(party_id.into_inner())
            .one(db)
            .await?
            .ok_or(LedgerError::PartyNotFound(party_id.into_inner()))?;

        if attempt == 1 {
            ledger
                .apply_transaction(LedgerEntryInput {
                    party_id,
                    balance_kind: BalanceKind::Deposit,
                    entry_type: EntryType::Debit,
                    amount: dec!(250),
                    description: "Refund paid out".to_string(),
                    source: LedgerSource::Manual,
                })
                .await?;
        }

        let draw = owed.min(round_money(snapshot.deposit_balance));
        let txn = db.begin().await?;
        let row = PartyLedgerRepository::apply_delta(
            &txn,
            party_id,
            BalanceKind::Deposit,
            -draw,
            "Deposit used",
            LedgerSource::Manual,
            Some(snapshot.version),
        )
        .await?;
        txn.commit().await?;
        Ok((attempt, row.amount))
    }

    #[tokio::test]
    async fn test_lost_race_replans_from_new_balance() {
        let db = setup_db().await;
        let ledger = PartyLedgerRepository::new(db.clone());
        let party_id = customer_with_deposit(&ledger, dec!(300)).await;

        let (db_ref, ledger_ref) = (&db, &ledger);
        let (attempt, drawn) = with_retry("draw_deposit", 3, move |attempt| {
            draw_deposit(db_ref, ledger_ref, party_id, dec!(200), attempt)
        })
        .await
        .unwrap();

        // First plan drew 200 from a stale 300; the retry saw 50.
        assert_eq!(attempt, 2);
        assert_eq!(drawn, dec!(50));
        assert_eq!(
            ledger
                .get_balance(party_id, BalanceKind::Deposit)
                .await
                .unwrap(),
            Decimal::ZERO
        );
        ledger.verify_party(party_id).await.unwrap();

        let rows = ledger
            .list_transactions(crate::LedgerFilter {
                party_id: Some(party_id),
                ..crate::LedgerFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(rows.len(), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let mut calls = 0;
        let result: Result<(), PartyLedgerError> = with_retry("always_loses", 3, |_| {
            calls += 1;
            async { Err(PartyLedgerError::from(LedgerError::ConcurrentModification)) }
        })
        .await;

        assert!(matches!(
            result,
            Err(PartyLedgerError::Ledger(LedgerError::ConcurrentModification))
        ));
        assert_eq!(calls, 3);
    }

    #[tokio::test]
    async fn test_permanent_errors_are_not_retried() {
        let mut calls = 0;
        let result: Result<(), PartyLedgerError> = with_retry("zero_amount", 3, |_| {
            calls += 1;
            async { Err(PartyLedgerError::from(LedgerError::ZeroAmount)) }
        })
        .await;

        assert!(matches!(
            result,
            Err(PartyLedgerError::Ledger(LedgerError::ZeroAmount))
        ));
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn test_zero_attempts_still_runs_once() {
        let result: Result<u32, PartyLedgerError> =
            with_retry("once", 0, |attempt| async move { Ok(attempt) }).await;
        assert_eq!(result.unwrap(), 1);
    }
}
