//! Party ledger store.
//!
//! Single source of truth for party balances and their history. A balance
//! column is only ever written by [`PartyLedgerRepository::post_entry`],
//! which also appends the ledger row that explains the change, inside the
//! same database transaction.
//!
//! Writers are serialized per party in two layers:
//! - on PostgreSQL the party row is read with `SELECT ... FOR UPDATE`
//! - the balance update is a compare-and-set on `parties.version`, and the
//!   ledger row's `(party_id, sequence)` is unique
//!
//! A writer that planned from an older snapshot is refused as well: callers
//! pass the snapshot's version to [`PartyLedgerRepository::apply_delta`].
//! A writer that loses the race gets `ConcurrentModification` and the
//! whole unit of work is re-run from fresh balances.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseBackend, DatabaseConnection,
    DatabaseTransaction, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set, SqlErr,
    TransactionTrait,
};
use tracing::{debug, info};
use voyra_core::ledger::{
    EntryType, LedgerEntryInput, LedgerError, LedgerSource, LedgerTransaction, RunningBalance,
    validate_manual_entry, verify_history,
};
use voyra_core::party::{BalanceKind, CreatePartyInput, Party, PartyKind};
use voyra_core::reports::DateRange;
use voyra_shared::LedgerConfig;
use voyra_shared::types::{LedgerTransactionId, PartyId, round_money};

use super::retry::with_retry;
use crate::conversions;
use crate::entities::{ledger_transactions, parties, sea_orm_active_enums};

/// Error types for party ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum PartyLedgerError {
    /// Ledger rule violated.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Party input rejected.
    #[error("Invalid party: {0}")]
    InvalidParty(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl PartyLedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Ledger(e) => e.error_code(),
            Self::InvalidParty(_) => "INVALID_PARTY",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Ledger(e) => e.http_status_code(),
            Self::InvalidParty(_) => 400,
            Self::Database(_) => 500,
        }
    }

    /// Returns true if the unit of work can be re-run.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Ledger(e) if e.is_retryable())
    }
}

/// Filter options for listing ledger rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct LedgerFilter {
    /// Only rows for this party.
    pub party_id: Option<PartyId>,
    /// Only rows touching this balance.
    pub balance_kind: Option<BalanceKind>,
    /// Only rows created inside this range.
    pub range: Option<DateRange>,
}

/// Party ledger repository.
#[derive(Debug, Clone)]
pub struct PartyLedgerRepository {
    db: DatabaseConnection,
    config: LedgerConfig,
}

impl PartyLedgerRepository {
    /// Creates a new party ledger repository with default retry settings.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self::with_config(db, LedgerConfig::default())
    }

    /// Creates a new party ledger repository.
    #[must_use]
    pub const fn with_config(db: DatabaseConnection, config: LedgerConfig) -> Self {
        Self { db, config }
    }

    /// Registers a party and posts its opening balances as ledger credits.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParty` for a blank name or negative openings, and
    /// `UnsupportedBalance` for an opening credit on a customer.
    pub async fn create_party(&self, input: CreatePartyInput) -> Result<Party, PartyLedgerError> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(PartyLedgerError::InvalidParty(
                "name must not be empty".to_string(),
            ));
        }
        if input.opening_deposit < Decimal::ZERO || input.opening_credit < Decimal::ZERO {
            return Err(PartyLedgerError::InvalidParty(
                "opening balances must not be negative".to_string(),
            ));
        }
        if input.opening_credit > Decimal::ZERO && !input.kind.supports(BalanceKind::Credit) {
            return Err(LedgerError::UnsupportedBalance {
                party_kind: input.kind,
                balance_kind: BalanceKind::Credit,
            }
            .into());
        }

        let txn = self.db.begin().await?;

        let now = Utc::now().into();
        let party_id = PartyId::new();
        parties::ActiveModel {
            id: Set(party_id.into_inner()),
            kind: Set(input.kind.into()),
            name: Set(name.to_string()),
            email: Set(input.email.clone()),
            phone: Set(input.phone.clone()),
            address: Set(input.address.clone()),
            deposit_balance: Set(Decimal::ZERO),
            credit_balance: Set(Decimal::ZERO),
            version: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        let openings = [
            (BalanceKind::Deposit, input.opening_deposit),
            (BalanceKind::Credit, input.opening_credit),
        ];
        for (balance_kind, amount) in openings {
            if amount > Decimal::ZERO {
                Self::post_entry(
                    &txn,
                    &LedgerEntryInput {
                        party_id,
                        balance_kind,
                        entry_type: EntryType::Credit,
                        amount,
                        description: "Opening balance".to_string(),
                        source: LedgerSource::Opening,
                    },
                )
                .await?;
            }
        }

        let model = parties::Entity::find_by_id(party_id.into_inner())
            .one(&txn)
            .await?
            .ok_or(LedgerError::PartyNotFound(party_id.into_inner()))?;

        txn.commit().await?;

        info!(
            party_id = %party_id,
            kind = %input.kind,
            opening_deposit = %input.opening_deposit,
            opening_credit = %input.opening_credit,
            "Party created"
        );

        Ok(conversions::party(model))
    }

    /// Gets a party by ID.
    ///
    /// # Errors
    ///
    /// Returns `PartyNotFound` if it does not exist.
    pub async fn get_party(&self, party_id: PartyId) -> Result<Party, PartyLedgerError> {
        let model = parties::Entity::find_by_id(party_id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(LedgerError::PartyNotFound(party_id.into_inner()))?;
        Ok(conversions::party(model))
    }

    /// Lists parties, optionally of one kind, by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_parties(
        &self,
        kind: Option<PartyKind>,
    ) -> Result<Vec<Party>, PartyLedgerError> {
        let mut query = parties::Entity::find();
        if let Some(kind) = kind {
            query = query.filter(parties::Column::Kind.eq(sea_orm_active_enums::PartyKind::from(kind)));
        }
        let models = query.order_by_asc(parties::Column::Name).all(&self.db).await?;
        Ok(models.into_iter().map(conversions::party).collect())
    }

    /// Gets one balance of a party.
    ///
    /// # Errors
    ///
    /// Returns `PartyNotFound` or `UnsupportedBalance`.
    pub async fn get_balance(
        &self,
        party_id: PartyId,
        balance_kind: BalanceKind,
    ) -> Result<Decimal, PartyLedgerError> {
        let party = self.get_party(party_id).await?;
        if !party.kind.supports(balance_kind) {
            return Err(LedgerError::UnsupportedBalance {
                party_kind: party.kind,
                balance_kind,
            }
            .into());
        }
        Ok(party.balance(balance_kind))
    }

    /// Posts a manual entry in its own unit of work.
    ///
    /// Lost races are retried up to `ledger.max_issue_attempts` times.
    ///
    /// # Errors
    ///
    /// Returns a ledger error if the entry is invalid for the party, or
    /// `ConcurrentModification` once every attempt lost its race.
    pub async fn apply_transaction(
        &self,
        input: LedgerEntryInput,
    ) -> Result<LedgerTransaction, PartyLedgerError> {
        let party = self.get_party(input.party_id).await?;
        validate_manual_entry(party.kind, &input)?;

        let input = &input;
        with_retry("apply_transaction", self.config.max_issue_attempts, move |_| async move {
            let txn = self.db.begin().await?;
            let row = Self::post_entry(&txn, input).await?;
            txn.commit().await?;
            Ok::<_, PartyLedgerError>(row)
        })
        .await
    }

    /// Applies a signed delta to one balance inside the caller's transaction.
    ///
    /// Positive deltas are credits, negative deltas debits. When the delta
    /// was planned from a snapshot, `expected_version` is the party version
    /// of that snapshot and the write is refused if the party has moved on.
    ///
    /// # Errors
    ///
    /// Returns `ZeroAmount` for a zero delta, `ConcurrentModification` if
    /// the party is no longer at `expected_version`, and the errors of
    /// [`Self::post_entry`].
    pub async fn apply_delta(
        txn: &DatabaseTransaction,
        party_id: PartyId,
        balance_kind: BalanceKind,
        signed_amount: Decimal,
        description: &str,
        source: LedgerSource,
        expected_version: Option<i64>,
    ) -> Result<LedgerTransaction, PartyLedgerError> {
        let (entry_type, amount) = EntryType::from_signed(signed_amount);
        Self::write_entry(
            txn,
            &LedgerEntryInput {
                party_id,
                balance_kind,
                entry_type,
                amount,
                description: description.to_string(),
                source,
            },
            expected_version,
        )
        .await
    }

    /// Writes one entry: new balance on the party plus the ledger row.
    ///
    /// # Errors
    ///
    /// Returns `PartyNotFound`, `UnsupportedBalance`, amount errors from the
    /// running balance, or `ConcurrentModification` if another writer
    /// moved the party's version first.
    pub async fn post_entry(
        txn: &DatabaseTransaction,
        input: &LedgerEntryInput,
    ) -> Result<LedgerTransaction, PartyLedgerError> {
        Self::write_entry(txn, input, None).await
    }

    async fn write_entry(
        txn: &DatabaseTransaction,
        input: &LedgerEntryInput,
        expected_version: Option<i64>,
    ) -> Result<LedgerTransaction, PartyLedgerError> {
        let party = Self::read_for_update(txn, input.party_id).await?;
        if expected_version.is_some_and(|expected| expected != party.version) {
            return Err(LedgerError::ConcurrentModification.into());
        }
        let party_kind: PartyKind = party.kind.into();
        if !party_kind.supports(input.balance_kind) {
            return Err(LedgerError::UnsupportedBalance {
                party_kind,
                balance_kind: input.balance_kind,
            }
            .into());
        }

        let current = round_money(match input.balance_kind {
            BalanceKind::Deposit => party.deposit_balance,
            BalanceKind::Credit => party.credit_balance,
        });
        let amount = round_money(input.amount);
        let step = RunningBalance::apply(party.version, current, input.entry_type, amount)?;

        let balance_column = match input.balance_kind {
            BalanceKind::Deposit => parties::Column::DepositBalance,
            BalanceKind::Credit => parties::Column::CreditBalance,
        };
        let now = Utc::now();
        let updated = parties::Entity::update_many()
            .col_expr(balance_column, Expr::value(step.current_balance))
            .col_expr(parties::Column::Version, Expr::value(step.sequence))
            .col_expr(
                parties::Column::UpdatedAt,
                Expr::value(sea_orm::prelude::DateTimeWithTimeZone::from(now)),
            )
            .filter(parties::Column::Id.eq(party.id))
            .filter(parties::Column::Version.eq(party.version))
            .exec(txn)
            .await?;
        if updated.rows_affected == 0 {
            return Err(LedgerError::ConcurrentModification.into());
        }

        let (source_kind, source_id) = conversions::source_columns(input.source);
        let row = ledger_transactions::ActiveModel {
            id: Set(LedgerTransactionId::new().into_inner()),
            party_id: Set(party.id),
            party_kind: Set(party.kind),
            balance_kind: Set(input.balance_kind.into()),
            entry_type: Set(input.entry_type.into()),
            amount: Set(amount),
            description: Set(input.description.trim().to_string()),
            balance_after: Set(step.current_balance),
            sequence: Set(step.sequence),
            source_kind: Set(source_kind),
            source_id: Set(source_id),
            created_at: Set(now.into()),
        }
        .insert(txn)
        .await
        .map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                PartyLedgerError::Ledger(LedgerError::ConcurrentModification)
            }
            _ => PartyLedgerError::Database(e),
        })?;

        info!(
            party_id = %input.party_id,
            balance_kind = %input.balance_kind,
            entry_type = input.entry_type.as_str(),
            amount = %amount,
            balance_after = %step.current_balance,
            sequence = step.sequence,
            "Ledger entry posted"
        );

        Ok(conversions::ledger_transaction(row)?)
    }

    /// Reads a party row, taking its row lock where the backend has one.
    pub(crate) async fn read_for_update(
        txn: &DatabaseTransaction,
        party_id: PartyId,
    ) -> Result<parties::Model, PartyLedgerError> {
        let mut query = parties::Entity::find_by_id(party_id.into_inner());
        if txn.get_database_backend() == DatabaseBackend::Postgres {
            query = query.lock_exclusive();
        }
        let party = query
            .one(txn)
            .await?
            .ok_or(LedgerError::PartyNotFound(party_id.into_inner()))?;
        Ok(party)
    }

    /// Lists ledger rows, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails or a row is corrupt.
    pub async fn list_transactions(
        &self,
        filter: LedgerFilter,
    ) -> Result<Vec<LedgerTransaction>, PartyLedgerError> {
        let mut query = ledger_transactions::Entity::find();

        if let Some(party_id) = filter.party_id {
            query = query.filter(ledger_transactions::Column::PartyId.eq(party_id.into_inner()));
        }

        if let Some(balance_kind) = filter.balance_kind {
            query = query.filter(
                ledger_transactions::Column::BalanceKind
                    .eq(sea_orm_active_enums::BalanceKind::from(balance_kind)),
            );
        }

        if let Some(range) = filter.range {
            query = query
                .filter(ledger_transactions::Column::CreatedAt.gte(range.start()))
                .filter(ledger_transactions::Column::CreatedAt.lt(range.end_exclusive()));
        }

        let rows = query
            .order_by_asc(ledger_transactions::Column::CreatedAt)
            .order_by_asc(ledger_transactions::Column::Sequence)
            .all(&self.db)
            .await?;

        rows.into_iter()
            .map(|row| conversions::ledger_transaction(row).map_err(PartyLedgerError::from))
            .collect()
    }

    /// Replays a party's ledger and checks it against the stored balances.
    ///
    /// # Errors
    ///
    /// Returns `RunningBalanceMismatch` or `BalanceDrift` if the history
    /// does not explain the balances.
    pub async fn verify_party(&self, party_id: PartyId) -> Result<(), PartyLedgerError> {
        let party = self.get_party(party_id).await?;

        for balance_kind in [BalanceKind::Deposit, BalanceKind::Credit] {
            if !party.kind.supports(balance_kind) {
                continue;
            }
            let rows = self
                .list_transactions(LedgerFilter {
                    party_id: Some(party_id),
                    balance_kind: Some(balance_kind),
                    range: None,
                })
                .await?;
            verify_history(&rows, party.balance(balance_kind))?;
            debug!(
                party_id = %party_id,
                balance_kind = %balance_kind,
                rows = rows.len(),
                "Ledger history verified"
            );
        }

        Ok(())
    }
}

