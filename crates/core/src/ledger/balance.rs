//! Running balance calculations.
//!
//! Every row records the balance right after it was applied, so a party's
//! history can be audited without trusting the balance stored on the party:
//!
//! - `balance_after[N] = balance_after[N-1] ± amount[N]`
//! - replaying all rows for one balance from zero yields the stored balance

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::entry::{EntryType, LedgerTransaction};
use super::error::LedgerError;

/// Balance change produced by applying one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunningBalance {
    /// Party version after the entry (monotonically increasing).
    pub sequence: i64,
    /// Balance before this entry.
    pub previous_balance: Decimal,
    /// Balance after this entry.
    pub current_balance: Decimal,
}

impl RunningBalance {
    /// Applies an entry on top of a party at `version` holding `current`.
    ///
    /// # Errors
    ///
    /// Returns an error for zero or negative amounts and on overflow.
    pub fn apply(
        version: i64,
        current: Decimal,
        entry_type: EntryType,
        amount: Decimal,
    ) -> Result<Self, LedgerError> {
        Ok(Self {
            sequence: version + 1,
            previous_balance: current,
            current_balance: apply_entry(current, entry_type, amount)?,
        })
    }
}

/// Returns the balance after applying one entry.
///
/// # Errors
///
/// Returns an error for zero or negative amounts and on overflow.
pub fn apply_entry(
    current: Decimal,
    entry_type: EntryType,
    amount: Decimal,
) -> Result<Decimal, LedgerError> {
    if amount.is_zero() {
        return Err(LedgerError::ZeroAmount);
    }
    if amount.is_sign_negative() {
        return Err(LedgerError::NegativeAmount);
    }

    match entry_type {
        EntryType::Credit => current.checked_add(amount),
        EntryType::Debit => current.checked_sub(amount),
    }
    .ok_or(LedgerError::Overflow)
}

/// Replays rows of a single balance in sequence order, starting from zero.
///
/// Every row's `balance_after` must equal the running total after it.
///
/// # Errors
///
/// Returns `RunningBalanceMismatch` at the first row that disagrees.
pub fn replay(rows: &[LedgerTransaction]) -> Result<Decimal, LedgerError> {
    let mut ordered: Vec<&LedgerTransaction> = rows.iter().collect();
    ordered.sort_by_key(|row| row.sequence);

    let mut running = Decimal::ZERO;
    for row in ordered {
        running = apply_entry(running, row.entry_type, row.amount)?;
        if running != row.balance_after {
            return Err(LedgerError::RunningBalanceMismatch {
                sequence: row.sequence,
                expected: running,
                recorded: row.balance_after,
            });
        }
    }
    Ok(running)
}

/// Checks that the history of a single balance reproduces `current`.
///
/// # Errors
///
/// Returns `RunningBalanceMismatch` or `BalanceDrift`.
pub fn verify_history(rows: &[LedgerTransaction], current: Decimal) -> Result<(), LedgerError> {
    let expected = replay(rows)?;
    if expected != current {
        return Err(LedgerError::BalanceDrift {
            expected,
            actual: current,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::entry::LedgerSource;
    use crate::party::{BalanceKind, PartyKind};
    use chrono::Utc;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;
    use voyra_shared::types::{LedgerTransactionId, PartyId};

    fn build_history(party_id: PartyId, entries: &[(EntryType, Decimal)]) -> Vec<LedgerTransaction> {
        let mut version = 0;
        let mut balance = Decimal::ZERO;
        let mut rows = Vec::with_capacity(entries.len());
        for (entry_type, amount) in entries {
            let step = RunningBalance::apply(version, balance, *entry_type, *amount).unwrap();
            rows.push(LedgerTransaction {
                id: LedgerTransactionId::new(),
                party_id,
                party_kind: PartyKind::Vendor,
                balance_kind: BalanceKind::Deposit,
                entry_type: *entry_type,
                amount: *amount,
                description: "test".to_string(),
                balance_after: step.current_balance,
                sequence: step.sequence,
                source: LedgerSource::Manual,
                created_at: Utc::now(),
            });
            version = step.sequence;
            balance = step.current_balance;
        }
        rows
    }

    #[test]
    fn test_apply_rejects_non_positive_amounts() {
        assert!(matches!(
            apply_entry(dec!(10), EntryType::Credit, Decimal::ZERO),
            Err(LedgerError::ZeroAmount)
        ));
        assert!(matches!(
            apply_entry(dec!(10), EntryType::Debit, dec!(-1)),
            Err(LedgerError::NegativeAmount)
        ));
    }

    #[test]
    fn test_debit_may_go_negative() {
        assert_eq!(apply_entry(dec!(10), EntryType::Debit, dec!(25)).unwrap(), dec!(-15));
    }

    #[test]
    fn test_running_balance_step() {
        let step = RunningBalance::apply(4, dec!(100), EntryType::Credit, dec!(500)).unwrap();
        assert_eq!(step.sequence, 5);
        assert_eq!(step.previous_balance, dec!(100));
        assert_eq!(step.current_balance, dec!(600));
    }

    #[test]
    fn test_replay_detects_tampered_row() {
        let mut rows = build_history(
            PartyId::new(),
            &[(EntryType::Credit, dec!(300)), (EntryType::Debit, dec!(120))],
        );
        rows[1].balance_after = dec!(200);

        assert!(matches!(
            replay(&rows),
            Err(LedgerError::RunningBalanceMismatch { sequence: 2, .. })
        ));
    }

    #[test]
    fn test_verify_history_detects_drift() {
        let rows = build_history(PartyId::new(), &[(EntryType::Credit, dec!(300))]);
        assert!(verify_history(&rows, dec!(300)).is_ok());
        assert!(matches!(
            verify_history(&rows, dec!(250)),
            Err(LedgerError::BalanceDrift { .. })
        ));
    }

    #[test]
    fn test_replay_sorts_by_sequence() {
        let mut rows = build_history(
            PartyId::new(),
            &[
                (EntryType::Credit, dec!(50)),
                (EntryType::Credit, dec!(25)),
                (EntryType::Debit, dec!(10)),
            ],
        );
        rows.reverse();
        assert_eq!(replay(&rows).unwrap(), dec!(65));
    }

    #[test]
    fn test_empty_history_replays_to_zero() {
        assert_eq!(replay(&[]).unwrap(), Decimal::ZERO);
    }

    fn amount_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..10_000_000i64).prop_map(|n| Decimal::new(n, 2))
    }

    fn entry_strategy() -> impl Strategy<Value = (EntryType, Decimal)> {
        (
            prop_oneof![Just(EntryType::Credit), Just(EntryType::Debit)],
            amount_strategy(),
        )
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Replaying a history built through `RunningBalance::apply`
        /// reproduces its last `balance_after` and the signed sum.
        #[test]
        fn prop_replay_matches_signed_sum(
            entries in prop::collection::vec(entry_strategy(), 1..50),
        ) {
            let rows = build_history(PartyId::new(), &entries);
            let signed_sum: Decimal = rows.iter().map(LedgerTransaction::signed_amount).sum();
            let last = rows.last().map(|row| row.balance_after).unwrap();

            prop_assert_eq!(replay(&rows).unwrap(), signed_sum);
            prop_assert_eq!(last, signed_sum);
            prop_assert!(verify_history(&rows, signed_sum).is_ok());
        }

        /// Each row's previous balance is the prior row's current balance.
        #[test]
        fn prop_sequence_strictly_increases(
            entries in prop::collection::vec(entry_strategy(), 2..30),
        ) {
            let rows = build_history(PartyId::new(), &entries);
            for pair in rows.windows(2) {
                prop_assert!(pair[1].sequence > pair[0].sequence);
                prop_assert_eq!(
                    pair[1].balance_after,
                    pair[0].balance_after + pair[1].signed_amount()
                );
            }
        }
    }
}
