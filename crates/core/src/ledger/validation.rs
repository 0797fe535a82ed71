//! Business rule validation for ledger entries.

use rust_decimal::Decimal;

use super::entry::LedgerEntryInput;
use super::error::LedgerError;
use crate::party::PartyKind;

/// Validates an entry against the party it targets.
///
/// # Errors
///
/// Returns an error if the amount is not positive, the description is blank,
/// or the party kind does not carry the addressed balance.
pub fn validate_manual_entry(party_kind: PartyKind, input: &LedgerEntryInput) -> Result<(), LedgerError> {
    if input.amount.is_zero() {
        return Err(LedgerError::ZeroAmount);
    }
    if input.amount < Decimal::ZERO {
        return Err(LedgerError::NegativeAmount);
    }
    if input.description.trim().is_empty() {
        return Err(LedgerError::EmptyDescription);
    }
    if !party_kind.supports(input.balance_kind) {
        return Err(LedgerError::UnsupportedBalance {
            party_kind,
            balance_kind: input.balance_kind,
        });
    }
    Ok(())
}
