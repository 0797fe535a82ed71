//! Ledger entry domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use voyra_shared::types::{InvoiceId, LedgerTransactionId, PartyId, TicketId};

use crate::party::{BalanceKind, PartyKind};

/// Direction of a balance mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    /// Increases the balance.
    Credit,
    /// Decreases the balance.
    Debit,
}

impl EntryType {
    /// Returns the signed effect of `amount` on the balance.
    #[must_use]
    pub fn signed(self, amount: Decimal) -> Decimal {
        match self {
            Self::Credit => amount,
            Self::Debit => -amount,
        }
    }

    /// Splits a signed delta into a direction and a positive amount.
    #[must_use]
    pub fn from_signed(delta: Decimal) -> (Self, Decimal) {
        if delta.is_sign_negative() {
            (Self::Debit, -delta)
        } else {
            (Self::Credit, delta)
        }
    }

    /// Returns the lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Credit => "credit",
            Self::Debit => "debit",
        }
    }
}

/// What caused a ledger row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum LedgerSource {
    /// Operator-entered top-up or adjustment.
    Manual,
    /// Opening balance posted when the party was registered.
    Opening,
    /// Deduction applied while issuing an invoice.
    Invoice(InvoiceId),
    /// Deduction applied while issuing a ticket.
    Ticket(TicketId),
}

/// Input for one balance mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntryInput {
    /// Party whose balance changes.
    pub party_id: PartyId,
    /// Which balance changes.
    pub balance_kind: BalanceKind,
    /// Credit (increase) or debit (decrease).
    pub entry_type: EntryType,
    /// Positive amount.
    pub amount: Decimal,
    /// Operator or system supplied description.
    pub description: String,
    /// What caused the mutation.
    pub source: LedgerSource,
}

/// One append-only row of a party's balance history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerTransaction {
    /// Row ID.
    pub id: LedgerTransactionId,
    /// Party whose balance changed.
    pub party_id: PartyId,
    /// Kind of that party.
    pub party_kind: PartyKind,
    /// Which balance changed.
    pub balance_kind: BalanceKind,
    /// Credit (increase) or debit (decrease).
    pub entry_type: EntryType,
    /// Positive amount.
    pub amount: Decimal,
    /// Description shown on statements.
    pub description: String,
    /// Balance immediately after this row.
    pub balance_after: Decimal,
    /// Party version after this row; strictly increasing per party.
    pub sequence: i64,
    /// What caused the row.
    pub source: LedgerSource,
    /// When the row was written.
    pub created_at: DateTime<Utc>,
}

impl LedgerTransaction {
    /// Returns the signed effect of this row on its balance.
    #[must_use]
    pub fn signed_amount(&self) -> Decimal {
        self.entry_type.signed(self.amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_signed_amount() {
        assert_eq!(EntryType::Credit.signed(dec!(25)), dec!(25));
        assert_eq!(EntryType::Debit.signed(dec!(25)), dec!(-25));
    }

    #[test]
    fn test_from_signed() {
        assert_eq!(EntryType::from_signed(dec!(-40.25)), (EntryType::Debit, dec!(40.25)));
        assert_eq!(EntryType::from_signed(dec!(10)), (EntryType::Credit, dec!(10)));
    }
}
