//! Party domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use voyra_shared::types::PartyId;

/// The role a party plays for the agency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartyKind {
    /// End customer buying travel products.
    Customer,
    /// Sub-agent reselling the agency's products.
    Agent,
    /// Supplier (airline consolidator, hotel, tour operator).
    Vendor,
}

impl PartyKind {
    /// Returns true if parties of this kind carry the given balance.
    #[must_use]
    pub const fn supports(self, balance: BalanceKind) -> bool {
        match (self, balance) {
            (_, BalanceKind::Deposit) => true,
            (Self::Customer, BalanceKind::Credit) => false,
            (Self::Agent | Self::Vendor, BalanceKind::Credit) => true,
        }
    }

    /// Returns the lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Agent => "agent",
            Self::Vendor => "vendor",
        }
    }
}

impl std::fmt::Display for PartyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which of a party's balances a ledger row touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BalanceKind {
    /// Money the party has pre-paid or been credited.
    Deposit,
    /// Credit line extended to (agent) or by (vendor) the party.
    Credit,
}

impl BalanceKind {
    /// Returns the lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Deposit => "deposit",
            Self::Credit => "credit",
        }
    }
}

impl std::fmt::Display for BalanceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A party as read from the ledger store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Party {
    /// Party ID.
    pub id: PartyId,
    /// Customer, agent, or vendor.
    pub kind: PartyKind,
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: Option<String>,
    /// Contact phone.
    pub phone: Option<String>,
    /// Postal address.
    pub address: Option<String>,
    /// Current deposit balance.
    pub deposit_balance: Decimal,
    /// Current credit balance (always zero for customers).
    pub credit_balance: Decimal,
    /// When the party was created.
    pub created_at: DateTime<Utc>,
}

impl Party {
    /// Returns the current value of one balance.
    #[must_use]
    pub fn balance(&self, kind: BalanceKind) -> Decimal {
        match kind {
            BalanceKind::Deposit => self.deposit_balance,
            BalanceKind::Credit => self.credit_balance,
        }
    }

    /// Returns the balances needed for settlement.
    #[must_use]
    pub fn snapshot(&self) -> PartySnapshot {
        PartySnapshot {
            id: self.id,
            kind: self.kind,
            deposit_balance: self.deposit_balance,
            credit_balance: self.credit_balance,
        }
    }
}

/// The balances of a party at the moment a settlement is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartySnapshot {
    /// Party ID.
    pub id: PartyId,
    /// Customer, agent, or vendor.
    pub kind: PartyKind,
    /// Deposit balance.
    pub deposit_balance: Decimal,
    /// Credit balance.
    pub credit_balance: Decimal,
}

impl PartySnapshot {
    /// Returns the current value of one balance.
    #[must_use]
    pub fn balance(&self, kind: BalanceKind) -> Decimal {
        match kind {
            BalanceKind::Deposit => self.deposit_balance,
            BalanceKind::Credit => self.credit_balance,
        }
    }
}

/// Input for registering a party.
///
/// Opening balances are posted as credit ledger rows rather than written
/// straight onto the party, so the ledger replays to the stored balance
/// from the very first row.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePartyInput {
    /// Customer, agent, or vendor.
    pub kind: PartyKind,
    /// Display name.
    pub name: String,
    /// Contact email.
    #[serde(default)]
    pub email: Option<String>,
    /// Contact phone.
    #[serde(default)]
    pub phone: Option<String>,
    /// Postal address.
    #[serde(default)]
    pub address: Option<String>,
    /// Opening deposit balance.
    #[serde(default)]
    pub opening_deposit: Decimal,
    /// Opening credit balance (agents and vendors only).
    #[serde(default)]
    pub opening_credit: Decimal,
}
