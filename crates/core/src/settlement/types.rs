//! Settlement input and output types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use voyra_shared::types::{round_money, within_money_range};

use super::error::SettlementError;
use crate::party::{BalanceKind, PartyKind, PartySnapshot};

/// Who a document is billed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomerType {
    /// A walk-in or corporate customer.
    Customer,
    /// A sub-agent; enables the agent-credit stage.
    Agent,
}

impl CustomerType {
    /// Party kind the billed party must have.
    #[must_use]
    pub const fn party_kind(self) -> PartyKind {
        match self {
            Self::Customer => PartyKind::Customer,
            Self::Agent => PartyKind::Agent,
        }
    }

    /// Returns the lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Agent => "agent",
        }
    }
}

/// Which vendor balance, if any, offsets the vendor cost.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VendorBalanceChoice {
    /// Vendor cost is paid in full.
    #[default]
    None,
    /// Draw on the vendor credit line.
    Credit,
    /// Draw on money deposited with the vendor.
    Deposit,
}

impl VendorBalanceChoice {
    /// The vendor balance drawn on, if any.
    #[must_use]
    pub const fn balance_kind(self) -> Option<BalanceKind> {
        match self {
            Self::None => None,
            Self::Credit => Some(BalanceKind::Credit),
            Self::Deposit => Some(BalanceKind::Deposit),
        }
    }

    /// Returns the lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Credit => "credit",
            Self::Deposit => "deposit",
        }
    }
}

/// One billed line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// What was sold.
    pub description: String,
    /// Units sold, at least one.
    pub quantity: u32,
    /// Price per unit.
    pub unit_price: Decimal,
}

impl LineItem {
    /// Unit price at money scale, as it is stored.
    #[must_use]
    pub fn rounded_unit_price(&self) -> Decimal {
        round_money(self.unit_price)
    }

    /// `quantity × unit_price`, using the stored unit price.
    ///
    /// # Errors
    ///
    /// Returns `AmountOutOfRange` if the product does not fit a money column.
    pub fn line_total(&self) -> Result<Decimal, SettlementError> {
        Decimal::from(self.quantity)
            .checked_mul(self.rounded_unit_price())
            .filter(|total| within_money_range(*total))
            .ok_or(SettlementError::AmountOutOfRange { field: "line_total" })
    }
}

/// Everything the calculator needs besides balances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementDraft {
    /// Who the document is billed to.
    pub customer_type: CustomerType,
    /// Billed lines.
    pub line_items: Vec<LineItem>,
    /// Discount in percent; clamped to `0..=100`.
    #[serde(default)]
    pub discount_percent: Decimal,
    /// Draw on the billed party's deposit.
    #[serde(default)]
    pub use_deposit: bool,
    /// Draw on the agent credit line. Ignored for customer documents.
    #[serde(default)]
    pub use_agent_credit: bool,
    /// What the agency owes the vendor.
    #[serde(default)]
    pub vendor_cost: Decimal,
    /// Vendor balance offsetting the vendor cost.
    #[serde(default)]
    pub use_vendor_balance: VendorBalanceChoice,
}

/// Balances available to a settlement at computation time.
///
/// `customer_deposit` is the deposit of whoever is billed, customer or agent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableBalances {
    /// Billed party's deposit balance.
    pub customer_deposit: Decimal,
    /// Agent credit line (zero for customer documents).
    pub agent_credit: Decimal,
    /// Money deposited with the vendor.
    pub vendor_deposit: Decimal,
    /// Credit line the vendor extends.
    pub vendor_credit: Decimal,
}

impl AvailableBalances {
    /// Collects the balances of the billed party and the vendor.
    #[must_use]
    pub fn from_snapshots(billed: Option<&PartySnapshot>, vendor: Option<&PartySnapshot>) -> Self {
        let (customer_deposit, agent_credit) = billed.map_or((Decimal::ZERO, Decimal::ZERO), |p| {
            let credit = if p.kind == PartyKind::Agent {
                p.credit_balance
            } else {
                Decimal::ZERO
            };
            (p.deposit_balance, credit)
        });
        let (vendor_deposit, vendor_credit) = vendor.map_or((Decimal::ZERO, Decimal::ZERO), |v| {
            (v.deposit_balance, v.credit_balance)
        });

        Self {
            customer_deposit,
            agent_credit,
            vendor_deposit,
            vendor_credit,
        }
    }

    /// Vendor balance selected by `choice`.
    #[must_use]
    pub fn vendor_balance(&self, choice: VendorBalanceChoice) -> Decimal {
        match choice {
            VendorBalanceChoice::None => Decimal::ZERO,
            VendorBalanceChoice::Credit => self.vendor_credit,
            VendorBalanceChoice::Deposit => self.vendor_deposit,
        }
    }
}

/// The full monetary breakdown of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementResult {
    /// Sum of line totals.
    pub subtotal: Decimal,
    /// Discount percent actually applied (after clamping).
    pub discount_percent: Decimal,
    /// `subtotal × discount_percent / 100`.
    pub discount_amount: Decimal,
    /// `subtotal − discount_amount`.
    pub amount_after_discount: Decimal,
    /// Drawn from the billed party's deposit.
    pub deposit_used: Decimal,
    /// Drawn from the agent credit line.
    pub agent_credit_used: Decimal,
    /// Still owed by the customer or agent.
    pub total: Decimal,
    /// What the agency owes the vendor.
    pub vendor_cost: Decimal,
    /// Offset against a vendor balance.
    pub vendor_balance_deducted: Decimal,
    /// Which vendor balance the offset came from.
    pub vendor_balance_source: VendorBalanceChoice,
    /// `vendor_cost − vendor_balance_deducted`.
    pub vendor_payable: Decimal,
    /// `total − vendor_cost`; display only.
    pub profit_margin: Decimal,
}

impl SettlementResult {
    /// Tolerance used when checking the total identity.
    pub const ROUNDING_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

    /// Checks `total = subtotal − discount − deposit − agent credit` and
    /// `discount = round(subtotal × percent / 100)`.
    #[must_use]
    pub fn total_identity_holds(&self) -> bool {
        let expected_total =
            self.subtotal - self.discount_amount - self.deposit_used - self.agent_credit_used;
        let expected_discount =
            round_money(self.subtotal * self.discount_percent / Decimal::ONE_HUNDRED);

        (self.total - expected_total).abs() <= Self::ROUNDING_TOLERANCE
            && self.discount_amount == expected_discount
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use voyra_shared::types::PartyId;

    #[test]
    fn test_line_total_uses_stored_unit_price() {
        let line = LineItem {
            description: "Transfer".to_string(),
            quantity: 3,
            unit_price: dec!(10.335),
        };
        assert_eq!(line.rounded_unit_price(), dec!(10.34));
        assert_eq!(line.line_total().unwrap(), dec!(31.02));
    }

    #[test]
    fn test_line_total_overflow_is_an_error() {
        let line = LineItem {
            description: "Charter".to_string(),
            quantity: 2,
            unit_price: Decimal::MAX,
        };
        assert_eq!(
            line.line_total(),
            Err(SettlementError::AmountOutOfRange { field: "line_total" })
        );

        let line = LineItem {
            description: "Charter".to_string(),
            quantity: 10,
            unit_price: dec!(10000000000000),
        };
        assert!(line.line_total().is_err());
    }

    #[test]
    fn test_customer_snapshot_has_no_agent_credit() {
        let customer = PartySnapshot {
            id: PartyId::new(),
            kind: PartyKind::Customer,
            deposit_balance: dec!(300),
            credit_balance: dec!(999),
        };
        let balances = AvailableBalances::from_snapshots(Some(&customer), None);
        assert_eq!(balances.customer_deposit, dec!(300));
        assert_eq!(balances.agent_credit, Decimal::ZERO);
        assert_eq!(balances.vendor_credit, Decimal::ZERO);
    }

    #[test]
    fn test_vendor_balance_selection() {
        let balances = AvailableBalances {
            vendor_deposit: dec!(40),
            vendor_credit: dec!(80),
            ..AvailableBalances::default()
        };
        assert_eq!(balances.vendor_balance(VendorBalanceChoice::None), Decimal::ZERO);
        assert_eq!(balances.vendor_balance(VendorBalanceChoice::Credit), dec!(80));
        assert_eq!(balances.vendor_balance(VendorBalanceChoice::Deposit), dec!(40));
    }

    #[test]
    fn test_rounding_tolerance_is_one_cent() {
        assert_eq!(SettlementResult::ROUNDING_TOLERANCE, dec!(0.01));
    }

    #[test]
    fn test_customer_type_maps_to_party_kind() {
        assert_eq!(CustomerType::Customer.party_kind(), PartyKind::Customer);
        assert_eq!(CustomerType::Agent.party_kind(), PartyKind::Agent);
    }
}
