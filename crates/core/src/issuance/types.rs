//! Issuance domain types: drafts, plans, and the issued documents.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use voyra_shared::types::{InvoiceId, InvoiceLineItemId, PartyId, TicketId, round_money};

use crate::ledger::LedgerSource;
use crate::party::{BalanceKind, PartyKind};
use crate::settlement::{
    CustomerType, LineItem, SettlementDraft, SettlementResult, VendorBalanceChoice,
};

/// How the customer settles the amount still owed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Paid in cash at the counter.
    #[default]
    Cash,
    /// Paid by card.
    Card,
    /// Billed on account; stays pending until collected.
    Credit,
}

impl PaymentMethod {
    /// Returns the lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Card => "card",
            Self::Credit => "credit",
        }
    }
}

/// Payment status of an issued document.
///
/// The valid transitions are:
/// - Pending → Paid
/// - Pending → Cancelled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    /// Amount still to be collected.
    Pending,
    /// Fully settled.
    Paid,
    /// Voided by an operator.
    Cancelled,
}

impl DocumentStatus {
    /// Status a freshly issued document starts in.
    #[must_use]
    pub fn initial_for(payment_method: PaymentMethod, total: Decimal) -> Self {
        if payment_method == PaymentMethod::Credit && total > Decimal::ZERO {
            Self::Pending
        } else {
            Self::Paid
        }
    }

    /// Returns true if a document may move from `self` to `next`.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Paid) | (Self::Pending, Self::Cancelled)
        )
    }

    /// Returns the lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A submitted invoice, before the server recomputes anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceDraft {
    /// Who the invoice is billed to.
    pub customer_type: CustomerType,
    /// Billed customer or agent.
    pub customer_id: PartyId,
    /// Vendor supplying the goods.
    pub vendor_id: PartyId,
    /// Billed lines, in order.
    pub line_items: Vec<LineItem>,
    /// Discount in percent.
    #[serde(default)]
    pub discount_percent: Decimal,
    /// Draw on the billed party's deposit.
    #[serde(default)]
    pub use_deposit: bool,
    /// Draw on the agent credit line.
    #[serde(default)]
    pub use_agent_credit: bool,
    /// What the agency owes the vendor.
    #[serde(default)]
    pub vendor_cost: Decimal,
    /// Vendor balance offsetting the vendor cost.
    #[serde(default)]
    pub use_vendor_balance: VendorBalanceChoice,
    /// How the remaining total is paid.
    #[serde(default)]
    pub payment_method: PaymentMethod,
    /// Operator issuing the invoice.
    pub issued_by: String,
    /// Free-form notes printed on the invoice.
    #[serde(default)]
    pub notes: Option<String>,
}

impl InvoiceDraft {
    /// The calculator input for this draft.
    #[must_use]
    pub fn settlement_draft(&self) -> SettlementDraft {
        SettlementDraft {
            customer_type: self.customer_type,
            line_items: self.line_items.clone(),
            discount_percent: self.discount_percent,
            use_deposit: self.use_deposit,
            use_agent_credit: self.use_agent_credit,
            vendor_cost: self.vendor_cost,
            use_vendor_balance: self.use_vendor_balance,
        }
    }
}

/// A submitted ticket sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketDraft {
    /// Who the ticket is billed to.
    pub customer_type: CustomerType,
    /// Billed customer or agent.
    pub customer_id: PartyId,
    /// Consolidator or airline the fare was bought from.
    pub vendor_id: PartyId,
    /// Invoice this ticket belongs to, if any.
    #[serde(default)]
    pub invoice_id: Option<InvoiceId>,
    /// Passenger on the ticket.
    pub passenger_name: String,
    /// Operating airline.
    pub airline: String,
    /// Route, e.g. `DAC-DXB`.
    pub route: String,
    /// Date of travel.
    pub travel_date: NaiveDate,
    /// Price charged to the customer.
    pub face_value: Decimal,
    /// Price paid to the vendor.
    pub vendor_price: Decimal,
    /// Draw on the billed party's deposit.
    #[serde(default)]
    pub use_deposit: bool,
    /// Draw on the agent credit line.
    #[serde(default)]
    pub use_agent_credit: bool,
    /// Vendor balance offsetting the vendor price.
    #[serde(default)]
    pub use_vendor_balance: VendorBalanceChoice,
    /// How the remaining total is paid.
    #[serde(default)]
    pub payment_method: PaymentMethod,
    /// Operator issuing the ticket.
    pub issued_by: String,
}

impl TicketDraft {
    /// A ticket settles as a single `1 × face_value` line with no discount.
    #[must_use]
    pub fn settlement_draft(&self) -> SettlementDraft {
        SettlementDraft {
            customer_type: self.customer_type,
            line_items: vec![LineItem {
                description: format!("{} {} ({})", self.airline, self.route, self.passenger_name),
                quantity: 1,
                unit_price: self.face_value,
            }],
            discount_percent: Decimal::ZERO,
            use_deposit: self.use_deposit,
            use_agent_credit: self.use_agent_credit,
            vendor_cost: self.vendor_price,
            use_vendor_balance: self.use_vendor_balance,
        }
    }

    /// Markup over the vendor price; negative for loss-making fares.
    ///
    /// Both prices are rounded first, so the markup is exactly the
    /// difference of the stored face value and vendor price.
    #[must_use]
    pub fn middle_class_price(&self) -> Decimal {
        round_money(self.face_value) - round_money(self.vendor_price)
    }
}

/// One balance draw an issuance has to apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceDeduction {
    /// Party whose balance is drawn.
    pub party_id: PartyId,
    /// Kind of that party.
    pub party_kind: PartyKind,
    /// Which balance is drawn.
    pub balance_kind: BalanceKind,
    /// Positive amount to debit.
    pub amount: Decimal,
    /// Ledger description.
    pub description: String,
    /// Document the draw belongs to.
    pub source: LedgerSource,
}

/// The recomputed settlement plus the draws it implies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuancePlan {
    /// Server-side settlement.
    pub settlement: SettlementResult,
    /// Non-zero draws, in waterfall order.
    pub deductions: Vec<BalanceDeduction>,
    /// Status the document starts in.
    pub status: DocumentStatus,
}

/// An issued invoice line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceLine {
    /// Line ID.
    pub id: InvoiceLineItemId,
    /// Zero-based position on the invoice.
    pub position: i32,
    /// What was sold.
    pub description: String,
    /// Units sold.
    pub quantity: u32,
    /// Price per unit.
    pub unit_price: Decimal,
    /// `quantity × unit_price`.
    pub line_total: Decimal,
}

/// An issued invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    /// Invoice ID.
    pub id: InvoiceId,
    /// Who the invoice is billed to.
    pub customer_type: CustomerType,
    /// Billed customer or agent.
    pub customer_id: PartyId,
    /// Vendor supplying the goods.
    pub vendor_id: PartyId,
    /// Billed lines, in order.
    pub lines: Vec<InvoiceLine>,
    /// Sum of line totals.
    pub subtotal: Decimal,
    /// Discount percent applied.
    pub discount_percent: Decimal,
    /// Discount amount.
    pub discount_amount: Decimal,
    /// Drawn from the billed party's deposit.
    pub deposit_used: Decimal,
    /// Drawn from the agent credit line.
    pub agent_credit_used: Decimal,
    /// What the agency owes the vendor.
    pub vendor_cost: Decimal,
    /// Offset against a vendor balance.
    pub vendor_balance_deducted: Decimal,
    /// Which vendor balance was used.
    pub use_vendor_balance: VendorBalanceChoice,
    /// Still owed by the customer or agent.
    pub total: Decimal,
    /// How the total is paid.
    pub payment_method: PaymentMethod,
    /// Payment status.
    pub status: DocumentStatus,
    /// Operator who issued the invoice.
    pub issued_by: String,
    /// Free-form notes.
    pub notes: Option<String>,
    /// When the invoice was issued.
    pub created_at: DateTime<Utc>,
    /// Last status change.
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    /// `total − vendor_cost`.
    #[must_use]
    pub fn profit_margin(&self) -> Decimal {
        self.total - self.vendor_cost
    }
}

/// An issued airline ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Ticket ID.
    pub id: TicketId,
    /// Who the ticket is billed to.
    pub customer_type: CustomerType,
    /// Billed customer or agent.
    pub customer_id: PartyId,
    /// Vendor the fare was bought from.
    pub vendor_id: PartyId,
    /// Linked invoice, if any.
    pub invoice_id: Option<InvoiceId>,
    /// Passenger on the ticket.
    pub passenger_name: String,
    /// Operating airline.
    pub airline: String,
    /// Route.
    pub route: String,
    /// Date of travel.
    pub travel_date: NaiveDate,
    /// Price charged to the customer.
    pub face_value: Decimal,
    /// Price paid to the vendor.
    pub vendor_price: Decimal,
    /// `face_value − vendor_price`.
    pub middle_class_price: Decimal,
    /// Drawn from the billed party's deposit.
    pub deposit_deducted: Decimal,
    /// Drawn from the agent credit line.
    pub agent_credit_used: Decimal,
    /// Offset against a vendor balance.
    pub vendor_balance_deducted: Decimal,
    /// Which vendor balance was used.
    pub use_vendor_balance: VendorBalanceChoice,
    /// Still owed by the customer or agent.
    pub total: Decimal,
    /// How the total is paid.
    pub payment_method: PaymentMethod,
    /// Payment status.
    pub status: DocumentStatus,
    /// Operator who issued the ticket.
    pub issued_by: String,
    /// When the ticket was issued.
    pub created_at: DateTime<Utc>,
}
