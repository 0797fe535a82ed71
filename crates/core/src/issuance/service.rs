//! Issuance planning.
//!
//! Pure business logic shared by invoice and ticket issuance: validate the
//! draft, recompute the settlement from balances read inside the caller's
//! unit of work, and turn every non-zero draw into a ledger debit.

use rust_decimal::Decimal;
use voyra_shared::types::{InvoiceId, TicketId, within_money_range};

use super::error::IssuanceError;
use super::types::{
    BalanceDeduction, DocumentStatus, InvoiceDraft, IssuancePlan, PaymentMethod, TicketDraft,
};
use crate::ledger::LedgerSource;
use crate::party::{BalanceKind, PartyKind, PartySnapshot};
use crate::settlement::{
    AvailableBalances, CustomerType, LineItem, SettlementDraft, SettlementError,
    compute_settlement,
};

/// Service for validating drafts and planning their balance draws.
pub struct IssuanceService;

impl IssuanceService {
    /// Validates an invoice draft. No side effects.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure found.
    pub fn validate_invoice(draft: &InvoiceDraft) -> Result<(), IssuanceError> {
        if draft.line_items.is_empty() {
            return Err(IssuanceError::NoLineItems);
        }
        Self::validate_lines(&draft.line_items)?;
        Self::validate_vendor_cost(draft.vendor_cost)?;
        if draft.issued_by.trim().is_empty() {
            return Err(IssuanceError::MissingIssuer);
        }
        Ok(())
    }

    /// Validates a ticket draft. No side effects.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure found.
    pub fn validate_ticket(draft: &TicketDraft) -> Result<(), IssuanceError> {
        if draft.passenger_name.trim().is_empty() {
            return Err(IssuanceError::MissingPassengerName);
        }
        if draft.face_value <= Decimal::ZERO {
            return Err(IssuanceError::InvalidFaceValue);
        }
        Self::check_range("face_value", draft.face_value)?;
        if draft.vendor_price < Decimal::ZERO {
            return Err(IssuanceError::NegativeVendorPrice);
        }
        Self::check_range("vendor_price", draft.vendor_price)?;
        if draft.issued_by.trim().is_empty() {
            return Err(IssuanceError::MissingIssuer);
        }
        Ok(())
    }

    /// Validates the amounts of a settlement preview.
    ///
    /// Runs the same line and vendor-cost checks as issuance. A preview may
    /// have no lines yet.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure found.
    pub fn validate_preview(draft: &SettlementDraft) -> Result<(), IssuanceError> {
        Self::validate_lines(&draft.line_items)?;
        Self::validate_vendor_cost(draft.vendor_cost)
    }

    fn validate_lines(lines: &[LineItem]) -> Result<(), IssuanceError> {
        for (position, line) in lines.iter().enumerate() {
            if line.description.trim().is_empty() {
                return Err(IssuanceError::EmptyLineDescription { position });
            }
            if line.quantity < 1 || i32::try_from(line.quantity).is_err() {
                return Err(IssuanceError::InvalidQuantity { position });
            }
            if line.unit_price < Decimal::ZERO {
                return Err(IssuanceError::NegativeUnitPrice { position });
            }
            Self::check_range("unit_price", line.unit_price)?;
        }
        Ok(())
    }

    fn validate_vendor_cost(vendor_cost: Decimal) -> Result<(), IssuanceError> {
        if vendor_cost < Decimal::ZERO {
            return Err(IssuanceError::NegativeVendorCost);
        }
        Self::check_range("vendor_cost", vendor_cost)
    }

    fn check_range(field: &'static str, amount: Decimal) -> Result<(), IssuanceError> {
        if within_money_range(amount) {
            Ok(())
        } else {
            Err(SettlementError::AmountOutOfRange { field }.into())
        }
    }

    /// Plans an invoice against the current balances of its parties.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed draft, or
    /// `PartyKindMismatch` if a party does not fit its role.
    pub fn plan_invoice(
        draft: &InvoiceDraft,
        customer: &PartySnapshot,
        vendor: &PartySnapshot,
        invoice_id: InvoiceId,
    ) -> Result<IssuancePlan, IssuanceError> {
        Self::validate_invoice(draft)?;
        Self::plan(
            &draft.settlement_draft(),
            draft.payment_method,
            customer,
            vendor,
            LedgerSource::Invoice(invoice_id),
        )
    }

    /// Plans a ticket against the current balances of its parties.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed draft, or
    /// `PartyKindMismatch` if a party does not fit its role.
    pub fn plan_ticket(
        draft: &TicketDraft,
        customer: &PartySnapshot,
        vendor: &PartySnapshot,
        ticket_id: TicketId,
    ) -> Result<IssuancePlan, IssuanceError> {
        Self::validate_ticket(draft)?;
        Self::plan(
            &draft.settlement_draft(),
            draft.payment_method,
            customer,
            vendor,
            LedgerSource::Ticket(ticket_id),
        )
    }

    /// Checks that both parties fit their roles on a document.
    ///
    /// # Errors
    ///
    /// Returns `PartyKindMismatch` for the first party that does not.
    pub fn check_parties(
        customer_type: CustomerType,
        customer: &PartySnapshot,
        vendor: &PartySnapshot,
    ) -> Result<(), IssuanceError> {
        let expected = customer_type.party_kind();
        if customer.kind != expected {
            return Err(IssuanceError::PartyKindMismatch {
                party_id: customer.id.into_inner(),
                expected,
                actual: customer.kind,
            });
        }
        if vendor.kind != PartyKind::Vendor {
            return Err(IssuanceError::PartyKindMismatch {
                party_id: vendor.id.into_inner(),
                expected: PartyKind::Vendor,
                actual: vendor.kind,
            });
        }
        Ok(())
    }

    fn plan(
        settlement_draft: &SettlementDraft,
        payment_method: PaymentMethod,
        customer: &PartySnapshot,
        vendor: &PartySnapshot,
        source: LedgerSource,
    ) -> Result<IssuancePlan, IssuanceError> {
        Self::check_parties(settlement_draft.customer_type, customer, vendor)?;

        let balances = AvailableBalances::from_snapshots(Some(customer), Some(vendor));
        let settlement = compute_settlement(settlement_draft, &balances)?;
        let label = match source {
            LedgerSource::Invoice(id) => format!("Invoice {id}"),
            LedgerSource::Ticket(id) => format!("Ticket {id}"),
            LedgerSource::Manual | LedgerSource::Opening => String::from("Adjustment"),
        };

        let mut deductions = Vec::with_capacity(3);
        if settlement.deposit_used > Decimal::ZERO {
            deductions.push(BalanceDeduction {
                party_id: customer.id,
                party_kind: customer.kind,
                balance_kind: BalanceKind::Deposit,
                amount: settlement.deposit_used,
                description: format!("{label}: deposit used"),
                source,
            });
        }
        if settlement.agent_credit_used > Decimal::ZERO {
            deductions.push(BalanceDeduction {
                party_id: customer.id,
                party_kind: customer.kind,
                balance_kind: BalanceKind::Credit,
                amount: settlement.agent_credit_used,
                description: format!("{label}: agent credit used"),
                source,
            });
        }
        if let Some(balance_kind) = settlement.vendor_balance_source.balance_kind()
            && settlement.vendor_balance_deducted > Decimal::ZERO
        {
            deductions.push(BalanceDeduction {
                party_id: vendor.id,
                party_kind: vendor.kind,
                balance_kind,
                amount: settlement.vendor_balance_deducted,
                description: format!("{label}: vendor {balance_kind} deducted"),
                source,
            });
        }

        let status = DocumentStatus::initial_for(payment_method, settlement.total);

        Ok(IssuancePlan {
            settlement,
            deductions,
            status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settlement::VendorBalanceChoice;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use voyra_shared::types::{MAX_MONEY, PartyId};

    fn snapshot(kind: PartyKind, deposit: Decimal, credit: Decimal) -> PartySnapshot {
        PartySnapshot {
            id: PartyId::new(),
            kind,
            deposit_balance: deposit,
            credit_balance: credit,
        }
    }

    fn invoice_draft(customer: &PartySnapshot, vendor: &PartySnapshot) -> InvoiceDraft {
        InvoiceDraft {
            customer_type: CustomerType::Customer,
            customer_id: customer.id,
            vendor_id: vendor.id,
            line_items: vec![LineItem {
                description: "Cox's Bazar package".to_string(),
                quantity: 2,
                unit_price: dec!(500),
            }],
            discount_percent: dec!(10),
            use_deposit: true,
            use_agent_credit: false,
            vendor_cost: dec!(700),
            use_vendor_balance: VendorBalanceChoice::Deposit,
            payment_method: PaymentMethod::Credit,
            issued_by: "desk-1".to_string(),
            notes: None,
        }
    }

    fn ticket_draft(customer: &PartySnapshot, vendor: &PartySnapshot) -> TicketDraft {
        TicketDraft {
            customer_type: CustomerType::Agent,
            customer_id: customer.id,
            vendor_id: vendor.id,
            invoice_id: None,
            passenger_name: "N. Ahmed".to_string(),
            airline: "QR".to_string(),
            route: "DAC-DOH".to_string(),
            travel_date: NaiveDate::from_ymd_opt(2026, 12, 1).unwrap(),
            face_value: dec!(480),
            vendor_price: dec!(430),
            use_deposit: false,
            use_agent_credit: true,
            use_vendor_balance: VendorBalanceChoice::Credit,
            payment_method: PaymentMethod::Cash,
            issued_by: "desk-2".to_string(),
        }
    }

    #[test]
    fn test_plan_invoice_produces_deductions_in_order() {
        let customer = snapshot(PartyKind::Customer, dec!(300), Decimal::ZERO);
        let vendor = snapshot(PartyKind::Vendor, dec!(250), dec!(1000));
        let draft = invoice_draft(&customer, &vendor);

        let invoice_id = InvoiceId::new();
        let plan = IssuanceService::plan_invoice(&draft, &customer, &vendor, invoice_id).unwrap();

        assert_eq!(plan.settlement.total, dec!(600));
        assert_eq!(plan.status, DocumentStatus::Pending);
        assert_eq!(plan.deductions.len(), 2);

        let deposit = &plan.deductions[0];
        assert_eq!(deposit.party_id, customer.id);
        assert_eq!(deposit.balance_kind, BalanceKind::Deposit);
        assert_eq!(deposit.amount, dec!(300));
        assert_eq!(deposit.description, format!("Invoice {invoice_id}: deposit used"));
        assert_eq!(deposit.source, LedgerSource::Invoice(invoice_id));

        let vendor_draw = &plan.deductions[1];
        assert_eq!(vendor_draw.party_id, vendor.id);
        assert_eq!(vendor_draw.balance_kind, BalanceKind::Deposit);
        assert_eq!(vendor_draw.amount, dec!(250));
        assert_eq!(
            vendor_draw.description,
            format!("Invoice {invoice_id}: vendor deposit deducted")
        );
    }

    #[test]
    fn test_plan_skips_zero_draws() {
        let customer = snapshot(PartyKind::Customer, Decimal::ZERO, Decimal::ZERO);
        let vendor = snapshot(PartyKind::Vendor, Decimal::ZERO, Decimal::ZERO);
        let draft = invoice_draft(&customer, &vendor);

        let plan =
            IssuanceService::plan_invoice(&draft, &customer, &vendor, InvoiceId::new()).unwrap();

        assert!(plan.deductions.is_empty());
        assert_eq!(plan.settlement.total, dec!(900));
    }

    #[test]
    fn test_plan_ticket_draws_agent_credit_and_vendor_credit() {
        let agent = snapshot(PartyKind::Agent, dec!(1000), dec!(200));
        let vendor = snapshot(PartyKind::Vendor, Decimal::ZERO, dec!(100));
        let draft = ticket_draft(&agent, &vendor);

        let ticket_id = TicketId::new();
        let plan = IssuanceService::plan_ticket(&draft, &agent, &vendor, ticket_id).unwrap();

        assert_eq!(plan.settlement.deposit_used, Decimal::ZERO);
        assert_eq!(plan.settlement.agent_credit_used, dec!(200));
        assert_eq!(plan.settlement.total, dec!(280));
        assert_eq!(plan.settlement.vendor_balance_deducted, dec!(100));
        assert_eq!(plan.status, DocumentStatus::Paid);
        assert_eq!(
            plan.deductions
                .iter()
                .map(|d| (d.balance_kind, d.amount))
                .collect::<Vec<_>>(),
            vec![(BalanceKind::Credit, dec!(200)), (BalanceKind::Credit, dec!(100))]
        );
        assert!(
            plan.deductions
                .iter()
                .all(|d| d.source == LedgerSource::Ticket(ticket_id))
        );
    }

    #[test]
    fn test_party_kind_mismatch() {
        let agent = snapshot(PartyKind::Agent, dec!(10), dec!(10));
        let vendor = snapshot(PartyKind::Vendor, dec!(10), dec!(10));
        let draft = invoice_draft(&agent, &vendor);

        let err = IssuanceService::plan_invoice(&draft, &agent, &vendor, InvoiceId::new())
            .unwrap_err();
        assert!(matches!(
            err,
            IssuanceError::PartyKindMismatch {
                expected: PartyKind::Customer,
                actual: PartyKind::Agent,
                ..
            }
        ));

        let customer = snapshot(PartyKind::Customer, dec!(10), Decimal::ZERO);
        let not_vendor = snapshot(PartyKind::Customer, dec!(10), Decimal::ZERO);
        let err = IssuanceService::plan_invoice(&draft, &customer, &not_vendor, InvoiceId::new())
            .unwrap_err();
        assert!(matches!(
            err,
            IssuanceError::PartyKindMismatch {
                expected: PartyKind::Vendor,
                ..
            }
        ));
    }

    #[test]
    fn test_invoice_validation() {
        let customer = snapshot(PartyKind::Customer, Decimal::ZERO, Decimal::ZERO);
        let vendor = snapshot(PartyKind::Vendor, Decimal::ZERO, Decimal::ZERO);

        let mut draft = invoice_draft(&customer, &vendor);
        draft.line_items.clear();
        assert!(matches!(
            IssuanceService::validate_invoice(&draft),
            Err(IssuanceError::NoLineItems)
        ));

        let mut draft = invoice_draft(&customer, &vendor);
        draft.line_items[0].quantity = 0;
        assert!(matches!(
            IssuanceService::validate_invoice(&draft),
            Err(IssuanceError::InvalidQuantity { position: 0 })
        ));

        let mut draft = invoice_draft(&customer, &vendor);
        draft.line_items[0].unit_price = dec!(-1);
        assert!(matches!(
            IssuanceService::validate_invoice(&draft),
            Err(IssuanceError::NegativeUnitPrice { position: 0 })
        ));

        let mut draft = invoice_draft(&customer, &vendor);
        draft.vendor_cost = dec!(-1);
        assert!(matches!(
            IssuanceService::validate_invoice(&draft),
            Err(IssuanceError::NegativeVendorCost)
        ));

        let mut draft = invoice_draft(&customer, &vendor);
        draft.discount_percent = dec!(250);
        assert!(IssuanceService::validate_invoice(&draft).is_ok());
    }

    #[test]
    fn test_ticket_validation() {
        let agent = snapshot(PartyKind::Agent, Decimal::ZERO, Decimal::ZERO);
        let vendor = snapshot(PartyKind::Vendor, Decimal::ZERO, Decimal::ZERO);

        let mut draft = ticket_draft(&agent, &vendor);
        draft.passenger_name = " ".to_string();
        assert!(matches!(
            IssuanceService::validate_ticket(&draft),
            Err(IssuanceError::MissingPassengerName)
        ));

        let mut draft = ticket_draft(&agent, &vendor);
        draft.face_value = Decimal::ZERO;
        assert!(matches!(
            IssuanceService::validate_ticket(&draft),
            Err(IssuanceError::InvalidFaceValue)
        ));

        let mut draft = ticket_draft(&agent, &vendor);
        draft.vendor_price = dec!(-0.01);
        assert!(matches!(
            IssuanceService::validate_ticket(&draft),
            Err(IssuanceError::NegativeVendorPrice)
        ));
    }

    #[test]
    fn test_oversized_amounts_are_rejected() {
        let customer = snapshot(PartyKind::Customer, Decimal::ZERO, Decimal::ZERO);
        let vendor = snapshot(PartyKind::Vendor, Decimal::ZERO, Decimal::ZERO);

        let mut draft = invoice_draft(&customer, &vendor);
        draft.line_items[0].unit_price = Decimal::MAX;
        let err = IssuanceService::validate_invoice(&draft).unwrap_err();
        assert!(matches!(
            err,
            IssuanceError::Settlement(SettlementError::AmountOutOfRange {
                field: "unit_price"
            })
        ));
        assert_eq!(err.http_status_code(), 400);

        let mut draft = invoice_draft(&customer, &vendor);
        draft.vendor_cost = MAX_MONEY + dec!(0.01);
        assert!(matches!(
            IssuanceService::validate_invoice(&draft),
            Err(IssuanceError::Settlement(SettlementError::AmountOutOfRange {
                field: "vendor_cost"
            }))
        ));

        let mut draft = invoice_draft(&customer, &vendor);
        draft.line_items[0].quantity = u32::MAX;
        assert!(matches!(
            IssuanceService::validate_invoice(&draft),
            Err(IssuanceError::InvalidQuantity { position: 0 })
        ));

        let mut ticket = ticket_draft(&customer, &vendor);
        ticket.face_value = Decimal::MAX;
        assert!(matches!(
            IssuanceService::validate_ticket(&ticket),
            Err(IssuanceError::Settlement(SettlementError::AmountOutOfRange {
                field: "face_value"
            }))
        ));
    }

    #[test]
    fn test_overflowing_subtotal_fails_planning() {
        let customer = snapshot(PartyKind::Customer, Decimal::ZERO, Decimal::ZERO);
        let vendor = snapshot(PartyKind::Vendor, Decimal::ZERO, Decimal::ZERO);
        let mut draft = invoice_draft(&customer, &vendor);
        draft.line_items[0].unit_price = MAX_MONEY;

        assert!(IssuanceService::validate_invoice(&draft).is_ok());
        let err = IssuanceService::plan_invoice(&draft, &customer, &vendor, InvoiceId::new())
            .unwrap_err();
        assert_eq!(err.error_code(), "AMOUNT_OUT_OF_RANGE");
    }

    #[test]
    fn test_preview_validation() {
        let customer = snapshot(PartyKind::Customer, Decimal::ZERO, Decimal::ZERO);
        let vendor = snapshot(PartyKind::Vendor, Decimal::ZERO, Decimal::ZERO);
        let mut preview = invoice_draft(&customer, &vendor).settlement_draft();

        preview.line_items.clear();
        assert!(IssuanceService::validate_preview(&preview).is_ok());

        let mut preview = invoice_draft(&customer, &vendor).settlement_draft();
        preview.line_items[0].unit_price = dec!(-5);
        assert!(matches!(
            IssuanceService::validate_preview(&preview),
            Err(IssuanceError::NegativeUnitPrice { position: 0 })
        ));

        let mut preview = invoice_draft(&customer, &vendor).settlement_draft();
        preview.line_items[0].quantity = 0;
        assert!(matches!(
            IssuanceService::validate_preview(&preview),
            Err(IssuanceError::InvalidQuantity { position: 0 })
        ));
    }
}
