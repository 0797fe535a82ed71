//! Entity model to read model conversions.
//!
//! SQLite hands decimals back through `f64`, so every amount read from the
//! store is re-rounded to cents before it reaches the domain.

use chrono::Utc;
use sea_orm::DbErr;
use voyra_core::issuance::{Invoice, InvoiceLine, Ticket};
use voyra_core::ledger::{LedgerSource, LedgerTransaction};
use voyra_core::party::{Party, PartySnapshot};
use voyra_shared::types::{
    InvoiceId, InvoiceLineItemId, LedgerTransactionId, PartyId, TicketId, round_money,
};

use crate::entities::sea_orm_active_enums::LedgerSourceKind;
use crate::entities::{invoice_line_items, invoices, ledger_transactions, parties, tickets};

pub(crate) fn party(model: parties::Model) -> Party {
    Party {
        id: PartyId::from_uuid(model.id),
        kind: model.kind.into(),
        name: model.name,
        email: model.email,
        phone: model.phone,
        address: model.address,
        deposit_balance: round_money(model.deposit_balance),
        credit_balance: round_money(model.credit_balance),
        created_at: model.created_at.with_timezone(&Utc),
    }
}

pub(crate) fn snapshot(model: &parties::Model) -> PartySnapshot {
    PartySnapshot {
        id: PartyId::from_uuid(model.id),
        kind: model.kind.into(),
        deposit_balance: round_money(model.deposit_balance),
        credit_balance: round_money(model.credit_balance),
    }
}

pub(crate) fn source_columns(source: LedgerSource) -> (LedgerSourceKind, Option<uuid::Uuid>) {
    match source {
        LedgerSource::Manual => (LedgerSourceKind::Manual, None),
        LedgerSource::Opening => (LedgerSourceKind::Opening, None),
        LedgerSource::Invoice(id) => (LedgerSourceKind::Invoice, Some(id.into_inner())),
        LedgerSource::Ticket(id) => (LedgerSourceKind::Ticket, Some(id.into_inner())),
    }
}

fn source(
    kind: LedgerSourceKind,
    id: Option<uuid::Uuid>,
    row: uuid::Uuid,
) -> Result<LedgerSource, DbErr> {
    match (kind, id) {
        (LedgerSourceKind::Manual, _) => Ok(LedgerSource::Manual),
        (LedgerSourceKind::Opening, _) => Ok(LedgerSource::Opening),
        (LedgerSourceKind::Invoice, Some(id)) => Ok(LedgerSource::Invoice(InvoiceId::from_uuid(id))),
        (LedgerSourceKind::Ticket, Some(id)) => Ok(LedgerSource::Ticket(TicketId::from_uuid(id))),
        (LedgerSourceKind::Invoice | LedgerSourceKind::Ticket, None) => Err(DbErr::Custom(
            format!("ledger row {row} references a document without an id"),
        )),
    }
}

pub(crate) fn ledger_transaction(
    model: ledger_transactions::Model,
) -> Result<LedgerTransaction, DbErr> {
    Ok(LedgerTransaction {
        id: LedgerTransactionId::from_uuid(model.id),
        party_id: PartyId::from_uuid(model.party_id),
        party_kind: model.party_kind.into(),
        balance_kind: model.balance_kind.into(),
        entry_type: model.entry_type.into(),
        amount: round_money(model.amount),
        description: model.description,
        balance_after: round_money(model.balance_after),
        sequence: model.sequence,
        source: source(model.source_kind, model.source_id, model.id)?,
        created_at: model.created_at.with_timezone(&Utc),
    })
}

fn invoice_line(model: invoice_line_items::Model) -> Result<InvoiceLine, DbErr> {
    let quantity = u32::try_from(model.quantity).map_err(|_| {
        DbErr::Custom(format!(
            "invoice line {} has invalid quantity {}",
            model.id, model.quantity
        ))
    })?;
    Ok(InvoiceLine {
        id: InvoiceLineItemId::from_uuid(model.id),
        position: model.position,
        description: model.description,
        quantity,
        unit_price: round_money(model.unit_price),
        line_total: round_money(model.line_total),
    })
}

pub(crate) fn invoice(
    model: invoices::Model,
    mut lines: Vec<invoice_line_items::Model>,
) -> Result<Invoice, DbErr> {
    lines.sort_by_key(|line| line.position);
    let lines = lines
        .into_iter()
        .map(invoice_line)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Invoice {
        id: InvoiceId::from_uuid(model.id),
        customer_type: model.customer_type.into(),
        customer_id: PartyId::from_uuid(model.customer_id),
        vendor_id: PartyId::from_uuid(model.vendor_id),
        lines,
        subtotal: round_money(model.subtotal),
        discount_percent: model.discount_percent.round_dp(4),
        discount_amount: round_money(model.discount_amount),
        deposit_used: round_money(model.deposit_used),
        agent_credit_used: round_money(model.agent_credit_used),
        vendor_cost: round_money(model.vendor_cost),
        vendor_balance_deducted: round_money(model.vendor_balance_deducted),
        use_vendor_balance: model.use_vendor_balance.into(),
        total: round_money(model.total),
        payment_method: model.payment_method.into(),
        status: model.status.into(),
        issued_by: model.issued_by,
        notes: model.notes,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    })
}

pub(crate) fn ticket(model: tickets::Model) -> Ticket {
    Ticket {
        id: TicketId::from_uuid(model.id),
        customer_type: model.customer_type.into(),
        customer_id: PartyId::from_uuid(model.customer_id),
        vendor_id: PartyId::from_uuid(model.vendor_id),
        invoice_id: model.invoice_id.map(InvoiceId::from_uuid),
        passenger_name: model.passenger_name,
        airline: model.airline,
        route: model.route,
        travel_date: model.travel_date,
        face_value: round_money(model.face_value),
        vendor_price: round_money(model.vendor_price),
        middle_class_price: round_money(model.middle_class_price),
        deposit_deducted: round_money(model.deposit_deducted),
        agent_credit_used: round_money(model.agent_credit_used),
        vendor_balance_deducted: round_money(model.vendor_balance_deducted),
        use_vendor_balance: model.use_vendor_balance.into(),
        total: round_money(model.total),
        payment_method: model.payment_method.into(),
        status: model.status.into(),
        issued_by: model.issued_by,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
