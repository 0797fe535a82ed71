//! Report generation service.

use rust_decimal::Decimal;
use voyra_shared::types::PartyId;

use super::types::{
    DateRange, InvoiceReport, InvoiceSummary, LedgerReport, LedgerSummary, StatusBucket,
    TicketReport, TicketSummary,
};
use crate::issuance::{DocumentStatus, Invoice, Ticket};
use crate::ledger::{EntryType, LedgerTransaction};

/// Service for aggregating persisted documents and ledger rows.
pub struct ReportService;

impl ReportService {
    /// Sums a set of invoices. Empty input yields zero totals.
    #[must_use]
    pub fn summarize_invoices(invoices: &[Invoice]) -> InvoiceSummary {
        let mut summary = InvoiceSummary::default();
        for invoice in invoices {
            summary.count += 1;
            summary.subtotal += invoice.subtotal;
            summary.discount += invoice.discount_amount;
            summary.deposit_used += invoice.deposit_used;
            summary.agent_credit_used += invoice.agent_credit_used;
            summary.total_invoiced += invoice.total;
            summary.vendor_cost += invoice.vendor_cost;
            summary.vendor_balance_deducted += invoice.vendor_balance_deducted;
            summary.profit += invoice.profit_margin();

            let bucket = match invoice.status {
                DocumentStatus::Paid => &mut summary.paid,
                DocumentStatus::Pending => &mut summary.pending,
                DocumentStatus::Cancelled => &mut summary.cancelled,
            };
            Self::add_to_bucket(bucket, invoice.total);
        }
        summary
    }

    /// Sums a set of tickets. Empty input yields zero totals.
    #[must_use]
    pub fn summarize_tickets(tickets: &[Ticket]) -> TicketSummary {
        let mut summary = TicketSummary::default();
        for ticket in tickets {
            summary.count += 1;
            summary.face_value += ticket.face_value;
            summary.vendor_price += ticket.vendor_price;
            summary.markup += ticket.middle_class_price;
            summary.deposit_deducted += ticket.deposit_deducted;
            summary.agent_credit_used += ticket.agent_credit_used;
            summary.vendor_balance_deducted += ticket.vendor_balance_deducted;
            summary.total_due += ticket.total;

            let bucket = match ticket.status {
                DocumentStatus::Paid => &mut summary.paid,
                DocumentStatus::Pending => &mut summary.pending,
                DocumentStatus::Cancelled => &mut summary.cancelled,
            };
            Self::add_to_bucket(bucket, ticket.total);
        }
        summary
    }

    /// Sums credits and debits over ledger rows. Empty input yields zeros.
    #[must_use]
    pub fn summarize_ledger(rows: &[LedgerTransaction]) -> LedgerSummary {
        let mut summary = LedgerSummary::default();
        for row in rows {
            summary.count += 1;
            match row.entry_type {
                EntryType::Credit => summary.total_credits += row.amount,
                EntryType::Debit => summary.total_debits += row.amount,
            }
        }
        summary.net_change = summary.total_credits - summary.total_debits;
        summary
    }

    /// Generates an invoice report.
    #[must_use]
    pub fn invoice_report(
        range: DateRange,
        party_id: Option<PartyId>,
        invoices: Vec<Invoice>,
    ) -> InvoiceReport {
        InvoiceReport {
            report_type: "invoices".to_string(),
            range,
            party_id,
            summary: Self::summarize_invoices(&invoices),
            invoices,
        }
    }

    /// Generates a ticket report.
    #[must_use]
    pub fn ticket_report(
        range: DateRange,
        party_id: Option<PartyId>,
        tickets: Vec<Ticket>,
    ) -> TicketReport {
        TicketReport {
            report_type: "tickets".to_string(),
            range,
            party_id,
            summary: Self::summarize_tickets(&tickets),
            tickets,
        }
    }

    /// Generates a ledger report.
    #[must_use]
    pub fn ledger_report(
        range: DateRange,
        party_id: Option<PartyId>,
        transactions: Vec<LedgerTransaction>,
    ) -> LedgerReport {
        LedgerReport {
            report_type: "ledger".to_string(),
            range,
            party_id,
            summary: Self::summarize_ledger(&transactions),
            transactions,
        }
    }

    fn add_to_bucket(bucket: &mut StatusBucket, total: Decimal) {
        bucket.count += 1;
        bucket.total += total;
    }
}
