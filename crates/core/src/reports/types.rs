//! Report data types.

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use voyra_shared::types::PartyId;

use super::error::ReportError;
use crate::issuance::{Invoice, Ticket};
use crate::ledger::LedgerTransaction;

/// Named reporting interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "period", rename_all = "snake_case")]
pub enum ReportPeriod {
    /// The reference day.
    Today,
    /// Monday through Sunday of the reference week.
    ThisWeek,
    /// The reference calendar month.
    ThisMonth,
    /// The reference calendar year.
    ThisYear,
    /// An explicit inclusive range.
    Custom {
        /// First day.
        from: NaiveDate,
        /// Last day.
        to: NaiveDate,
    },
}

impl ReportPeriod {
    /// Builds a period from its query-string name and optional bounds.
    ///
    /// # Errors
    ///
    /// Returns `UnknownPeriod` for an unrecognised name and
    /// `IncompleteCustomRange` for `custom` without both bounds.
    pub fn parse(
        name: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Self, ReportError> {
        match name.to_lowercase().as_str() {
            "today" => Ok(Self::Today),
            "this_week" => Ok(Self::ThisWeek),
            "this_month" => Ok(Self::ThisMonth),
            "this_year" => Ok(Self::ThisYear),
            "custom" => match (from, to) {
                (Some(from), Some(to)) => Ok(Self::Custom { from, to }),
                _ => Err(ReportError::IncompleteCustomRange),
            },
            other => Err(ReportError::UnknownPeriod(other.to_string())),
        }
    }

    /// Resolves the period against `today` into an inclusive range.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` for a custom range that ends before it
    /// starts.
    pub fn resolve(self, today: NaiveDate) -> Result<DateRange, ReportError> {
        let (from, to) = match self {
            Self::Today => (today, today),
            Self::ThisWeek => {
                let from = today - Days::new(u64::from(today.weekday().num_days_from_monday()));
                (from, from + Days::new(6))
            }
            Self::ThisMonth => {
                let from = today.with_day(1).unwrap_or(today);
                let next_month = from
                    .checked_add_months(chrono::Months::new(1))
                    .unwrap_or(NaiveDate::MAX);
                (from, next_month.pred_opt().unwrap_or(from))
            }
            Self::ThisYear => (
                NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today),
                NaiveDate::from_ymd_opt(today.year(), 12, 31).unwrap_or(today),
            ),
            Self::Custom { from, to } => (from, to),
        };
        DateRange::new(from, to)
    }
}

/// Inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// First day.
    pub from: NaiveDate,
    /// Last day.
    pub to: NaiveDate,
}

impl DateRange {
    /// Creates a range.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` if `from` is after `to`.
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self, ReportError> {
        if from > to {
            return Err(ReportError::InvalidDateRange {
                start: from,
                end: to,
            });
        }
        Ok(Self { from, to })
    }

    /// Returns true if `date` falls inside the range.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }

    /// Start of the first day, UTC.
    #[must_use]
    pub fn start(&self) -> DateTime<Utc> {
        self.from.and_time(NaiveTime::MIN).and_utc()
    }

    /// Start of the day after the last day, UTC; exclusive upper bound.
    #[must_use]
    pub fn end_exclusive(&self) -> DateTime<Utc> {
        self.to
            .checked_add_days(Days::new(1))
            .unwrap_or(NaiveDate::MAX)
            .and_time(NaiveTime::MIN)
            .and_utc()
    }
}

/// Count and total of documents in one status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusBucket {
    /// Number of documents.
    pub count: u64,
    /// Sum of their totals.
    pub total: Decimal,
}

/// Totals over a set of invoices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceSummary {
    /// Number of invoices.
    pub count: u64,
    /// Sum of subtotals.
    pub subtotal: Decimal,
    /// Sum of discounts.
    pub discount: Decimal,
    /// Sum of deposit draws.
    pub deposit_used: Decimal,
    /// Sum of agent credit draws.
    pub agent_credit_used: Decimal,
    /// Sum of totals still owed at issuance.
    pub total_invoiced: Decimal,
    /// Sum of vendor costs.
    pub vendor_cost: Decimal,
    /// Sum of vendor balance offsets.
    pub vendor_balance_deducted: Decimal,
    /// Sum of profit margins.
    pub profit: Decimal,
    /// Paid invoices.
    pub paid: StatusBucket,
    /// Pending invoices.
    pub pending: StatusBucket,
    /// Cancelled invoices.
    pub cancelled: StatusBucket,
}

/// Totals over a set of tickets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketSummary {
    /// Number of tickets.
    pub count: u64,
    /// Sum of face values.
    pub face_value: Decimal,
    /// Sum of vendor prices.
    pub vendor_price: Decimal,
    /// Sum of markups.
    pub markup: Decimal,
    /// Sum of deposit draws.
    pub deposit_deducted: Decimal,
    /// Sum of agent credit draws.
    pub agent_credit_used: Decimal,
    /// Sum of vendor balance offsets.
    pub vendor_balance_deducted: Decimal,
    /// Sum of totals still owed at issuance.
    pub total_due: Decimal,
    /// Paid tickets.
    pub paid: StatusBucket,
    /// Pending tickets.
    pub pending: StatusBucket,
    /// Cancelled tickets.
    pub cancelled: StatusBucket,
}

/// Totals over a set of ledger rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSummary {
    /// Number of rows.
    pub count: u64,
    /// Sum of credit amounts.
    pub total_credits: Decimal,
    /// Sum of debit amounts.
    pub total_debits: Decimal,
    /// `total_credits − total_debits`.
    pub net_change: Decimal,
}

/// Invoice report for one range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceReport {
    /// Report type identifier.
    pub report_type: String,
    /// Covered range.
    pub range: DateRange,
    /// Party filter, if any.
    pub party_id: Option<PartyId>,
    /// Totals.
    pub summary: InvoiceSummary,
    /// The invoices, oldest first.
    pub invoices: Vec<Invoice>,
}

/// Ticket report for one range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketReport {
    /// Report type identifier.
    pub report_type: String,
    /// Covered range.
    pub range: DateRange,
    /// Party filter, if any.
    pub party_id: Option<PartyId>,
    /// Totals.
    pub summary: TicketSummary,
    /// The tickets, oldest first.
    pub tickets: Vec<Ticket>,
}

/// Ledger report for one range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerReport {
    /// Report type identifier.
    pub report_type: String,
    /// Covered range.
    pub range: DateRange,
    /// Party filter, if any.
    pub party_id: Option<PartyId>,
    /// Totals.
    pub summary: LedgerSummary,
    /// The rows, in ledger order.
    pub transactions: Vec<LedgerTransaction>,
}
