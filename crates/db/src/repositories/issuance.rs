//! Invoice and ticket issuance.
//!
//! Each issuance is one database transaction: lock both parties, recompute
//! the settlement from their current balances, insert the document, post
//! every deduction through the party ledger store, commit. Anything that
//! fails rolls the whole unit of work back. A lost balance race re-runs it
//! from the new balances, so deductions shrink instead of failing.

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DatabaseTransaction, DbErr,
    EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;
use voyra_core::issuance::{
    DocumentStatus, Invoice, InvoiceDraft, IssuanceError, IssuancePlan, IssuanceService, Ticket,
    TicketDraft,
};
use voyra_core::ledger::LedgerError;
use voyra_core::party::{PartyKind, PartySnapshot};
use voyra_core::reports::DateRange;
use voyra_core::settlement::{
    AvailableBalances, SettlementDraft, SettlementResult, compute_settlement,
};
use voyra_shared::LedgerConfig;
use voyra_shared::types::{InvoiceId, InvoiceLineItemId, PartyId, TicketId};

use super::party_ledger::{PartyLedgerError, PartyLedgerRepository};
use super::retry::with_retry;
use crate::conversions;
use crate::entities::{invoice_line_items, invoices, parties, sea_orm_active_enums, tickets};

/// Error types for issuance operations.
#[derive(Debug, thiserror::Error)]
pub enum IssuanceRepoError {
    /// Issuance rule violated.
    #[error(transparent)]
    Issuance(#[from] IssuanceError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl IssuanceRepoError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Issuance(e) => e.error_code(),
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Issuance(e) => e.http_status_code(),
            Self::Database(_) => 500,
        }
    }

    /// Returns true if the unit of work can be re-run.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Issuance(e) if e.is_retryable())
    }
}

impl From<PartyLedgerError> for IssuanceRepoError {
    fn from(err: PartyLedgerError) -> Self {
        match err {
            PartyLedgerError::Ledger(LedgerError::PartyNotFound(id)) => {
                Self::Issuance(IssuanceError::PartyNotFound(id))
            }
            PartyLedgerError::Ledger(e) => Self::Issuance(e.into()),
            PartyLedgerError::InvalidParty(message) => {
                Self::Issuance(LedgerError::Internal(message).into())
            }
            PartyLedgerError::Database(e) => Self::Database(e),
        }
    }
}

/// Filter options for listing invoices and tickets.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentFilter {
    /// Only documents billed to or supplied by this party.
    pub party_id: Option<PartyId>,
    /// Only documents in this status.
    pub status: Option<DocumentStatus>,
    /// Only documents created inside this range.
    pub range: Option<DateRange>,
}

/// Issuance repository.
#[derive(Debug, Clone)]
pub struct IssuanceRepository {
    db: DatabaseConnection,
    config: LedgerConfig,
}

impl IssuanceRepository {
    /// Creates a new issuance repository with default retry settings.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self::with_config(db, LedgerConfig::default())
    }

    /// Creates a new issuance repository.
    #[must_use]
    pub const fn with_config(db: DatabaseConnection, config: LedgerConfig) -> Self {
        Self { db, config }
    }

    /// Computes a settlement against the parties' current balances.
    ///
    /// Nothing is written. Either party may be left out, in which case its
    /// balances count as zero. Lines and amounts are checked the same way
    /// issuance checks them.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed draft, and
    /// `PartyNotFound` or `PartyKindMismatch` for a given party that does
    /// not exist or does not fit its role.
    pub async fn preview_settlement(
        &self,
        customer_id: Option<PartyId>,
        vendor_id: Option<PartyId>,
        draft: &SettlementDraft,
    ) -> Result<SettlementResult, IssuanceRepoError> {
        IssuanceService::validate_preview(draft)?;

        let customer = match customer_id {
            Some(id) => {
                let snapshot = self.snapshot(id).await?;
                check_role(&snapshot, draft.customer_type.party_kind())?;
                Some(snapshot)
            }
            None => None,
        };
        let vendor = match vendor_id {
            Some(id) => {
                let snapshot = self.snapshot(id).await?;
                check_role(&snapshot, PartyKind::Vendor)?;
                Some(snapshot)
            }
            None => None,
        };

        let balances = AvailableBalances::from_snapshots(customer.as_ref(), vendor.as_ref());
        Ok(compute_settlement(draft, &balances).map_err(IssuanceError::from)?)
    }

    async fn snapshot(&self, party_id: PartyId) -> Result<PartySnapshot, IssuanceRepoError> {
        let model = parties::Entity::find_by_id(party_id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(IssuanceError::PartyNotFound(party_id.into_inner()))?;
        Ok(conversions::snapshot(&model))
    }

    /// Issues an invoice.
    ///
    /// # Errors
    ///
    /// Returns a validation error before anything is written, a party
    /// error if a party is missing or has the wrong kind, or the error that
    /// aborted the unit of work.
    pub async fn issue_invoice(&self, draft: InvoiceDraft) -> Result<Invoice, IssuanceRepoError> {
        IssuanceService::validate_invoice(&draft)?;

        let draft = &draft;
        with_retry("issue_invoice", self.config.max_issue_attempts, move |_| {
            self.try_issue_invoice(draft)
        })
        .await
    }

    async fn try_issue_invoice(&self, draft: &InvoiceDraft) -> Result<Invoice, IssuanceRepoError> {
        let txn = self.db.begin().await?;

        let locked = lock_parties(&txn, draft.customer_id, draft.vendor_id).await?;
        let (customer, vendor) = (locked.customer, locked.vendor);
        let invoice_id = InvoiceId::new();
        let plan = IssuanceService::plan_invoice(draft, &customer, &vendor, invoice_id)?;
        let settlement = &plan.settlement;

        let now = Utc::now().into();
        let model = invoices::ActiveModel {
            id: Set(invoice_id.into_inner()),
            customer_type: Set(draft.customer_type.into()),
            customer_id: Set(draft.customer_id.into_inner()),
            vendor_id: Set(draft.vendor_id.into_inner()),
            subtotal: Set(settlement.subtotal),
            discount_percent: Set(settlement.discount_percent),
            discount_amount: Set(settlement.discount_amount),
            deposit_used: Set(settlement.deposit_used),
            agent_credit_used: Set(settlement.agent_credit_used),
            vendor_cost: Set(settlement.vendor_cost),
            vendor_balance_deducted: Set(settlement.vendor_balance_deducted),
            use_vendor_balance: Set(settlement.vendor_balance_source.into()),
            total: Set(settlement.total),
            payment_method: Set(draft.payment_method.into()),
            status: Set(plan.status.into()),
            issued_by: Set(draft.issued_by.trim().to_string()),
            notes: Set(draft.notes.clone()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        let mut lines = Vec::with_capacity(draft.line_items.len());
        for (position, item) in draft.line_items.iter().enumerate() {
            let position = i32::try_from(position)
                .map_err(|_| DbErr::Custom("too many invoice lines".to_string()))?;
            let quantity = i32::try_from(item.quantity)
                .map_err(|_| DbErr::Custom(format!("line {position} quantity out of range")))?;
            let line = invoice_line_items::ActiveModel {
                id: Set(InvoiceLineItemId::new().into_inner()),
                invoice_id: Set(invoice_id.into_inner()),
                position: Set(position),
                description: Set(item.description.trim().to_string()),
                quantity: Set(quantity),
                unit_price: Set(item.rounded_unit_price()),
                line_total: Set(item.line_total().map_err(IssuanceError::from)?),
            }
            .insert(&txn)
            .await?;
            lines.push(line);
        }

        apply_deductions(&txn, &plan, locked.versions).await?;

        txn.commit().await?;

        info!(
            invoice_id = %invoice_id,
            customer_id = %draft.customer_id,
            vendor_id = %draft.vendor_id,
            subtotal = %settlement.subtotal,
            total = %settlement.total,
            deductions = plan.deductions.len(),
            status = %plan.status,
            "Invoice issued"
        );

        Ok(conversions::invoice(model, lines)?)
    }

    /// Issues a ticket.
    ///
    /// # Errors
    ///
    /// Returns a validation error before anything is written, a party
    /// error if a party is missing or has the wrong kind, `InvoiceNotFound`
    /// for a link to an unknown invoice, or the error that aborted the unit
    /// of work.
    pub async fn issue_ticket(&self, draft: TicketDraft) -> Result<Ticket, IssuanceRepoError> {
        IssuanceService::validate_ticket(&draft)?;

        let draft = &draft;
        with_retry("issue_ticket", self.config.max_issue_attempts, move |_| {
            self.try_issue_ticket(draft)
        })
        .await
    }

    async fn try_issue_ticket(&self, draft: &TicketDraft) -> Result<Ticket, IssuanceRepoError> {
        let txn = self.db.begin().await?;

        if let Some(invoice_id) = draft.invoice_id {
            invoices::Entity::find_by_id(invoice_id.into_inner())
                .one(&txn)
                .await?
                .ok_or(IssuanceError::InvoiceNotFound(invoice_id.into_inner()))?;
        }

        let locked = lock_parties(&txn, draft.customer_id, draft.vendor_id).await?;
        let (customer, vendor) = (locked.customer, locked.vendor);
        let ticket_id = TicketId::new();
        let plan = IssuanceService::plan_ticket(draft, &customer, &vendor, ticket_id)?;
        let settlement = &plan.settlement;

        let model = tickets::ActiveModel {
            id: Set(ticket_id.into_inner()),
            customer_type: Set(draft.customer_type.into()),
            customer_id: Set(draft.customer_id.into_inner()),
            vendor_id: Set(draft.vendor_id.into_inner()),
            invoice_id: Set(draft.invoice_id.map(InvoiceId::into_inner)),
            passenger_name: Set(draft.passenger_name.trim().to_string()),
            airline: Set(draft.airline.trim().to_string()),
            route: Set(draft.route.trim().to_string()),
            travel_date: Set(draft.travel_date),
            face_value: Set(settlement.subtotal),
            vendor_price: Set(settlement.vendor_cost),
            middle_class_price: Set(draft.middle_class_price()),
            deposit_deducted: Set(settlement.deposit_used),
            agent_credit_used: Set(settlement.agent_credit_used),
            vendor_balance_deducted: Set(settlement.vendor_balance_deducted),
            use_vendor_balance: Set(settlement.vendor_balance_source.into()),
            total: Set(settlement.total),
            payment_method: Set(draft.payment_method.into()),
            status: Set(plan.status.into()),
            issued_by: Set(draft.issued_by.trim().to_string()),
            created_at: Set(Utc::now().into()),
        }
        .insert(&txn)
        .await?;

        apply_deductions(&txn, &plan, locked.versions).await?;

        txn.commit().await?;

        info!(
            ticket_id = %ticket_id,
            customer_id = %draft.customer_id,
            vendor_id = %draft.vendor_id,
            face_value = %settlement.subtotal,
            total = %settlement.total,
            deductions = plan.deductions.len(),
            status = %plan.status,
            "Ticket issued"
        );

        Ok(conversions::ticket(model))
    }

    /// Gets an invoice with its lines.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceNotFound` if it does not exist.
    pub async fn get_invoice(&self, invoice_id: InvoiceId) -> Result<Invoice, IssuanceRepoError> {
        let model = invoices::Entity::find_by_id(invoice_id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(IssuanceError::InvoiceNotFound(invoice_id.into_inner()))?;

        let lines = invoice_line_items::Entity::find()
            .filter(invoice_line_items::Column::InvoiceId.eq(model.id))
            .order_by_asc(invoice_line_items::Column::Position)
            .all(&self.db)
            .await?;

        Ok(conversions::invoice(model, lines)?)
    }

    /// Gets a ticket.
    ///
    /// # Errors
    ///
    /// Returns `TicketNotFound` if it does not exist.
    pub async fn get_ticket(&self, ticket_id: TicketId) -> Result<Ticket, IssuanceRepoError> {
        let model = tickets::Entity::find_by_id(ticket_id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(IssuanceError::TicketNotFound(ticket_id.into_inner()))?;
        Ok(conversions::ticket(model))
    }

    /// Lists invoices with their lines, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_invoices(
        &self,
        filter: DocumentFilter,
    ) -> Result<Vec<Invoice>, IssuanceRepoError> {
        let mut query = invoices::Entity::find();

        if let Some(party_id) = filter.party_id {
            query = query.filter(
                Condition::any()
                    .add(invoices::Column::CustomerId.eq(party_id.into_inner()))
                    .add(invoices::Column::VendorId.eq(party_id.into_inner())),
            );
        }

        if let Some(status) = filter.status {
            query = query
                .filter(invoices::Column::Status.eq(sea_orm_active_enums::DocumentStatus::from(status)));
        }

        if let Some(range) = filter.range {
            query = query
                .filter(invoices::Column::CreatedAt.gte(range.start()))
                .filter(invoices::Column::CreatedAt.lt(range.end_exclusive()));
        }

        let models = query
            .order_by_asc(invoices::Column::CreatedAt)
            .order_by_asc(invoices::Column::Id)
            .all(&self.db)
            .await?;
        if models.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
        let mut lines_by_invoice: HashMap<Uuid, Vec<invoice_line_items::Model>> = HashMap::new();
        for line in invoice_line_items::Entity::find()
            .filter(invoice_line_items::Column::InvoiceId.is_in(ids))
            .all(&self.db)
            .await?
        {
            lines_by_invoice.entry(line.invoice_id).or_default().push(line);
        }

        models
            .into_iter()
            .map(|model| {
                let lines = lines_by_invoice.remove(&model.id).unwrap_or_default();
                conversions::invoice(model, lines).map_err(IssuanceRepoError::from)
            })
            .collect()
    }

    /// Lists tickets, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_tickets(
        &self,
        filter: DocumentFilter,
    ) -> Result<Vec<Ticket>, IssuanceRepoError> {
        let mut query = tickets::Entity::find();

        if let Some(party_id) = filter.party_id {
            query = query.filter(
                Condition::any()
                    .add(tickets::Column::CustomerId.eq(party_id.into_inner()))
                    .add(tickets::Column::VendorId.eq(party_id.into_inner())),
            );
        }

        if let Some(status) = filter.status {
            query = query
                .filter(tickets::Column::Status.eq(sea_orm_active_enums::DocumentStatus::from(status)));
        }

        if let Some(range) = filter.range {
            query = query
                .filter(tickets::Column::CreatedAt.gte(range.start()))
                .filter(tickets::Column::CreatedAt.lt(range.end_exclusive()));
        }

        let models = query
            .order_by_asc(tickets::Column::CreatedAt)
            .order_by_asc(tickets::Column::Id)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(conversions::ticket).collect())
    }

    /// Moves an invoice to a new status.
    ///
    /// Only `pending → paid` and `pending → cancelled` are allowed. Balances
    /// are not touched.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceNotFound` or `InvalidStatusTransition`.
    pub async fn update_invoice_status(
        &self,
        invoice_id: InvoiceId,
        status: DocumentStatus,
    ) -> Result<Invoice, IssuanceRepoError> {
        let txn = self.db.begin().await?;

        let model = invoices::Entity::find_by_id(invoice_id.into_inner())
            .one(&txn)
            .await?
            .ok_or(IssuanceError::InvoiceNotFound(invoice_id.into_inner()))?;

        let current: DocumentStatus = model.status.into();
        if !current.can_transition_to(status) {
            return Err(IssuanceError::InvalidStatusTransition {
                from: current,
                to: status,
            }
            .into());
        }

        let mut active: invoices::ActiveModel = model.into();
        active.status = Set(status.into());
        active.updated_at = Set(Utc::now().into());
        active.update(&txn).await?;

        txn.commit().await?;

        info!(
            invoice_id = %invoice_id,
            from = %current,
            to = %status,
            "Invoice status updated"
        );

        self.get_invoice(invoice_id).await
    }
}

fn check_role(snapshot: &PartySnapshot, expected: PartyKind) -> Result<(), IssuanceError> {
    if snapshot.kind == expected {
        Ok(())
    } else {
        Err(IssuanceError::PartyKindMismatch {
            party_id: snapshot.id.into_inner(),
            expected,
            actual: snapshot.kind,
        })
    }
}

/// Both parties of a document as read under lock.
struct LockedParties {
    customer: PartySnapshot,
    vendor: PartySnapshot,
    /// Party versions the plan is based on.
    versions: HashMap<PartyId, i64>,
}

/// Reads both parties of a document, locking them in id order.
async fn lock_parties(
    txn: &DatabaseTransaction,
    customer_id: PartyId,
    vendor_id: PartyId,
) -> Result<LockedParties, IssuanceRepoError> {
    let (first, second) = if customer_id.into_inner() <= vendor_id.into_inner() {
        (customer_id, vendor_id)
    } else {
        (vendor_id, customer_id)
    };
    let first = PartyLedgerRepository::read_for_update(txn, first).await?;
    let second = PartyLedgerRepository::read_for_update(txn, second).await?;

    let versions = [&first, &second]
        .into_iter()
        .map(|model| (PartyId::from_uuid(model.id), model.version))
        .collect();
    let (customer, vendor) = if first.id == customer_id.into_inner() {
        (first, second)
    } else {
        (second, first)
    };
    Ok(LockedParties {
        customer: conversions::snapshot(&customer),
        vendor: conversions::snapshot(&vendor),
        versions,
    })
}

/// Posts every draw of the plan, each against the party version it was
/// planned from.
async fn apply_deductions(
    txn: &DatabaseTransaction,
    plan: &IssuancePlan,
    mut versions: HashMap<PartyId, i64>,
) -> Result<(), IssuanceRepoError> {
    for deduction in &plan.deductions {
        let row = PartyLedgerRepository::apply_delta(
            txn,
            deduction.party_id,
            deduction.balance_kind,
            -deduction.amount,
            &deduction.description,
            deduction.source,
            versions.get(&deduction.party_id).copied(),
        )
        .await?;
        versions.insert(deduction.party_id, row.sequence);
    }
    Ok(())
}
