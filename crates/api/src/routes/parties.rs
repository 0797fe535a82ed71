//! Party and ledger routes.
//!
//! Balances are read here but only ever changed through the ledger store:
//! a manual entry is the one way to move a balance outside of issuance.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use voyra_core::ledger::{EntryType, LedgerEntryInput, LedgerSource};
use voyra_core::party::{BalanceKind, CreatePartyInput, PartyKind};
use voyra_db::LedgerFilter;
use voyra_shared::types::PartyId;

use super::optional_range;
use crate::AppState;
use crate::error::error_response;

/// Creates the party routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/parties", get(list_parties).post(create_party))
        .route("/parties/{party_id}", get(get_party))
        .route("/parties/{party_id}/audit", get(audit_party))
        .route("/parties/{party_id}/transactions", post(apply_transaction))
        .route("/transactions", get(list_transactions))
}

// ============================================================================
// Request Types
// ============================================================================

/// Query parameters for listing parties.
#[derive(Debug, Deserialize)]
pub struct ListPartiesQuery {
    /// Only parties of this kind.
    pub kind: Option<PartyKind>,
}

/// Request body for a manual ledger entry.
#[derive(Debug, Deserialize)]
pub struct ManualEntryRequest {
    /// Balance to move.
    pub balance_kind: BalanceKind,
    /// Credit raises the balance, debit lowers it.
    pub entry_type: EntryType,
    /// Positive amount.
    pub amount: Decimal,
    /// Operator note, e.g. "advance payment".
    pub description: String,
}

/// Query parameters for listing ledger rows.
#[derive(Debug, Deserialize)]
pub struct ListTransactionsQuery {
    /// Only rows for this party.
    pub party_id: Option<PartyId>,
    /// Only rows for this balance.
    pub balance_kind: Option<BalanceKind>,
    /// First day (YYYY-MM-DD).
    pub from: Option<NaiveDate>,
    /// Last day (YYYY-MM-DD).
    pub to: Option<NaiveDate>,
}

// ============================================================================
// Handlers
// ============================================================================

async fn create_party(
    State(state): State<AppState>,
    Json(payload): Json<CreatePartyInput>,
) -> impl IntoResponse {
    match state.party_ledger().create_party(payload).await {
        Ok(party) => (StatusCode::CREATED, Json(party)).into_response(),
        Err(e) => error_response(&e, "Failed to create party"),
    }
}

async fn list_parties(
    State(state): State<AppState>,
    Query(query): Query<ListPartiesQuery>,
) -> impl IntoResponse {
    match state.party_ledger().list_parties(query.kind).await {
        Ok(parties) => (StatusCode::OK, Json(json!({ "parties": parties }))).into_response(),
        Err(e) => error_response(&e, "Failed to list parties"),
    }
}

async fn get_party(
    State(state): State<AppState>,
    Path(party_id): Path<PartyId>,
) -> impl IntoResponse {
    match state.party_ledger().get_party(party_id).await {
        Ok(party) => (StatusCode::OK, Json(party)).into_response(),
        Err(e) => error_response(&e, "Failed to get party"),
    }
}

async fn audit_party(
    State(state): State<AppState>,
    Path(party_id): Path<PartyId>,
) -> impl IntoResponse {
    match state.party_ledger().verify_party(party_id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "party_id": party_id, "consistent": true })),
        )
            .into_response(),
        Err(e) => error_response(&e, "Ledger audit failed"),
    }
}

async fn apply_transaction(
    State(state): State<AppState>,
    Path(party_id): Path<PartyId>,
    Json(payload): Json<ManualEntryRequest>,
) -> impl IntoResponse {
    let input = LedgerEntryInput {
        party_id,
        balance_kind: payload.balance_kind,
        entry_type: payload.entry_type,
        amount: payload.amount,
        description: payload.description,
        source: LedgerSource::Manual,
    };

    match state.party_ledger().apply_transaction(input).await {
        Ok(row) => (StatusCode::CREATED, Json(row)).into_response(),
        Err(e) => error_response(&e, "Failed to apply ledger entry"),
    }
}

async fn list_transactions(
    State(state): State<AppState>,
    Query(query): Query<ListTransactionsQuery>,
) -> impl IntoResponse {
    let range = match optional_range(query.from, query.to) {
        Ok(range) => range,
        Err(e) => return error_response(&e, "Invalid date range"),
    };

    let filter = LedgerFilter {
        party_id: query.party_id,
        balance_kind: query.balance_kind,
        range,
    };

    match state.party_ledger().list_transactions(filter).await {
        Ok(rows) => (StatusCode::OK, Json(json!({ "transactions": rows }))).into_response(),
        Err(e) => error_response(&e, "Failed to list transactions"),
    }
}
