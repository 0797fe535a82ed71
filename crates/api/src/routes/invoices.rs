//! Invoice routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use voyra_core::issuance::{DocumentStatus, InvoiceDraft};
use voyra_db::DocumentFilter;
use voyra_shared::types::{InvoiceId, PartyId};

use super::optional_range;
use crate::AppState;
use crate::error::error_response;

/// Creates the invoice routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/invoices", get(list_invoices).post(issue_invoice))
        .route("/invoices/{invoice_id}", get(get_invoice))
        .route("/invoices/{invoice_id}/status", patch(update_status))
}

/// Query parameters for listing invoices and tickets.
#[derive(Debug, Deserialize)]
pub struct DocumentQuery {
    /// Only documents billed to or supplied by this party.
    pub party_id: Option<PartyId>,
    /// Only documents in this status.
    pub status: Option<DocumentStatus>,
    /// First day (YYYY-MM-DD).
    pub from: Option<NaiveDate>,
    /// Last day (YYYY-MM-DD).
    pub to: Option<NaiveDate>,
}

/// Request body for a status change.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    /// Target status.
    pub status: DocumentStatus,
}

async fn issue_invoice(
    State(state): State<AppState>,
    Json(draft): Json<InvoiceDraft>,
) -> impl IntoResponse {
    match state.issuance().issue_invoice(draft).await {
        Ok(invoice) => (StatusCode::CREATED, Json(invoice)).into_response(),
        Err(e) => error_response(&e, "Failed to issue invoice"),
    }
}

async fn list_invoices(
    State(state): State<AppState>,
    Query(query): Query<DocumentQuery>,
) -> impl IntoResponse {
    let range = match optional_range(query.from, query.to) {
        Ok(range) => range,
        Err(e) => return error_response(&e, "Invalid date range"),
    };

    let filter = DocumentFilter {
        party_id: query.party_id,
        status: query.status,
        range,
    };

    match state.issuance().list_invoices(filter).await {
        Ok(invoices) => (StatusCode::OK, Json(json!({ "invoices": invoices }))).into_response(),
        Err(e) => error_response(&e, "Failed to list invoices"),
    }
}

async fn get_invoice(
    State(state): State<AppState>,
    Path(invoice_id): Path<InvoiceId>,
) -> impl IntoResponse {
    match state.issuance().get_invoice(invoice_id).await {
        Ok(invoice) => (StatusCode::OK, Json(invoice)).into_response(),
        Err(e) => error_response(&e, "Failed to get invoice"),
    }
}

async fn update_status(
    State(state): State<AppState>,
    Path(invoice_id): Path<InvoiceId>,
    Json(payload): Json<UpdateStatusRequest>,
) -> impl IntoResponse {
    match state
        .issuance()
        .update_invoice_status(invoice_id, payload.status)
        .await
    {
        Ok(invoice) => (StatusCode::OK, Json(invoice)).into_response(),
        Err(e) => error_response(&e, "Failed to update invoice status"),
    }
}
