//! Ticket routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde_json::json;
use voyra_core::issuance::TicketDraft;
use voyra_db::DocumentFilter;
use voyra_shared::types::TicketId;

use super::invoices::DocumentQuery;
use super::optional_range;
use crate::AppState;
use crate::error::error_response;

/// Creates the ticket routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tickets", get(list_tickets).post(issue_ticket))
        .route("/tickets/{ticket_id}", get(get_ticket))
}

async fn issue_ticket(
    State(state): State<AppState>,
    Json(draft): Json<TicketDraft>,
) -> impl IntoResponse {
    match state.issuance().issue_ticket(draft).await {
        Ok(ticket) => (StatusCode::CREATED, Json(ticket)).into_response(),
        Err(e) => error_response(&e, "Failed to issue ticket"),
    }
}

async fn list_tickets(
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

    match state.issuance().list_tickets(filter).await {
        Ok(tickets) => (StatusCode::OK, Json(json!({ "tickets": tickets }))).into_response(),
        Err(e) => error_response(&e, "Failed to list tickets"),
    }
}

async fn get_ticket(
    State(state): State<AppState>,
    Path(ticket_id): Path<TicketId>,
) -> impl IntoResponse {
    match state.issuance().get_ticket(ticket_id).await {
        Ok(ticket) => (StatusCode::OK, Json(ticket)).into_response(),
        Err(e) => error_response(&e, "Failed to get ticket"),
    }
}
