//! Live settlement preview.

use axum::{
    Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post,
};
use serde::Deserialize;
use voyra_core::settlement::SettlementDraft;
use voyra_shared::types::PartyId;

use crate::AppState;
use crate::error::error_response;

/// Creates the settlement routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/settlements/preview", post(preview_settlement))
}

/// Request body for a preview.
#[derive(Debug, Deserialize)]
pub struct PreviewRequest {
    /// Billed customer or agent whose balances apply.
    #[serde(default)]
    pub customer_id: Option<PartyId>,
    /// Vendor whose balances apply.
    #[serde(default)]
    pub vendor_id: Option<PartyId>,
    /// The draft being edited.
    pub settlement: SettlementDraft,
}

async fn preview_settlement(
    State(state): State<AppState>,
    Json(payload): Json<PreviewRequest>,
) -> impl IntoResponse {
    match state
        .issuance()
        .preview_settlement(payload.customer_id, payload.vendor_id, &payload.settlement)
        .await
    {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => error_response(&e, "Failed to preview settlement"),
    }
}
