//! Report routes.
//!
//! Periods resolve against the server's current UTC date; `custom`
//! requires both `from` and `to`.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use voyra_core::reports::{DateRange, ReportPeriod};
use voyra_shared::types::PartyId;

use crate::AppState;
use crate::error::error_response;

/// Creates the report routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/reports/invoices", get(invoice_report))
        .route("/reports/tickets", get(ticket_report))
        .route("/reports/ledger", get(ledger_report))
}

/// Query parameters shared by every report.
#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    /// `today`, `this_week`, `this_month`, `this_year` or `custom`.
    #[serde(default = "default_period")]
    pub period: String,
    /// First day of a custom range.
    pub from: Option<NaiveDate>,
    /// Last day of a custom range.
    pub to: Option<NaiveDate>,
    /// Only rows involving this party.
    pub party_id: Option<PartyId>,
}

fn default_period() -> String {
    "this_month".to_string()
}

impl ReportQuery {
    fn range(&self) -> Result<DateRange, Response> {
        ReportPeriod::parse(&self.period, self.from, self.to)
            .and_then(|period| period.resolve(Utc::now().date_naive()))
            .map_err(|e| error_response(&e, "Invalid report period"))
    }
}

async fn invoice_report(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> impl IntoResponse {
    let range = match query.range() {
        Ok(range) => range,
        Err(response) => return response,
    };

    match state.reports().invoice_report(range, query.party_id).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => error_response(&e, "Failed to build invoice report"),
    }
}

async fn ticket_report(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> impl IntoResponse {
    let range = match query.range() {
        Ok(range) => range,
        Err(response) => return response,
    };

    match state.reports().ticket_report(range, query.party_id).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => error_response(&e, "Failed to build ticket report"),
    }
}

async fn ledger_report(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> impl IntoResponse {
    let range = match query.range() {
        Ok(range) => range,
        Err(response) => return response,
    };

    match state.reports().ledger_report(range, query.party_id).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => error_response(&e, "Failed to build ledger report"),
    }
}
