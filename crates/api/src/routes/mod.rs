//! API route definitions.

use axum::Router;
use chrono::NaiveDate;
use voyra_core::reports::{DateRange, ReportError};

use crate::AppState;

pub mod health;
pub mod invoices;
pub mod parties;
pub mod reports;
pub mod settlements;
pub mod tickets;


/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(parties::routes())
        .merge(settlements::routes())
        .merge(invoices::routes())
        .merge(tickets::routes())
        .merge(reports::routes())
}

/// Turns optional `from`/`to` query bounds into a range.
///
/// A missing bound is open-ended; no bounds at all means no filter.
pub(crate) fn optional_range(
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<Option<DateRange>, ReportError> {
    match (from, to) {
        (None, None) => Ok(None),
        (from, to) => DateRange::new(
            from.unwrap_or(EARLIEST_DAY),
            to.unwrap_or(LATEST_DAY),
        )
        .map(Some),
    }
}

// Both bounds stay inside what every supported backend can store.
const EARLIEST_DAY: NaiveDate = match NaiveDate::from_ymd_opt(1, 1, 1) {
    Some(day) => day,
    None => NaiveDate::MIN,
};
const LATEST_DAY: NaiveDate = match NaiveDate::from_ymd_opt(9999, 12, 31) {
    Some(day) => day,
    None => NaiveDate::MAX,
};
