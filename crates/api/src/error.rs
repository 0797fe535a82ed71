//! Error responses.
//!
//! Bodies are `{"error": "<code>", "message": "<text>"}` with the status the
//! domain error asks for. Server-side failures are logged and their detail
//! is kept out of the body.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;
use voyra_core::reports::ReportError;
use voyra_db::{IssuanceRepoError, PartyLedgerError, ReportRepoError};

/// An error that knows how it goes over the wire.
pub trait ApiError: std::fmt::Display {
    /// Machine-readable error code.
    fn error_code(&self) -> &'static str;
    /// HTTP status code.
    fn http_status_code(&self) -> u16;
}

macro_rules! api_error {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl ApiError for $ty {
                fn error_code(&self) -> &'static str {
                    <$ty>::error_code(self)
                }

                fn http_status_code(&self) -> u16 {
                    <$ty>::http_status_code(self)
                }
            }
        )+
    };
}

api_error!(PartyLedgerError, IssuanceRepoError, ReportRepoError, ReportError);

/// Builds the response for a failed request.
pub fn error_response<E: ApiError>(err: &E, context: &str) -> Response {
    let status =
        StatusCode::from_u16(err.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    if status.is_server_error() {
        error!(error = %err, code = err.error_code(), "{context}");
        return (
            status,
            Json(json!({
                "error": err.error_code(),
                "message": "An error occurred"
            })),
        )
            .into_response();
    }

    (
        status,
        Json(json!({
            "error": err.error_code(),
            "message": err.to_string()
        })),
    )
        .into_response()
}
