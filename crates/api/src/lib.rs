//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - REST API routes for parties, ledgers, settlements, documents and reports
//! - Error responses mapped from the domain errors

pub mod error;
pub mod routes;

use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use voyra_db::{IssuanceRepository, PartyLedgerRepository, ReportRepository};
use voyra_shared::LedgerConfig;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// Retry settings for balance-mutating requests.
    pub ledger: LedgerConfig,
}

impl AppState {
    /// Party ledger store bound to this state.
    #[must_use]
    pub fn party_ledger(&self) -> PartyLedgerRepository {
        PartyLedgerRepository::with_config((*self.db).clone(), self.ledger)
    }

    /// Issuance repository bound to this state.
    #[must_use]
    pub fn issuance(&self) -> IssuanceRepository {
        IssuanceRepository::with_config((*self.db).clone(), self.ledger)
    }

    /// Report repository bound to this state.
    #[must_use]
    pub fn reports(&self) -> ReportRepository {
        ReportRepository::new((*self.db).clone())
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
