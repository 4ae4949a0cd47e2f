//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes under `/api`
//! - Authentication middleware and the `AuthUser` extractor
//! - Error → JSON response mapping

pub mod error;
pub mod middleware;
pub mod routes;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use axum::Router;
use chrono_tz::Tz;
use sea_orm::DatabaseConnection;
use tally_core::access::AccessPolicy;
use tally_core::ledger::LedgerStore;
use tally_core::notify::{LogNotifier, Notifier};
use tally_db::TransactionRepository;
use tally_shared::JwtService;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// Transaction store.
    pub ledger: Arc<dyn LedgerStore>,
    /// JWT service for token operations.
    pub jwt_service: Arc<JwtService>,
    /// Feature → role table.
    pub access_policy: Arc<AccessPolicy>,
    /// Zone in which report days and trend months are resolved.
    pub reporting_zone: Tz,
    /// Account notification hook.
    pub notifier: Arc<dyn Notifier>,
    /// Whether registration may pick a role.
    pub allow_role_selection: bool,
}

impl AppState {
    /// Creates state backed by `db`, with the default policy, UTC reporting,
    /// log-only notifications and role selection disabled.
    #[must_use]
    pub fn new(db: DatabaseConnection, jwt_service: JwtService) -> Self {
        Self {
            ledger: Arc::new(TransactionRepository::new(db.clone())),
            db: Arc::new(db),
            jwt_service: Arc::new(jwt_service),
            access_policy: Arc::new(AccessPolicy::default()),
            reporting_zone: Tz::UTC,
            notifier: Arc::new(LogNotifier),
            allow_role_selection: false,
        }
    }

    /// Sets the reporting zone.
    #[must_use]
    pub fn with_reporting_zone(mut self, zone: Tz) -> Self {
        self.reporting_zone = zone;
        self
    }

    /// Replaces the notifier.
    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Enables or disables role selection at registration.
    #[must_use]
    pub fn with_role_selection(mut self, allow: bool) -> Self {
        self.allow_role_selection = allow;
        self
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api", routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
