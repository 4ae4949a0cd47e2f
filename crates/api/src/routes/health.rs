//! Liveness probe.

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use serde::Serialize;
use tracing::error;

use crate::AppState;

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    /// `healthy`, or `degraded` when the database does not answer.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
}

/// GET /health
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (code, status) = match state.db.ping().await {
        Ok(()) => (StatusCode::OK, "healthy"),
        Err(e) => {
            error!(error = %e, "Database ping failed");
            (StatusCode::SERVICE_UNAVAILABLE, "degraded")
        }
    };

    (
        code,
        Json(HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION"),
        }),
    )
}

/// Creates health check routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
