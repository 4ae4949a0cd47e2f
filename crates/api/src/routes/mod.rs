//! API route definitions.

use axum::{Router, middleware};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;

use crate::{AppState, middleware::auth::auth_middleware};

pub mod admin;
pub mod auth;
pub mod health;
pub mod premium;
pub mod transactions;
pub mod users;

#[cfg(test)]
mod tests;

/// Creates the API router. Everything except health and auth sits behind
/// [`auth_middleware`].
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    let protected_routes = Router::new()
        .merge(transactions::routes())
        .merge(premium::routes())
        .merge(admin::routes())
        .merge(users::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(protected_routes)
}

/// `{"success": true, "data": ...}` envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    /// Always `true`.
    pub success: bool,
    /// Payload.
    pub data: T,
}

impl<T> DataResponse<T> {
    /// Wraps a payload.
    pub const fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Empty object used as the `data` of delete responses.
#[derive(Debug, Serialize)]
pub struct Empty {}

/// Renders a money value as a JSON number.
pub(crate) fn money(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}
