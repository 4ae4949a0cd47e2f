//! Administrator routes.

use axum::{Json, Router, extract::State, routing::get};
use tally_core::access::Feature;
use tally_db::UserRepository;
use tally_shared::UserProfile;
use tracing::warn;

use crate::AppState;
use crate::error::ApiResult;
use crate::middleware::AuthUser;

/// Creates the admin routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/admin/users", get(list_users))
}

/// GET /admin/users - Every account, oldest first. Admin only.
pub(crate) async fn list_users(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<Vec<UserProfile>>> {
    state
        .access_policy
        .authorize(user.actor(), Feature::AdminUsers)
        .inspect_err(|e| warn!(user_id = %user.id(), error = %e, "User listing denied"))?;

    let users = UserRepository::new((*state.db).clone()).list().await?;
    Ok(Json(users.into_iter().map(UserProfile::from).collect()))
}
