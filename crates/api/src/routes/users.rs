//! Profile routes for the signed-in user.

use axum::{Json, Router, extract::State, routing::get};
use tally_db::UserRepository;
use tally_shared::{AppError, UpdateProfileRequest, UserProfile};
use tracing::info;
use validator::Validate;

use super::{DataResponse, Empty, admin};
use crate::AppState;
use crate::error::{ApiJson, ApiResult};
use crate::middleware::AuthUser;

/// Creates the user routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(admin::list_users))
        .route(
            "/users/profile",
            get(get_profile).put(update_profile).delete(delete_profile),
        )
}

fn user_gone() -> AppError {
    AppError::NotFound("User not found".to_string())
}

/// GET /users/profile
async fn get_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<UserProfile>> {
    let profile = UserRepository::new((*state.db).clone())
        .find_by_id(user.id())
        .await?
        .ok_or_else(user_gone)?;

    Ok(Json(profile.into()))
}

/// PUT /users/profile - Change username and/or email.
async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(payload): ApiJson<UpdateProfileRequest>,
) -> ApiResult<Json<UserProfile>> {
    payload.validate()?;

    let updated = UserRepository::new((*state.db).clone())
        .update_profile(
            user.id(),
            payload.username.map(|u| u.trim().to_string()),
            payload.email.map(|e| e.trim().to_string()),
        )
        .await?;

    info!(user_id = %user.id(), "Profile updated");
    Ok(Json(updated.into()))
}

/// DELETE /users/profile - Remove the account and all of its transactions.
async fn delete_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<DataResponse<Empty>>> {
    UserRepository::new((*state.db).clone())
        .delete_with_transactions(user.id())
        .await?;

    Ok(Json(DataResponse::new(Empty {})))
}
