//! Authentication routes for registration and login.

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use tally_core::auth::{Role, hash_password, verify_password};
use tally_core::notify::Welcome;
use tally_db::repositories::{CreateUserInput, UserRepository};
use tally_shared::AppError;
use tally_shared::auth::{AuthResponse, LoginRequest, RegisterRequest};
use tally_shared::types::UserId;
use tracing::{debug, info, warn};
use validator::Validate;

use crate::AppState;
use crate::error::{ApiJson, ApiResult};

/// Creates the auth router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
}

fn invalid_credentials() -> AppError {
    AppError::Unauthorized("Invalid credentials".to_string())
}

/// Picks the role of a new account.
///
/// An unknown role name is always rejected. A known one is only honored
/// when role selection is enabled; otherwise the account is a plain user.
fn resolve_role(requested: Option<&str>, allow_selection: bool) -> Result<Role, AppError> {
    let requested = requested
        .map(str::parse::<Role>)
        .transpose()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    match requested {
        Some(role) if allow_selection => Ok(role),
        Some(role) => {
            debug!(requested = %role, "Role selection disabled, registering as user");
            Ok(Role::User)
        }
        None => Ok(Role::User),
    }
}

/// POST /auth/register - Create an account and return a token.
async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    payload.validate()?;
    let role = resolve_role(payload.role.as_deref(), state.allow_role_selection)?;

    let user_repo = UserRepository::new((*state.db).clone());
    let user = user_repo
        .create(CreateUserInput {
            username: payload.username.trim().to_string(),
            email: payload.email.trim().to_string(),
            password_hash: hash_password(&payload.password)?,
            role: role.into(),
        })
        .await?;

    let user_id = UserId::from_uuid(user.id);
    let token = state
        .jwt_service
        .generate_access_token(user_id, role.as_str())?;

    info!(user_id = %user_id, role = %role, "User registered");

    let welcome = Welcome {
        user_id,
        username: user.username.clone(),
        email: user.email.clone(),
    };
    if let Err(e) = state.notifier.welcome(&welcome).await {
        warn!(user_id = %user_id, error = %e, "Welcome notification failed");
    }

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            id: user_id,
            username: user.username,
            email: user.email,
            role: role.to_string(),
            token,
        }),
    ))
}

/// POST /auth/login - Exchange credentials for a token.
async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    payload.validate()?;

    let user_repo = UserRepository::new((*state.db).clone());
    let Some(user) = user_repo.find_by_email(payload.email.trim()).await? else {
        info!(email = %payload.email, "Login attempt for non-existent user");
        return Err(invalid_credentials().into());
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        info!(user_id = %user.id, "Login attempt with wrong password");
        return Err(invalid_credentials().into());
    }

    let user_id = UserId::from_uuid(user.id);
    let role = Role::from(user.role);
    let token = state
        .jwt_service
        .generate_access_token(user_id, role.as_str())?;

    info!(user_id = %user_id, "User logged in");

    Ok(Json(AuthResponse {
        id: user_id,
        username: user.username,
        email: user.email,
        role: role.to_string(),
        token,
    }))
}
