//! Authentication middleware for protected routes.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tally_core::access::Actor;
use tally_core::auth::Role;
use tally_db::UserRepository;
use tally_shared::{AppError, JwtError};
use tracing::{debug, error};

use crate::AppState;
use crate::error::ApiError;

/// Extracts the bearer token from the Authorization header.
fn extract_bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
}

/// Authentication middleware that validates JWT tokens.
///
/// This middleware:
/// 1. Extracts the Bearer token from the Authorization header
/// 2. Validates the token using the JWT service
/// 3. Reloads the user, so deleted accounts and role changes apply at once
/// 4. Stores the resulting [`Actor`] in request extensions
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(extract_bearer_token)
        .map(str::to_owned);

    match authenticate(&state, token.as_deref()).await {
        Ok(actor) => {
            request.extensions_mut().insert(actor);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

async fn authenticate(state: &AppState, token: Option<&str>) -> Result<Actor, ApiError> {
    let token =
        token.ok_or_else(|| AppError::Unauthorized("Not authorized, no token".to_string()))?;

    let claims = state.jwt_service.validate_token(token).map_err(|e| {
        debug!(error = %e, "Rejected bearer token");
        match e {
            JwtError::Expired => AppError::Unauthorized("Not authorized, token expired".to_string()),
            _ => AppError::Unauthorized("Not authorized, token failed".to_string()),
        }
    })?;

    let user = UserRepository::new((*state.db).clone())
        .find_by_id(claims.user_id())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to load user during authentication");
            ApiError::from(e)
        })?
        .ok_or_else(|| AppError::Unauthorized("Not authorized, user not found".to_string()))?;

    Ok(Actor::new(claims.user_id(), Role::from(user.role)))
}

/// Extractor for the authenticated actor.
///
/// Use this in handlers behind [`auth_middleware`]:
///
/// ```ignore
/// async fn handler(user: AuthUser) -> impl IntoResponse {
///     let user_id = user.id();
///     // ...
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Actor);

impl AuthUser {
    /// Returns the user ID.
    #[must_use]
    pub const fn id(&self) -> tally_shared::types::UserId {
        self.0.id
    }

    /// Returns the user's current role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.0.role
    }

    /// Returns the actor.
    #[must_use]
    pub const fn actor(&self) -> &Actor {
        &self.0
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Actor>()
            .copied()
            .map(AuthUser)
            .ok_or_else(|| ApiError(AppError::Unauthorized("Not authorized".to_string())))
    }
}
