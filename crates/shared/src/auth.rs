//! Authentication types for JWT and auth payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::types::UserId;

/// JWT claims for access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: Uuid,
    /// User role at the time the token was issued.
    pub role: String,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for a user.
    #[must_use]
    pub fn new(user_id: UserId, role: &str, expires_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id.into_inner(),
            role: role.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the user ID from claims.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        UserId::from_uuid(self.sub)
    }
}

/// Login request payload.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    /// User email.
    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,
    /// User password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Registration request payload.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Display name.
    #[validate(length(min = 3, max = 50, message = "Username must be between 3 and 50 characters"))]
    pub username: String,
    /// User email.
    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,
    /// User password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    /// Requested role. Only honored when role selection is enabled.
    #[serde(default)]
    pub role: Option<String>,
}

/// Response for a successful login or registration.
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    /// User ID.
    pub id: UserId,
    /// Display name.
    pub username: String,
    /// User email.
    pub email: String,
    /// Role.
    pub role: String,
    /// Access token.
    pub token: String,
}

/// Profile update request. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateProfileRequest {
    /// New display name.
    #[validate(length(min = 3, max = 50, message = "Username must be between 3 and 50 characters"))]
    pub username: Option<String>,
    /// New email.
    #[validate(email(message = "Please provide a valid email"))]
    pub email: Option<String>,
}

impl UpdateProfileRequest {
    /// Returns true if the request changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.username.is_none() && self.email.is_none()
    }
}

/// Public view of a user. Never carries the password hash.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// User ID.
    pub id: UserId,
    /// Display name.
    pub username: String,
    /// User email.
    pub email: String,
    /// Role.
    pub role: String,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}
