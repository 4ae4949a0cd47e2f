//! Error → HTTP response mapping.
//!
//! Every failure leaves a handler as an [`ApiError`] and is rendered as
//! `{"success": false, "message": ..., "stack": ...}`. `stack` carries the
//! error's debug representation and is only present in debug builds.

use axum::{
    Json,
    extract::{
        FromRequest, FromRequestParts,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tally_core::access::AccessError;
use tally_core::auth::PasswordError;
use tally_core::ledger::LedgerError;
use tally_core::trends::TrendError;
use tally_db::RepositoryError;
use tally_shared::{AppError, JwtError};
use tracing::error;

/// Error returned by handlers.
#[derive(Debug)]
pub struct ApiError(pub AppError);

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Always `false`.
    pub success: bool,
    /// Human-readable message.
    pub message: String,
    /// Debug chain, debug builds only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if self.0.is_server_error() {
            error!(error = %self.0, code = self.0.error_code(), "Request failed");
        }

        let body = ErrorBody {
            success: false,
            message: self.0.public_message().to_string(),
            stack: cfg!(debug_assertions).then(|| format!("{:?}", self.0)),
        };

        (status, Json(body)).into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

macro_rules! via_app_error {
    ($($source:ty),* $(,)?) => {
        $(
            impl From<$source> for ApiError {
                fn from(err: $source) -> Self {
                    Self(err.into())
                }
            }
        )*
    };
}

via_app_error!(
    AccessError,
    JwtError,
    LedgerError,
    PasswordError,
    RepositoryError,
    TrendError,
);

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(AppError::Validation(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(AppError::Validation(rejection.body_text()))
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        let message = fields
            .first()
            .and_then(|(field, errs)| {
                errs.first().map(|e| {
                    e.message
                        .as_ref()
                        .map_or_else(|| format!("{field} is invalid"), ToString::to_string)
                })
            })
            .unwrap_or_else(|| "Invalid request".to_string());

        Self(AppError::Validation(message))
    }
}

/// `Json` whose rejections are rendered as 400 [`ApiError`]s.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// `Query` whose rejections are rendered as 400 [`ApiError`]s.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// Handler result.
pub type ApiResult<T> = Result<T, ApiError>;
