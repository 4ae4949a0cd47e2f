//! Repository error types.

use sea_orm::{DbErr, SqlErr};
use tally_core::ledger::LedgerError;
use tally_shared::AppError;
use thiserror::Error;
use uuid::Uuid;

/// Errors returned by repositories.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Transaction not found.
    #[error("Transaction not found: {0}")]
    TransactionNotFound(Uuid),

    /// User not found.
    #[error("User not found: {0}")]
    UserNotFound(Uuid),

    /// Email already registered to another user.
    #[error("User already exists")]
    DuplicateEmail,

    /// Domain rule rejected the change.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl RepositoryError {
    /// Classifies a failed user write. A unique violation means another
    /// writer took the email after the existence check.
    pub(crate) fn from_user_write(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => Self::DuplicateEmail,
            _ => Self::Database(err),
        }
    }
}

impl From<RepositoryError> for LedgerError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::TransactionNotFound(id) => Self::NotFound(id.into()),
            RepositoryError::Ledger(e) => e,
            other => Self::Store(other.to_string()),
        }
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::TransactionNotFound(_) => Self::NotFound("Transaction not found".to_string()),
            RepositoryError::UserNotFound(_) => Self::NotFound("User not found".to_string()),
            RepositoryError::DuplicateEmail => Self::Validation(err.to_string()),
            RepositoryError::Ledger(e) => e.into(),
            RepositoryError::Database(e) => Self::Database(e.to_string()),
        }
    }
}
