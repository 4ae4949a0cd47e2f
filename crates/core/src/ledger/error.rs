//! Ledger error types.

use chrono::NaiveDate;
use tally_shared::{AppError, types::TransactionId};
use thiserror::Error;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Label is missing or only whitespace.
    #[error("Please add some text")]
    EmptyText,

    /// Amount is missing, zero or negative.
    #[error("Please add a positive amount")]
    InvalidAmount,

    /// Amount is above [`MAX_AMOUNT`](super::MAX_AMOUNT).
    #[error("Amount cannot exceed 999999999999.99")]
    AmountTooLarge,

    /// Amount has fractions of a cent.
    #[error("Amount can have at most 2 decimal places")]
    AmountPrecision,

    /// Type is missing or not one of income/expense.
    #[error("Type must be either income or expense")]
    InvalidKind(Option<String>),

    /// Report range is inverted.
    #[error("startDate {start} is after endDate {end}")]
    InvalidRange {
        /// Requested start date.
        start: NaiveDate,
        /// Requested end date.
        end: NaiveDate,
    },

    /// No transaction with this ID.
    #[error("Transaction not found")]
    NotFound(TransactionId),

    /// The backing store failed.
    #[error("ledger store failure: {0}")]
    Store(String),
}

impl LedgerError {
    /// Returns true if the error was caused by bad input.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::EmptyText
                | Self::InvalidAmount
                | Self::AmountTooLarge
                | Self::AmountPrecision
                | Self::InvalidKind(_)
                | Self::InvalidRange { .. }
        )
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::NotFound(_) => Self::NotFound(err.to_string()),
            LedgerError::Store(msg) => Self::Database(msg),
            _ => Self::Validation(err.to_string()),
        }
    }
}
