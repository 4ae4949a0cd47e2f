//! Transaction ledger: record types, validation and the store seam.
//!
//! Records enter the ledger only as a [`NewTransaction`], which can only be
//! produced by validating a [`TransactionDraft`]. Partial updates go through
//! a [`TransactionPatch`] that whitelists the editable fields.

pub mod error;
pub mod range;
pub mod store;
pub mod types;

#[cfg(test)]
pub(crate) mod memory;

pub use error::LedgerError;
pub use range::ReportRange;
pub use store::LedgerStore;
pub use types::*;
