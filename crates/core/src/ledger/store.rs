//! The persistence seam for transactions.

use async_trait::async_trait;
use chrono_tz::Tz;
use tally_shared::types::{TransactionId, UserId};

use super::error::LedgerError;
use super::range::ReportRange;
use super::types::{MonthlyTotal, NewTransaction, Transaction, TransactionPatch};
use crate::calendar::MonthKey;

/// Ownership-scoped transaction storage.
///
/// Implementations never authorize; callers check access before `update`
/// and `delete`.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Stores a validated record, assigning its ID and `created_at`.
    async fn insert(
        &self,
        owner_id: UserId,
        record: NewTransaction,
    ) -> Result<Transaction, LedgerError>;

    /// Loads one record. `LedgerError::NotFound` if absent.
    async fn find_by_id(&self, id: TransactionId) -> Result<Transaction, LedgerError>;

    /// All records of one owner, in no particular order.
    async fn list_by_owner(&self, owner_id: UserId) -> Result<Vec<Transaction>, LedgerError>;

    /// Records of one owner with `range.start() <= created_at <= range.end()`.
    async fn list_by_owner_in_range(
        &self,
        owner_id: UserId,
        range: &ReportRange,
    ) -> Result<Vec<Transaction>, LedgerError>;

    /// Per (month, type) sums of one owner's records created in the months
    /// `since` through `until`, both inclusive and resolved in `zone`.
    /// Months and types without records are omitted.
    async fn group_by_month_and_type(
        &self,
        owner_id: UserId,
        since: MonthKey,
        until: MonthKey,
        zone: Tz,
    ) -> Result<Vec<MonthlyTotal>, LedgerError>;

    /// Applies a patch and returns the updated record.
    async fn update(
        &self,
        id: TransactionId,
        patch: &TransactionPatch,
    ) -> Result<Transaction, LedgerError>;

    /// Removes a record. `LedgerError::NotFound` if absent.
    async fn delete(&self, id: TransactionId) -> Result<(), LedgerError>;
}
