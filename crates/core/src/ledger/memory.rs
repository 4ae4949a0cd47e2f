//! In-memory `LedgerStore` for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use tally_shared::types::{TransactionId, UserId};

use super::{
    LedgerError, LedgerStore, MonthlyTotal, NewTransaction, ReportRange, Transaction,
    TransactionKind, TransactionPatch,
};
use crate::calendar::MonthKey;

#[derive(Default)]
pub(crate) struct MemoryLedger {
    records: Mutex<Vec<Transaction>>,
}

impl MemoryLedger {
    /// Inserts a record with an explicit creation time.
    pub(crate) fn insert_at(
        &self,
        owner_id: UserId,
        record: NewTransaction,
        created_at: DateTime<Utc>,
    ) -> Transaction {
        let tx = record.into_transaction(TransactionId::new(), owner_id, created_at);
        self.records.lock().unwrap().push(tx.clone());
        tx
    }
}

#[async_trait]
impl LedgerStore for MemoryLedger {
    async fn insert(
        &self,
        owner_id: UserId,
        record: NewTransaction,
    ) -> Result<Transaction, LedgerError> {
        Ok(self.insert_at(owner_id, record, Utc::now()))
    }

    async fn find_by_id(&self, id: TransactionId) -> Result<Transaction, LedgerError> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or(LedgerError::NotFound(id))
    }

    async fn list_by_owner(&self, owner_id: UserId) -> Result<Vec<Transaction>, LedgerError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn list_by_owner_in_range(
        &self,
        owner_id: UserId,
        range: &ReportRange,
    ) -> Result<Vec<Transaction>, LedgerError> {
        Ok(self
            .list_by_owner(owner_id)
            .await?
            .into_iter()
            .filter(|t| range.contains(t.created_at))
            .collect())
    }

    async fn group_by_month_and_type(
        &self,
        owner_id: UserId,
        since: MonthKey,
        until: MonthKey,
        zone: Tz,
    ) -> Result<Vec<MonthlyTotal>, LedgerError> {
        let floor = since.start(zone);
        let ceiling = until.succ().start(zone);
        let mut sums: HashMap<(MonthKey, TransactionKind), Decimal> = HashMap::new();
        for tx in self.list_by_owner(owner_id).await? {
            if tx.created_at >= floor && tx.created_at < ceiling {
                *sums
                    .entry((MonthKey::of(tx.created_at, zone), tx.kind))
                    .or_default() += tx.amount;
            }
        }
        Ok(sums
            .into_iter()
            .map(|((month, kind), total)| MonthlyTotal { month, kind, total })
            .collect())
    }

    async fn update(
        &self,
        id: TransactionId,
        patch: &TransactionPatch,
    ) -> Result<Transaction, LedgerError> {
        let mut records = self.records.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(LedgerError::NotFound(id))?;
        patch.apply_to(record)?;
        Ok(record.clone())
    }

    async fn delete(&self, id: TransactionId) -> Result<(), LedgerError> {
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|t| t.id != id);
        if records.len() == before {
            return Err(LedgerError::NotFound(id));
        }
        Ok(())
    }
}
