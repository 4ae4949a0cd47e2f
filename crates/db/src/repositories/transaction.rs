//! Transaction repository: the SeaORM-backed `LedgerStore`.

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use sea_orm::sea_query::{Alias, Expr, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, IntoActiveModel,
    QueryFilter, QuerySelect, Set,
};
use tally_core::calendar::MonthKey;
use tally_core::ledger::{
    LedgerError, LedgerStore, MonthlyTotal, NewTransaction, ReportRange, Transaction,
    TransactionPatch,
};
use tally_shared::types::{TransactionId, UserId};
use tracing::debug;

use super::error::RepositoryError;
use crate::entities::{sea_orm_active_enums::TransactionType, transactions};

const MONTH_INDEX: &str = "month_index";

/// One (month, type) aggregate row.
#[derive(Debug, FromQueryResult)]
struct MonthTypeRow {
    month_index: i32,
    kind: TransactionType,
    total: Decimal,
}

/// Transaction repository.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    db: DatabaseConnection,
}

impl TransactionRepository {
    /// Creates a new transaction repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Inserts a record with an explicit creation time.
    ///
    /// `created_at` is truncated to whole milliseconds.
    pub async fn insert_at(
        &self,
        owner_id: UserId,
        record: NewTransaction,
        created_at: DateTime<Utc>,
    ) -> Result<Transaction, RepositoryError> {
        let row = transactions::ActiveModel {
            id: Set(TransactionId::new().into_inner()),
            owner_id: Set(owner_id.into_inner()),
            text: Set(record.text().to_string()),
            amount: Set(record.amount()),
            kind: Set(record.kind().into()),
            category: Set(record.category().map(str::to_string)),
            created_at: Set(created_at.trunc_subsecs(3)),
        };

        Ok(row.insert(&self.db).await?.into())
    }

    /// Finds a transaction by ID.
    pub async fn find_by_id(&self, id: TransactionId) -> Result<Transaction, RepositoryError> {
        transactions::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .map(Transaction::from)
            .ok_or(RepositoryError::TransactionNotFound(id.into_inner()))
    }

    /// Lists an owner's transactions, optionally restricted to a range.
    pub async fn list(
        &self,
        owner_id: UserId,
        range: Option<&ReportRange>,
    ) -> Result<Vec<Transaction>, RepositoryError> {
        let mut query =
            transactions::Entity::find().filter(transactions::Column::OwnerId.eq(owner_id.into_inner()));

        if let Some(range) = range {
            query = query
                .filter(transactions::Column::CreatedAt.gte(range.start()))
                .filter(transactions::Column::CreatedAt.lte(range.end()));
        }

        let rows = query.all(&self.db).await?;
        Ok(rows.into_iter().map(Transaction::from).collect())
    }

    /// Sums amounts per (month, type) for the months `since` through `until`
    /// in `zone`.
    ///
    /// Month boundaries are computed here and handed to the database as a
    /// `CASE` over `created_at`, so grouping does not depend on the
    /// database's own date functions or session time zone.
    pub async fn monthly_totals(
        &self,
        owner_id: UserId,
        since: MonthKey,
        until: MonthKey,
        zone: Tz,
    ) -> Result<Vec<MonthlyTotal>, RepositoryError> {
        let months = since.through(until);
        if months.is_empty() {
            return Ok(Vec::new());
        }
        let boundaries: Vec<DateTime<Utc>> = months.iter().skip(1).map(|m| m.start(zone)).collect();

        let group_key: SimpleExpr = Expr::col(Alias::new(MONTH_INDEX)).into();
        let rows = transactions::Entity::find()
            .select_only()
            .column_as(month_index_expr(&boundaries), MONTH_INDEX)
            .column_as(transactions::Column::Kind, "kind")
            .column_as(transactions::Column::Amount.sum(), "total")
            .filter(transactions::Column::OwnerId.eq(owner_id.into_inner()))
            .filter(transactions::Column::CreatedAt.gte(since.start(zone)))
            .filter(transactions::Column::CreatedAt.lt(until.succ().start(zone)))
            .group_by(group_key)
            .group_by(transactions::Column::Kind)
            .into_model::<MonthTypeRow>()
            .all(&self.db)
            .await?;

        debug!(
            owner_id = %owner_id,
            since = %since,
            until = %until,
            rows = rows.len(),
            "Grouped transactions by month"
        );

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let month = usize::try_from(row.month_index)
                    .ok()
                    .and_then(|i| months.get(i))?;
                Some(MonthlyTotal {
                    month: *month,
                    kind: row.kind.into(),
                    total: row.total,
                })
            })
            .collect())
    }

    /// Applies a validated patch.
    pub async fn update(
        &self,
        id: TransactionId,
        patch: &TransactionPatch,
    ) -> Result<Transaction, RepositoryError> {
        let row = transactions::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(RepositoryError::TransactionNotFound(id.into_inner()))?;

        let mut record = Transaction::from(row.clone());
        patch.apply_to(&mut record)?;

        let mut active = row.into_active_model();
        active.text = Set(record.text);
        active.amount = Set(record.amount);
        active.kind = Set(record.kind.into());
        active.category = Set(record.category);

        Ok(active.update(&self.db).await?.into())
    }

    /// Deletes a transaction.
    pub async fn delete(&self, id: TransactionId) -> Result<(), RepositoryError> {
        let result = transactions::Entity::delete_by_id(id.into_inner())
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(RepositoryError::TransactionNotFound(id.into_inner()));
        }
        Ok(())
    }
}

/// `CASE WHEN created_at < b1 THEN 0 WHEN created_at < b2 THEN 1 ... ELSE n END`
fn month_index_expr(boundaries: &[DateTime<Utc>]) -> SimpleExpr {
    let last = i32::try_from(boundaries.len()).unwrap_or(i32::MAX);
    let mut whens = boundaries.iter().zip(0i32..);

    let Some((first, index)) = whens.next() else {
        return Expr::val(0i32).into();
    };

    let mut case = Expr::case(transactions::Column::CreatedAt.lt(*first), index);
    for (boundary, index) in whens {
        case = case.case(transactions::Column::CreatedAt.lt(*boundary), index);
    }
    case.finally(last).into()
}

#[async_trait]
impl LedgerStore for TransactionRepository {
    async fn insert(
        &self,
        owner_id: UserId,
        record: NewTransaction,
    ) -> Result<Transaction, LedgerError> {
        Ok(self.insert_at(owner_id, record, Utc::now()).await?)
    }

    async fn find_by_id(&self, id: TransactionId) -> Result<Transaction, LedgerError> {
        Ok(Self::find_by_id(self, id).await?)
    }

    async fn list_by_owner(&self, owner_id: UserId) -> Result<Vec<Transaction>, LedgerError> {
        Ok(self.list(owner_id, None).await?)
    }

    async fn list_by_owner_in_range(
        &self,
        owner_id: UserId,
        range: &ReportRange,
    ) -> Result<Vec<Transaction>, LedgerError> {
        Ok(self.list(owner_id, Some(range)).await?)
    }

    async fn group_by_month_and_type(
        &self,
        owner_id: UserId,
        since: MonthKey,
        until: MonthKey,
        zone: Tz,
    ) -> Result<Vec<MonthlyTotal>, LedgerError> {
        Ok(self.monthly_totals(owner_id, since, until, zone).await?)
    }

    async fn update(
        &self,
        id: TransactionId,
        patch: &TransactionPatch,
    ) -> Result<Transaction, LedgerError> {
        Ok(Self::update(self, id, patch).await?)
    }

    async fn delete(&self, id: TransactionId) -> Result<(), LedgerError> {
        Ok(Self::delete(self, id).await?)
    }
}
