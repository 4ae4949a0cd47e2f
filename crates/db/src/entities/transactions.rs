//! `SeaORM` Entity for transactions table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use tally_core::ledger::Transaction;
use tally_shared::types::{TransactionId, UserId};

use super::sea_orm_active_enums::TransactionType;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_id: Uuid,
    pub text: String,
    pub amount: Decimal,
    pub kind: TransactionType,
    pub category: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::OwnerId",
        to = "super::users::Column::Id",
        on_delete = "Cascade"
    )]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Transaction {
    fn from(row: Model) -> Self {
        Self {
            id: TransactionId::from_uuid(row.id),
            text: row.text,
            amount: row.amount,
            kind: row.kind.into(),
            category: row.category,
            owner_id: UserId::from_uuid(row.owner_id),
            created_at: row.created_at,
        }
    }
}
