//! String-backed enums stored in entity columns.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use tally_core::auth::Role;
use tally_core::ledger::TransactionKind;

/// `users.role` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum UserRole {
    /// Regular account.
    #[sea_orm(string_value = "user")]
    User,
    /// Premium account.
    #[sea_orm(string_value = "premium")]
    Premium,
    /// Administrator.
    #[sea_orm(string_value = "admin")]
    Admin,
}

impl From<UserRole> for Role {
    fn from(role: UserRole) -> Self {
        match role {
            UserRole::User => Self::User,
            UserRole::Premium => Self::Premium,
            UserRole::Admin => Self::Admin,
        }
    }
}

impl From<Role> for UserRole {
    fn from(role: Role) -> Self {
        match role {
            Role::User => Self::User,
            Role::Premium => Self::Premium,
            Role::Admin => Self::Admin,
        }
    }
}

/// `transactions.kind` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum TransactionType {
    /// Money in.
    #[sea_orm(string_value = "income")]
    Income,
    /// Money out.
    #[sea_orm(string_value = "expense")]
    Expense,
}

impl From<TransactionType> for TransactionKind {
    fn from(kind: TransactionType) -> Self {
        match kind {
            TransactionType::Income => Self::Income,
            TransactionType::Expense => Self::Expense,
        }
    }
}

impl From<TransactionKind> for TransactionType {
    fn from(kind: TransactionKind) -> Self {
        match kind {
            TransactionKind::Income => Self::Income,
            TransactionKind::Expense => Self::Expense,
        }
    }
}
