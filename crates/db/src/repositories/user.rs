//! User repository for database operations.

use chrono::{SubsecRound, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tally_shared::types::UserId;
use tracing::info;

use super::error::RepositoryError;
use crate::entities::{sea_orm_active_enums::UserRole, transactions, users};

/// Input for creating a user.
#[derive(Debug, Clone)]
pub struct CreateUserInput {
    /// Display name.
    pub username: String,
    /// Email, unique across users.
    pub email: String,
    /// Argon2id PHC string.
    pub password_hash: String,
    /// Role.
    pub role: UserRole,
}

/// User repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a user by email.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<users::Model>, RepositoryError> {
        Ok(users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await?)
    }

    /// Finds a user by ID.
    pub async fn find_by_id(&self, id: UserId) -> Result<Option<users::Model>, RepositoryError> {
        Ok(users::Entity::find_by_id(id.into_inner()).one(&self.db).await?)
    }

    /// Checks if an email is already registered.
    pub async fn email_exists(&self, email: &str) -> Result<bool, RepositoryError> {
        let count = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .count(&self.db)
            .await?;

        Ok(count > 0)
    }

    /// Creates a new user.
    ///
    /// Fails with `DuplicateEmail` if the email is taken.
    pub async fn create(&self, input: CreateUserInput) -> Result<users::Model, RepositoryError> {
        if self.email_exists(&input.email).await? {
            return Err(RepositoryError::DuplicateEmail);
        }

        let user = users::ActiveModel {
            id: Set(UserId::new().into_inner()),
            username: Set(input.username),
            email: Set(input.email),
            password_hash: Set(input.password_hash),
            role: Set(input.role),
            created_at: Set(Utc::now().trunc_subsecs(3)),
        };

        user.insert(&self.db)
            .await
            .map_err(RepositoryError::from_user_write)
    }

    /// Lists all users, oldest account first.
    pub async fn list(&self) -> Result<Vec<users::Model>, RepositoryError> {
        Ok(users::Entity::find()
            .order_by_asc(users::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    /// Updates username and/or email. `None` leaves a field unchanged.
    pub async fn update_profile(
        &self,
        id: UserId,
        username: Option<String>,
        email: Option<String>,
    ) -> Result<users::Model, RepositoryError> {
        let user = self
            .find_by_id(id)
            .await?
            .ok_or(RepositoryError::UserNotFound(id.into_inner()))?;

        if let Some(email) = &email
            && *email != user.email
            && self.email_exists(email).await?
        {
            return Err(RepositoryError::DuplicateEmail);
        }

        let mut active = user.into_active_model();
        if let Some(username) = username {
            active.username = Set(username);
        }
        if let Some(email) = email {
            active.email = Set(email);
        }

        active
            .update(&self.db)
            .await
            .map_err(RepositoryError::from_user_write)
    }

    /// Deletes a user and every transaction they own, atomically.
    pub async fn delete_with_transactions(&self, id: UserId) -> Result<(), RepositoryError> {
        let txn = self.db.begin().await?;

        let removed = transactions::Entity::delete_many()
            .filter(transactions::Column::OwnerId.eq(id.into_inner()))
            .exec(&txn)
            .await?;
        let result = users::Entity::delete_by_id(id.into_inner()).exec(&txn).await?;

        if result.rows_affected == 0 {
            txn.rollback().await?;
            return Err(RepositoryError::UserNotFound(id.into_inner()));
        }
        txn.commit().await?;

        info!(user_id = %id, transactions = removed.rows_affected, "User deleted");
        Ok(())
    }
}
