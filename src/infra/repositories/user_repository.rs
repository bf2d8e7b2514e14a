//! User repository implementation.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use crate::domain::{NewUser, User};
use crate::errors::AppResult;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Outcome of a write that targets an existing row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The row was written and committed
    Applied,
    /// No row with the given id exists (or it vanished before the commit)
    Missing,
}

/// User repository trait for dependency injection.
///
/// Lookups report absence as `None`; storage failures surface as
/// `AppError::Database`.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user; the store assigns the id
    async fn create(&self, user: NewUser) -> AppResult<User>;

    /// Find user by ID
    async fn find_by_id(&self, id: i32) -> AppResult<Option<User>>;

    /// First user (lowest id) whose username and password both match exactly
    async fn find_by_credentials(&self, username: &str, password: &str)
        -> AppResult<Option<User>>;

    /// Whether any user holds exactly this API key
    async fn validate_key(&self, api_key: &str) -> AppResult<bool>;

    /// Overwrite every mutable field of the row with `user.id`
    async fn update(&self, user: User) -> AppResult<WriteOutcome>;

    /// Remove the row with this id
    async fn delete(&self, id: i32) -> AppResult<WriteOutcome>;
}

/// SeaORM-backed implementation of UserRepository
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn create(&self, user: NewUser) -> AppResult<User> {
        let active_model = ActiveModel {
            username: Set(user.username),
            password: Set(user.password),
            first_name: Set(user.first_name),
            last_name: Set(user.last_name),
            api_key: Set(user.api_key),
            ..Default::default()
        };

        let model = active_model.insert(&self.db).await?;
        Ok(User::from(model))
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<User>> {
        let result = UserEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(User::from))
    }

    async fn find_by_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .filter(user::Column::Password.eq(password))
            .order_by_asc(user::Column::Id)
            .one(&self.db)
            .await?;

        Ok(result.map(User::from))
    }

    async fn validate_key(&self, api_key: &str) -> AppResult<bool> {
        let count = UserEntity::find()
            .filter(user::Column::ApiKey.eq(api_key))
            .count(&self.db)
            .await?;

        Ok(count > 0)
    }

    async fn update(&self, user: User) -> AppResult<WriteOutcome> {
        let Some(existing) = UserEntity::find_by_id(user.id).one(&self.db).await? else {
            return Ok(WriteOutcome::Missing);
        };

        let mut active: ActiveModel = existing.into();
        active.username = Set(user.username);
        active.password = Set(user.password);
        active.first_name = Set(user.first_name);
        active.last_name = Set(user.last_name);
        active.api_key = Set(user.api_key);

        match active.update(&self.db).await {
            Ok(_) => Ok(WriteOutcome::Applied),
            Err(DbErr::RecordNotUpdated) => {
                tracing::debug!(user_id = user.id, "User row vanished before update");
                Ok(WriteOutcome::Missing)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, id: i32) -> AppResult<WriteOutcome> {
        if UserEntity::find_by_id(id).one(&self.db).await?.is_none() {
            return Ok(WriteOutcome::Missing);
        }

        let result = UserEntity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            tracing::debug!(user_id = id, "User row vanished before delete");
            return Ok(WriteOutcome::Missing);
        }

        Ok(WriteOutcome::Applied)
    }
}
