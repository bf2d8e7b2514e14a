//! User service - Handles user-related business logic.
//!
//! Sits between the HTTP handlers and the repository: loads current state,
//! applies changes and maps store outcomes onto application errors.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::{apply_patch, generate_api_key, NewUser, PatchDocument, User};
use crate::errors::{AppError, AppResult};
use crate::infra::{UserRepository, WriteOutcome};

/// User service trait for dependency injection.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Get user by ID
    async fn get_user(&self, id: i32) -> AppResult<User>;

    /// Register a new user with a freshly generated API key.
    /// Any key present on the draft is discarded.
    async fn register(&self, draft: NewUser) -> AppResult<User>;

    /// Find the user matching both credentials exactly
    async fn login(&self, username: String, password: String) -> AppResult<User>;

    /// Replace every mutable field of user `id` with those of `user`
    async fn replace_user(&self, id: i32, user: User) -> AppResult<()>;

    /// Apply a patch document to user `id`; all or nothing
    async fn patch_user(&self, id: i32, patch: PatchDocument) -> AppResult<()>;

    /// Delete user by ID
    async fn delete_user(&self, id: i32) -> AppResult<()>;

    /// Check whether an API key belongs to any user
    async fn validate_key(&self, api_key: &str) -> AppResult<bool>;
}

/// Concrete implementation of UserService using repository.
pub struct UserManager {
    repo: Arc<dyn UserRepository>,
}

impl UserManager {
    /// Create new user service instance with repository
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }

    /// Write back a record that was loaded earlier in the same request.
    async fn save(&self, user: User) -> AppResult<()> {
        let id = user.id;
        match self.repo.update(user).await? {
            WriteOutcome::Applied => Ok(()),
            WriteOutcome::Missing => Err(AppError::internal(format!(
                "User {} disappeared before the update was committed",
                id
            ))),
        }
    }
}

#[async_trait]
impl UserService for UserManager {
    async fn get_user(&self, id: i32) -> AppResult<User> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::user_not_found(id))
    }

    async fn register(&self, mut draft: NewUser) -> AppResult<User> {
        draft.api_key = generate_api_key();

        let user = self.repo.create(draft).await.map_err(|e| {
            tracing::warn!("User registration failed: {:?}", e);
            AppError::bad_request("User could not be registered.")
        })?;

        tracing::info!(user_id = user.id, "User registered");
        Ok(user)
    }

    async fn login(&self, username: String, password: String) -> AppResult<User> {
        self.repo
            .find_by_credentials(&username, &password)
            .await?
            .ok_or(AppError::InvalidCredentials)
    }

    async fn replace_user(&self, id: i32, user: User) -> AppResult<()> {
        if id != user.id {
            return Err(AppError::bad_request("User ID mismatch."));
        }

        let mut existing = self.get_user(id).await?;
        existing.replace_fields(user);

        self.save(existing).await?;
        tracing::info!(user_id = id, "User replaced");
        Ok(())
    }

    async fn patch_user(&self, id: i32, patch: PatchDocument) -> AppResult<()> {
        let existing = self.get_user(id).await?;
        let patched = apply_patch(&existing, &patch).map_err(AppError::ValidationFailed)?;

        self.save(patched).await?;
        tracing::info!(
            user_id = id,
            operations = patch.operations().len(),
            "User patched"
        );
        Ok(())
    }

    async fn delete_user(&self, id: i32) -> AppResult<()> {
        self.get_user(id).await?;

        match self.repo.delete(id).await? {
            WriteOutcome::Applied => {
                tracing::info!(user_id = id, "User deleted");
                Ok(())
            }
            WriteOutcome::Missing => Err(AppError::internal(format!(
                "User {} disappeared before the delete was committed",
                id
            ))),
        }
    }

    async fn validate_key(&self, api_key: &str) -> AppResult<bool> {
        self.repo.validate_key(api_key).await
    }
}
