//! User Service
//!
//! Profile reads and updates plus the administrative create/delete
//! operations. Uniqueness of email and username is pre-checked so
//! conflicts surface as domain errors rather than database failures.

use std::sync::Arc;

use async_trait::async_trait;

use crate::application::services::auth_service::{hash_password, RegisterData};
use crate::domain::{NewUser, User, UserChanges, UserRepository};
use crate::shared::error::AppError;

/// User service trait for dependency injection
#[async_trait]
pub trait UserService: Send + Sync {
    /// Fetch a user by id
    async fn get_user(&self, user_id: i64) -> Result<User, UserError>;

    /// Apply a partial profile update
    async fn update_profile(&self, user_id: i64, changes: UserChanges) -> Result<User, UserError>;

    /// Create a user account (administrative path, no session)
    async fn create_user(&self, data: RegisterData) -> Result<User, UserError>;

    /// Delete a user account
    async fn delete_user(&self, user_id: i64) -> Result<(), UserError>;
}

/// User service errors
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("User not found")]
    NotFound,

    #[error("Email already exists")]
    EmailExists,

    #[error("Username already exists")]
    UsernameExists,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound => AppError::NotFound("User not found".into()),
            UserError::EmailExists => AppError::Conflict("Email already exists".into()),
            UserError::UsernameExists => AppError::Conflict("Username already exists".into()),
            UserError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<AppError> for UserError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::NotFound(_) => UserError::NotFound,
            e => UserError::Internal(e.to_string()),
        }
    }
}

/// UserService implementation
pub struct UserServiceImpl<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
}

impl<U> UserServiceImpl<U>
where
    U: UserRepository,
{
    /// Create a new UserServiceImpl
    pub fn new(user_repo: Arc<U>) -> Self {
        Self { user_repo }
    }

    /// Reject a change that would collide with another account.
    async fn check_conflicts(&self, current: &User, changes: &UserChanges) -> Result<(), UserError> {
        if let Some(email) = &changes.email {
            if email != &current.email && self.user_repo.email_exists(email).await? {
                return Err(UserError::EmailExists);
            }
        }

        if let Some(username) = &changes.username {
            if username != &current.username && self.user_repo.username_exists(username).await? {
                return Err(UserError::UsernameExists);
            }
        }

        Ok(())
    }
}

#[async_trait]
impl<U> UserService for UserServiceImpl<U>
where
    U: UserRepository + 'static,
{
    async fn get_user(&self, user_id: i64) -> Result<User, UserError> {
        self.user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(UserError::NotFound)
    }

    async fn update_profile(&self, user_id: i64, changes: UserChanges) -> Result<User, UserError> {
        let current = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(UserError::NotFound)?;

        self.check_conflicts(&current, &changes).await?;

        Ok(self.user_repo.update(user_id, &changes).await?)
    }

    async fn create_user(&self, data: RegisterData) -> Result<User, UserError> {
        if self.user_repo.email_exists(&data.email).await? {
            return Err(UserError::EmailExists);
        }
        if self.user_repo.username_exists(&data.username).await? {
            return Err(UserError::UsernameExists);
        }

        let password_hash =
            hash_password(&data.password).map_err(|e| UserError::Internal(e.to_string()))?;

        let new_user = NewUser {
            username: data.username,
            email: data.email,
            first_name: data.first_name,
            middle_name: data.middle_name,
            last_name: data.last_name,
            password_hash,
            gender: data.gender,
            birthdate: data.birthdate,
            phone_number: data.phone_number,
            city: data.city,
            country: data.country,
            is_superuser: data.is_superuser,
        };

        Ok(self.user_repo.create(&new_user).await?)
    }

    async fn delete_user(&self, user_id: i64) -> Result<(), UserError> {
        Ok(self.user_repo.delete(user_id).await?)
    }
}
