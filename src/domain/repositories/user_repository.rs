//! Repository traits for user accounts.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::User;
use crate::domain::values::ValidEmail;
use crate::error::{AppError, AppResult};

#[derive(Debug, Error)]
pub enum UserSaveError {
    #[error("email '{0}' is already registered")]
    EmailTaken(String),

    #[error(transparent)]
    Storage(#[from] AppError),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &ValidEmail) -> AppResult<Option<User>>;

    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>>;
}

#[async_trait]
pub trait UserWriter: Send {
    /// Inserts a new user.
    ///
    /// # Errors
    ///
    /// Returns [`UserSaveError::EmailTaken`] if the email is already registered.
    async fn save(&mut self, user: User) -> Result<User, UserSaveError>;
}
