//! Repository traits for login sessions.

use async_trait::async_trait;

use crate::domain::entities::{Session, SessionRotation};
use crate::domain::values::Digest;
use crate::error::AppResult;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Session>>;
}

/// Transaction-scoped writes for sessions.
#[async_trait]
pub trait SessionWriter: Send {
    async fn save(&mut self, session: Session) -> AppResult<Session>;

    /// Replaces the session's secrets if its refresh digest still equals
    /// `expected_refresh`.
    ///
    /// Returns `Ok(false)` when the session is gone or was already rotated,
    /// which is what makes a refresh token single-use.
    async fn rotate(
        &mut self,
        id: &str,
        expected_refresh: &Digest,
        rotation: SessionRotation,
    ) -> AppResult<bool>;

    /// Returns `Ok(false)` if no session had this id.
    async fn delete(&mut self, id: &str) -> AppResult<bool>;

    /// Deletes every session of a user and returns how many were removed.
    async fn delete_for_user(&mut self, user_id: &str) -> AppResult<u64>;
}
