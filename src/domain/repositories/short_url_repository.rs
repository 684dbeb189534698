//! Repository traits for short URL data access.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::ShortUrl;
use crate::error::{AppError, AppResult};

/// Why a short URL could not be saved.
///
/// A collision is an expected outcome of random code generation and is
/// recovered by the caller; a storage failure is not.
#[derive(Debug, Error)]
pub enum CodeError {
    /// The code is already taken by another short URL.
    #[error("short code '{0}' is already taken")]
    Collision(String),

    #[error(transparent)]
    Storage(#[from] AppError),
}

/// Read-side access to short URLs.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgShortUrlRepository`] - PostgreSQL
/// - [`crate::infrastructure::memory::MemoryStore`] - in-process store
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ShortUrlRepository: Send + Sync {
    /// Finds a committed short URL by its code.
    ///
    /// Returns `Ok(None)` when no short URL uses `code`.
    async fn find_by_code(&self, code: &str) -> AppResult<Option<ShortUrl>>;

    /// Lists short URLs owned by `owner_id`, newest first.
    async fn list_by_owner(
        &self,
        owner_id: &str,
        offset: i64,
        limit: i64,
    ) -> AppResult<Vec<ShortUrl>>;

    async fn count_by_owner(&self, owner_id: &str) -> AppResult<i64>;
}

/// Transaction-scoped writes for short URLs.
#[async_trait]
pub trait ShortUrlWriter: Send {
    /// Inserts a transient short URL and returns it with its assigned id.
    ///
    /// The insert is the uniqueness check: no read precedes it.
    ///
    /// # Errors
    ///
    /// - [`CodeError::Collision`] if the code is already in use
    /// - [`CodeError::Storage`] on any other failure
    async fn save(&mut self, short_url: ShortUrl) -> Result<ShortUrl, CodeError>;
}
