//! Redirect cache trait and error type.

use async_trait::async_trait;
use thiserror::Error;

/// Failure to reach the cache backend at startup.
///
/// Once running, cache operations never fail: errors are logged and treated
/// as misses so redirects fall back to the store.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    Connection(String),
}

pub type CacheResult<T> = Result<T, CacheError>;

/// Cache of `code -> target URL` mappings used by the redirect path.
///
/// Mappings never change once created, so entries are only ever written and
/// left to expire.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis with a TTL per entry
/// - [`crate::infrastructure::cache::NullCache`] - caching disabled
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Returns the cached target for `code`, or `None` on a miss or error.
    async fn get_target(&self, code: &str) -> Option<String>;

    /// Caches `url` as the target of `code`. Errors are logged and dropped.
    async fn put_target(&self, code: &str, url: &str);

    async fn health_check(&self) -> bool;

    /// Backend name reported by the health endpoint.
    fn backend(&self) -> &'static str;
}
