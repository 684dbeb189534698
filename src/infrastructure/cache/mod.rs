//! Redirect cache.
//!
//! - [`RedisCache`] - Redis-backed, enabled by `REDIS_URL`
//! - [`NullCache`] - caching disabled

mod null_cache;
mod redis_cache;
mod service;

pub use null_cache::NullCache;
pub use redis_cache::RedisCache;
pub use service::{CacheError, CacheResult, CacheService};

#[cfg(test)]
pub use service::MockCacheService;
