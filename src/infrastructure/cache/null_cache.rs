//! No-op cache used when Redis is not configured or unreachable.

use async_trait::async_trait;

use super::service::CacheService;

/// Every lookup misses and every write is dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullCache;

impl NullCache {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CacheService for NullCache {
    async fn get_target(&self, _code: &str) -> Option<String> {
        None
    }

    async fn put_target(&self, _code: &str, _url: &str) {}

    async fn health_check(&self) -> bool {
        true
    }

    fn backend(&self) -> &'static str {
        "none"
    }
}
