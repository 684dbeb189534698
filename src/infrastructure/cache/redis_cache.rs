//! Redis-backed redirect cache.

use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use tracing::{debug, info, warn};

use super::service::{CacheError, CacheResult, CacheService};

const KEY_PREFIX: &str = "snaplink:code:";

/// Redis cache behind a multiplexed [`ConnectionManager`].
///
/// Fail-open: any Redis error is logged and reported as a miss.
pub struct RedisCache {
    connection: ConnectionManager,
    ttl_seconds: u64,
}

impl RedisCache {
    /// Connects and checks the connection with a PING.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Connection`] if the URL is invalid, the server is
    /// unreachable, or the PING fails.
    pub async fn connect(redis_url: &str, ttl_seconds: u64) -> CacheResult<Self> {
        let client = Client::open(redis_url)
            .map_err(|e| CacheError::Connection(format!("invalid Redis URL: {e}")))?;

        let connection = ConnectionManager::new(client)
            .await
            .map_err(|e| CacheError::Connection(format!("failed to connect: {e}")))?;

        let mut probe = connection.clone();
        probe
            .ping::<()>()
            .await
            .map_err(|e| CacheError::Connection(format!("PING failed: {e}")))?;

        info!(ttl_seconds, "Connected to Redis");

        Ok(Self {
            connection,
            ttl_seconds,
        })
    }

    fn key(code: &str) -> String {
        format!("{KEY_PREFIX}{code}")
    }
}

#[async_trait]
impl CacheService for RedisCache {
    async fn get_target(&self, code: &str) -> Option<String> {
        let mut conn = self.connection.clone();

        match conn.get::<_, Option<String>>(Self::key(code)).await {
            Ok(hit) => {
                debug!(code, hit = hit.is_some(), "Cache lookup");
                hit
            }
            Err(e) => {
                warn!(code, error = %e, "Redis GET failed");
                None
            }
        }
    }

    async fn put_target(&self, code: &str, url: &str) {
        let mut conn = self.connection.clone();

        if let Err(e) = conn
            .set_ex::<_, _, ()>(Self::key(code), url, self.ttl_seconds)
            .await
        {
            warn!(code, error = %e, "Redis SET failed");
        }
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.connection.clone();
        conn.ping::<()>().await.is_ok()
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}
