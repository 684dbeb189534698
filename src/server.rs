//! HTTP server initialization and runtime setup.
//!
//! Handles store and cache setup and the Axum server lifecycle.

use crate::config::Config;
use crate::infrastructure::cache::{CacheService, NullCache, RedisCache};
use crate::infrastructure::memory::MemoryStore;
use crate::routes::app_router;
use crate::state::{AppState, Backends};

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL pool and migrations, or the in-memory store for `memory://`
/// - Redis cache (or NullCache fallback)
/// - Axum HTTP server with graceful shutdown on Ctrl+C
///
/// # Errors
///
/// Returns an error if the store is unreachable, migrations fail, or the
/// listener cannot bind.
pub async fn run(config: Config) -> Result<()> {
    let backends = if config.is_memory_store() {
        tracing::warn!("Using in-memory store; data is lost on shutdown");
        Backends::memory(&MemoryStore::new())
    } else {
        let pool = PgPoolOptions::new()
            .max_connections(config.store_max_connections)
            .acquire_timeout(Duration::from_secs(config.store_connect_timeout))
            .idle_timeout(Duration::from_secs(config.store_idle_timeout))
            .max_lifetime(Duration::from_secs(config.store_max_lifetime))
            .connect(&config.store_url)
            .await
            .context("Failed to connect to store")?;
        tracing::info!("Connected to store");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to run migrations")?;
        tracing::info!("Migrations applied");

        Backends::postgres(Arc::new(pool))
    };

    let cache: Arc<dyn CacheService> = if let Some(redis_url) = &config.redis_url {
        match RedisCache::connect(redis_url, config.cache_ttl_seconds).await {
            Ok(redis) => {
                tracing::info!("Cache enabled (Redis)");
                Arc::new(redis)
            }
            Err(e) => {
                tracing::warn!("Failed to connect to Redis: {}. Using NullCache.", e);
                Arc::new(NullCache::new())
            }
        }
    } else {
        tracing::info!("Cache disabled (NullCache)");
        Arc::new(NullCache::new())
    };

    let settings = config.service_settings()?;
    let state = AppState::new(backends, cache, &settings);

    let app = app_router(state);

    let addr: SocketAddr = config
        .listen_addr()
        .parse()
        .context("HOST/PORT do not form a valid socket address")?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
