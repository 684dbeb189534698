//! Shared application state and service wiring.

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;
use tokio::time::Instant;

use crate::application::services::auth_service::{
    DEFAULT_REFRESH_TTL_SECONDS, DEFAULT_SESSION_TTL_SECONDS,
};
use crate::application::services::shortener_service::DEFAULT_MAX_ATTEMPTS;
use crate::application::services::{AuthService, ShortenerService};
use crate::domain::ports::UnitOfWork;
use crate::domain::repositories::{SessionRepository, ShortUrlRepository, UserRepository};
use crate::infrastructure::cache::CacheService;
use crate::infrastructure::memory::MemoryStore;
use crate::infrastructure::persistence::{
    PgSessionRepository, PgShortUrlRepository, PgUnitOfWork, PgUserRepository,
};
use crate::infrastructure::security::{Argon2PasswordHasher, HmacAlgorithm, HmacTokenDigester};
use crate::utils::code_generator::{DEFAULT_CODE_LENGTH, RandomCodeGenerator};

/// The storage ports of one backend.
#[derive(Clone)]
pub struct Backends {
    pub unit_of_work: Arc<dyn UnitOfWork>,
    pub short_urls: Arc<dyn ShortUrlRepository>,
    pub users: Arc<dyn UserRepository>,
    pub sessions: Arc<dyn SessionRepository>,
}

impl Backends {
    pub fn postgres(pool: Arc<PgPool>) -> Self {
        Self {
            unit_of_work: Arc::new(PgUnitOfWork::new(pool.clone())),
            short_urls: Arc::new(PgShortUrlRepository::new(pool.clone())),
            users: Arc::new(PgUserRepository::new(pool.clone())),
            sessions: Arc::new(PgSessionRepository::new(pool)),
        }
    }

    pub fn memory(store: &MemoryStore) -> Self {
        Self {
            unit_of_work: Arc::new(store.clone()),
            short_urls: Arc::new(store.clone()),
            users: Arc::new(store.clone()),
            sessions: Arc::new(store.clone()),
        }
    }
}

/// Tunables for the services, usually taken from [`crate::config::Config`].
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub base_url: String,
    pub request_timeout: Duration,
    pub code_length: usize,
    pub max_code_attempts: u32,
    pub signing_secret: String,
    pub digest_algorithm: HmacAlgorithm,
    pub session_ttl: chrono::Duration,
    pub refresh_ttl: chrono::Duration,
}

impl ServiceSettings {
    /// Settings with every tunable at its default.
    pub fn new(base_url: impl Into<String>, signing_secret: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            request_timeout: Duration::from_millis(5000),
            code_length: DEFAULT_CODE_LENGTH,
            max_code_attempts: DEFAULT_MAX_ATTEMPTS,
            signing_secret: signing_secret.into(),
            digest_algorithm: HmacAlgorithm::default(),
            session_ttl: chrono::Duration::seconds(DEFAULT_SESSION_TTL_SECONDS),
            refresh_ttl: chrono::Duration::seconds(DEFAULT_REFRESH_TTL_SECONDS),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub shortener: Arc<ShortenerService>,
    pub auth: Arc<AuthService>,
    pub unit_of_work: Arc<dyn UnitOfWork>,
    pub cache: Arc<dyn CacheService>,
    pub base_url: String,
    pub request_timeout: Duration,
}

impl AppState {
    /// Wires the services on top of `backends`.
    pub fn new(
        backends: Backends,
        cache: Arc<dyn CacheService>,
        settings: &ServiceSettings,
    ) -> Self {
        let shortener = ShortenerService::new(
            backends.unit_of_work.clone(),
            backends.short_urls,
            Arc::new(RandomCodeGenerator::new(settings.code_length)),
        )
        .with_max_attempts(settings.max_code_attempts);

        let auth = AuthService::new(
            backends.unit_of_work.clone(),
            backends.users,
            backends.sessions,
            Arc::new(HmacTokenDigester::new(
                settings.signing_secret.as_bytes().to_vec(),
                settings.digest_algorithm,
            )),
            Arc::new(Argon2PasswordHasher::new()),
        )
        .with_ttls(settings.session_ttl, settings.refresh_ttl);

        Self {
            shortener: Arc::new(shortener),
            auth: Arc::new(auth),
            unit_of_work: backends.unit_of_work,
            cache,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            request_timeout: settings.request_timeout,
        }
    }

    /// Deadline for a request starting now.
    pub fn deadline(&self) -> Instant {
        Instant::now() + self.request_timeout
    }

    /// Public URL that redirects to `code`.
    pub fn short_url(&self, code: &str) -> String {
        format!("{}/{}", self.base_url, code)
    }
}
