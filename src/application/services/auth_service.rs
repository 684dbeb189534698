//! Account registration and session management.
//!
//! # Tokens
//!
//! Login issues two bearer tokens of the form `<session_id>.<secret>`. Only
//! HMAC digests of the secrets are stored (see [`TokenDigester`]). The access
//! token authenticates requests; the refresh token can be exchanged exactly
//! once for a new pair.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::domain::entities::{Session, SessionRotation, User};
use crate::domain::ports::{PasswordHasher, TokenDigester, UnitOfWork, run};
use crate::domain::repositories::{SessionRepository, UserRepository, UserSaveError};
use crate::domain::values::{
    PlainPassword, PlainRefreshSecret, PlainSessionSecret, SessionToken, ValidEmail,
};
use crate::error::{AppError, AppResult, ApplicationError, InfrastructureError};

/// Default access token lifetime (15 minutes).
pub const DEFAULT_SESSION_TTL_SECONDS: i64 = 900;

/// Default refresh token lifetime (30 days).
pub const DEFAULT_REFRESH_TTL_SECONDS: i64 = 2_592_000;

/// Hashed once and verified against when a login names an unknown email.
const DUMMY_PASSWORD: &str = "snaplink-unknown-account-0";

/// Tokens handed to the client after login or refresh.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub session_id: String,
    pub user_id: String,
    pub access_token: String,
    pub refresh_token: String,
    pub access_expires_at: DateTime<Utc>,
    pub refresh_expires_at: DateTime<Utc>,
}

/// The caller behind a valid access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub session_id: String,
}

pub struct AuthService {
    unit_of_work: Arc<dyn UnitOfWork>,
    users: Arc<dyn UserRepository>,
    sessions: Arc<dyn SessionRepository>,
    digester: Arc<dyn TokenDigester>,
    hasher: Arc<dyn PasswordHasher>,
    session_ttl: Duration,
    refresh_ttl: Duration,
    dummy_hash: OnceCell<String>,
}

struct FreshSecrets {
    access: PlainSessionSecret,
    refresh: PlainRefreshSecret,
    rotation: SessionRotation,
}

impl AuthService {
    pub fn new(
        unit_of_work: Arc<dyn UnitOfWork>,
        users: Arc<dyn UserRepository>,
        sessions: Arc<dyn SessionRepository>,
        digester: Arc<dyn TokenDigester>,
        hasher: Arc<dyn PasswordHasher>,
    ) -> Self {
        Self {
            unit_of_work,
            users,
            sessions,
            digester,
            hasher,
            session_ttl: Duration::seconds(DEFAULT_SESSION_TTL_SECONDS),
            refresh_ttl: Duration::seconds(DEFAULT_REFRESH_TTL_SECONDS),
            dummy_hash: OnceCell::new(),
        }
    }

    pub fn with_ttls(mut self, session_ttl: Duration, refresh_ttl: Duration) -> Self {
        self.session_ttl = session_ttl;
        self.refresh_ttl = refresh_ttl;
        self
    }

    /// Creates an account.
    ///
    /// # Errors
    ///
    /// - `INVALID_EMAIL` / `PASSWORD_TOO_WEAK` for bad input
    /// - [`ApplicationError::EmailAlreadyRegistered`] if the email is taken
    pub async fn register(&self, email: &str, password: &str) -> AppResult<User> {
        let email = ValidEmail::parse(email)?;
        let password = PlainPassword::parse(password)?;
        let user = User::new(email, self.hash_password(password).await?);

        let saved = run(self.unit_of_work.as_ref(), move |tx| {
            Box::pin(async move { tx.users().save(user).await })
        })
        .await
        .map_err(|e| match e {
            UserSaveError::EmailTaken(email) => {
                AppError::from(ApplicationError::EmailAlreadyRegistered { email })
            }
            UserSaveError::Storage(e) => e,
        })?;

        info!(user_id = ?saved.id, "User registered");
        Ok(saved)
    }

    /// Checks credentials and opens a new session.
    ///
    /// Unknown email and wrong password fail identically, and both pay for
    /// one password verification.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<IssuedSession> {
        let Ok(email) = ValidEmail::parse(email) else {
            return Err(ApplicationError::InvalidCredentials.into());
        };

        let Some(user) = self.users.find_by_email(&email).await? else {
            let dummy = self.dummy_hash().await?.to_string();
            self.verify_password(password, dummy).await?;
            return Err(ApplicationError::InvalidCredentials.into());
        };

        if !self
            .verify_password(password, user.password_hash.clone())
            .await?
        {
            debug!(user_id = ?user.id, "Password mismatch");
            return Err(ApplicationError::InvalidCredentials.into());
        }

        let user_id = user
            .id
            .ok_or_else(|| AppError::storage("stored user has no id"))?;

        let now = Utc::now();
        let fresh = self.fresh_secrets(now)?;
        let session = Session {
            id: None,
            user_id: user_id.clone(),
            access_digest: fresh.rotation.access_digest.clone(),
            refresh_digest: fresh.rotation.refresh_digest.clone(),
            access_expires_at: fresh.rotation.access_expires_at,
            refresh_expires_at: fresh.rotation.refresh_expires_at,
            created_at: now,
        };

        let saved = run(self.unit_of_work.as_ref(), move |tx| {
            Box::pin(async move { tx.sessions().save(session).await })
        })
        .await?;

        let session_id = saved
            .id
            .ok_or_else(|| AppError::storage("stored session has no id"))?;

        info!(user_id = %user_id, session_id = %session_id, "Session opened");
        Ok(Self::issued(session_id, user_id, fresh))
    }

    /// Resolves an access token to its user.
    ///
    /// # Errors
    ///
    /// [`ApplicationError::InvalidSession`] if the token is malformed, names
    /// no session, carries the wrong secret, or has expired.
    pub async fn authenticate(&self, access_token: &str) -> AppResult<AuthenticatedUser> {
        let token = SessionToken::parse_with(access_token, PlainSessionSecret::parse)
            .ok_or(ApplicationError::InvalidSession)?;

        let session = self
            .sessions
            .find_by_id(&token.session_id)
            .await?
            .ok_or(ApplicationError::InvalidSession)?;

        if !self
            .digester
            .verify(token.secret.expose(), &session.access_digest)?
        {
            return Err(ApplicationError::InvalidSession.into());
        }

        if session.is_access_expired(Utc::now()) {
            debug!(session_id = %token.session_id, "Access token expired");
            return Err(ApplicationError::InvalidSession.into());
        }

        Ok(AuthenticatedUser {
            user_id: session.user_id,
            session_id: token.session_id,
        })
    }

    /// Exchanges a refresh token for a new token pair.
    ///
    /// Both secrets are replaced only if the stored refresh digest is still
    /// the one this token matched, so replaying a used refresh token fails.
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<IssuedSession> {
        let token = SessionToken::parse_with(refresh_token, |s| PlainRefreshSecret::parse(s).ok())
            .ok_or(ApplicationError::InvalidSession)?;

        let session = self
            .sessions
            .find_by_id(&token.session_id)
            .await?
            .ok_or(ApplicationError::InvalidSession)?;

        let now = Utc::now();

        if !self
            .digester
            .verify(token.secret.expose(), &session.refresh_digest)?
            || session.is_refresh_expired(now)
        {
            return Err(ApplicationError::InvalidSession.into());
        }

        let fresh = self.fresh_secrets(now)?;
        let rotation = fresh.rotation.clone();
        let session_id = token.session_id.clone();
        let expected = session.refresh_digest;

        let rotated = run(self.unit_of_work.as_ref(), move |tx| {
            Box::pin(async move {
                tx.sessions()
                    .rotate(&session_id, &expected, rotation)
                    .await
            })
        })
        .await?;

        if !rotated {
            debug!(session_id = %token.session_id, "Refresh token already used");
            return Err(ApplicationError::InvalidSession.into());
        }

        info!(session_id = %token.session_id, "Session refreshed");
        Ok(Self::issued(token.session_id, session.user_id, fresh))
    }

    /// Ends a session. Logging out twice is not an error.
    pub async fn logout(&self, session_id: &str) -> AppResult<()> {
        let id = session_id.to_string();

        let deleted = run(self.unit_of_work.as_ref(), move |tx| {
            Box::pin(async move { tx.sessions().delete(&id).await })
        })
        .await?;

        info!(session_id = %session_id, deleted, "Session closed");
        Ok(())
    }

    /// Ends every session of the account registered under `email`.
    ///
    /// Returns the number of sessions removed.
    pub async fn revoke_all(&self, email: &str) -> AppResult<u64> {
        let email = ValidEmail::parse(email)?;

        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or_else(|| ApplicationError::not_found("user", email.as_str()))?;
        let user_id = user
            .id
            .ok_or_else(|| AppError::storage("stored user has no id"))?;

        let revoked = run(self.unit_of_work.as_ref(), move |tx| {
            Box::pin(async move { tx.sessions().delete_for_user(&user_id).await })
        })
        .await?;

        info!(email = %email, revoked, "Sessions revoked");
        Ok(revoked)
    }

    async fn hash_password(&self, password: PlainPassword) -> AppResult<String> {
        let hasher = Arc::clone(&self.hasher);

        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| InfrastructureError::Crypto(format!("hashing task failed: {e}")))?
    }

    async fn verify_password(&self, password: &str, hash: String) -> AppResult<bool> {
        let hasher = Arc::clone(&self.hasher);
        let password = password.to_string();

        let matched = tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| InfrastructureError::Crypto(format!("verification task failed: {e}")))?;

        Ok(matched)
    }

    async fn dummy_hash(&self) -> AppResult<&str> {
        let password = PlainPassword::parse(DUMMY_PASSWORD)?;
        let hash = self
            .dummy_hash
            .get_or_try_init(|| self.hash_password(password))
            .await?;

        Ok(hash.as_str())
    }

    fn fresh_secrets(&self, now: DateTime<Utc>) -> AppResult<FreshSecrets> {
        let access = PlainSessionSecret::generate()?;
        let refresh = PlainRefreshSecret::generate()?;

        let rotation = SessionRotation {
            access_digest: self.digester.digest(access.expose())?,
            refresh_digest: self.digester.digest(refresh.expose())?,
            access_expires_at: now + self.session_ttl,
            refresh_expires_at: now + self.refresh_ttl,
        };

        Ok(FreshSecrets {
            access,
            refresh,
            rotation,
        })
    }

    fn issued(session_id: String, user_id: String, fresh: FreshSecrets) -> IssuedSession {
        IssuedSession {
            access_token: SessionToken::new(session_id.clone(), fresh.access).encode(),
            refresh_token: SessionToken::new(session_id.clone(), fresh.refresh).encode(),
            access_expires_at: fresh.rotation.access_expires_at,
            refresh_expires_at: fresh.rotation.refresh_expires_at,
            session_id,
            user_id,
        }
    }
}
