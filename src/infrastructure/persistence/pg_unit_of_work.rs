//! PostgreSQL unit of work.
//!
//! Each [`PgTransaction`] wraps one sqlx transaction and implements all
//! writers on it directly. sqlx rolls back a transaction that is dropped
//! without a commit.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres};
use tracing::debug;

use super::rows::{SESSION_COLUMNS, SessionRow, parse_key};
use crate::domain::entities::{Session, SessionRotation, ShortUrl, User};
use crate::domain::ports::{Transaction, UnitOfWork};
use crate::domain::repositories::{
    CodeError, SessionWriter, ShortUrlWriter, UserSaveError, UserWriter,
};
use crate::domain::values::Digest;
use crate::error::{AppError, AppResult};
use crate::utils::db_error::{
    SHORT_URL_CODE_CONSTRAINT, USER_EMAIL_CONSTRAINT, is_unique_violation_on,
};

pub struct PgUnitOfWork {
    pool: Arc<PgPool>,
}

impl PgUnitOfWork {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn begin(&self) -> AppResult<Box<dyn Transaction>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgTransaction { tx }))
    }

    async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await
            .is_ok()
    }
}

pub struct PgTransaction {
    tx: sqlx::Transaction<'static, Postgres>,
}

fn owner_key(owner_id: Option<&str>) -> AppResult<Option<i64>> {
    owner_id
        .map(|id| {
            parse_key(id).ok_or_else(|| AppError::storage(format!("invalid owner id '{id}'")))
        })
        .transpose()
}

#[async_trait]
impl Transaction for PgTransaction {
    fn short_urls(&mut self) -> &mut dyn ShortUrlWriter {
        self
    }

    fn users(&mut self) -> &mut dyn UserWriter {
        self
    }

    fn sessions(&mut self) -> &mut dyn SessionWriter {
        self
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let PgTransaction { tx } = *self;
        tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        let PgTransaction { tx } = *self;
        tx.rollback().await?;
        debug!("Transaction rolled back");
        Ok(())
    }
}

#[async_trait]
impl ShortUrlWriter for PgTransaction {
    async fn save(&mut self, short_url: ShortUrl) -> Result<ShortUrl, CodeError> {
        let owner_id = owner_key(short_url.owner_id())?;

        let inserted = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO short_urls (code, url, owner_id, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(short_url.code())
        .bind(short_url.url().as_str())
        .bind(owner_id)
        .bind(short_url.created_at())
        .fetch_one(&mut *self.tx)
        .await;

        match inserted {
            Ok(id) => Ok(short_url.with_id(id.to_string())),
            Err(e) if is_unique_violation_on(&e, SHORT_URL_CODE_CONSTRAINT) => {
                Err(CodeError::Collision(short_url.code().to_string()))
            }
            Err(e) => Err(AppError::from(e).into()),
        }
    }
}

#[async_trait]
impl UserWriter for PgTransaction {
    async fn save(&mut self, mut user: User) -> Result<User, UserSaveError> {
        let inserted = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO users (email, password_hash, created_at)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(user.email.as_str())
        .bind(&user.password_hash)
        .bind(user.created_at)
        .fetch_one(&mut *self.tx)
        .await;

        match inserted {
            Ok(id) => {
                user.id = Some(id.to_string());
                Ok(user)
            }
            Err(e) if is_unique_violation_on(&e, USER_EMAIL_CONSTRAINT) => {
                Err(UserSaveError::EmailTaken(user.email.to_string()))
            }
            Err(e) => Err(AppError::from(e).into()),
        }
    }
}

#[async_trait]
impl SessionWriter for PgTransaction {
    async fn save(&mut self, session: Session) -> AppResult<Session> {
        let user_id = parse_key(&session.user_id)
            .ok_or_else(|| AppError::storage(format!("invalid user id '{}'", session.user_id)))?;

        let row = sqlx::query_as::<_, SessionRow>(&format!(
            r#"
            INSERT INTO sessions (user_id, access_digest, refresh_digest, digest_algorithm,
                                  access_expires_at, refresh_expires_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {SESSION_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(&session.access_digest.value)
        .bind(&session.refresh_digest.value)
        .bind(&session.access_digest.algorithm)
        .bind(session.access_expires_at)
        .bind(session.refresh_expires_at)
        .bind(session.created_at)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(row.into())
    }

    async fn rotate(
        &mut self,
        id: &str,
        expected_refresh: &Digest,
        rotation: SessionRotation,
    ) -> AppResult<bool> {
        let Some(id) = parse_key(id) else {
            return Ok(false);
        };

        let result = sqlx::query(
            r#"
            UPDATE sessions
            SET access_digest = $1,
                refresh_digest = $2,
                digest_algorithm = $3,
                access_expires_at = $4,
                refresh_expires_at = $5
            WHERE id = $6
              AND refresh_digest = $7
              AND digest_algorithm = $8
            "#,
        )
        .bind(&rotation.access_digest.value)
        .bind(&rotation.refresh_digest.value)
        .bind(&rotation.access_digest.algorithm)
        .bind(rotation.access_expires_at)
        .bind(rotation.refresh_expires_at)
        .bind(id)
        .bind(&expected_refresh.value)
        .bind(&expected_refresh.algorithm)
        .execute(&mut *self.tx)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn delete(&mut self, id: &str) -> AppResult<bool> {
        let Some(id) = parse_key(id) else {
            return Ok(false);
        };

        let result = sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_for_user(&mut self, user_id: &str) -> AppResult<u64> {
        let Some(user_id) = parse_key(user_id) else {
            return Ok(0);
        };

        let result = sqlx::query("DELETE FROM sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected())
    }
}
