//! PostgreSQL implementation of the user reader.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;

use super::rows::{USER_COLUMNS, UserRow, parse_key};
use crate::domain::entities::User;
use crate::domain::repositories::UserRepository;
use crate::domain::values::ValidEmail;
use crate::error::AppResult;

pub struct PgUserRepository {
    pool: Arc<PgPool>,
}

impl PgUserRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_email(&self, email: &ValidEmail) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>> {
        let Some(id) = parse_key(id) else {
            return Ok(None);
        };

        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(User::try_from).transpose()
    }
}
