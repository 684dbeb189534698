//! PostgreSQL implementation of the session reader.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;

use super::rows::{SESSION_COLUMNS, SessionRow, parse_key};
use crate::domain::entities::Session;
use crate::domain::repositories::SessionRepository;
use crate::error::AppResult;

pub struct PgSessionRepository {
    pool: Arc<PgPool>,
}

impl PgSessionRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for PgSessionRepository {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Session>> {
        let Some(id) = parse_key(id) else {
            return Ok(None);
        };

        let row = sqlx::query_as::<_, SessionRow>(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Session::from))
    }
}
