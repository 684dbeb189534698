//! PostgreSQL implementation of the short URL reader.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;

use super::rows::{SHORT_URL_COLUMNS, ShortUrlRow, parse_key};
use crate::domain::entities::ShortUrl;
use crate::domain::repositories::ShortUrlRepository;
use crate::error::AppResult;

pub struct PgShortUrlRepository {
    pool: Arc<PgPool>,
}

impl PgShortUrlRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ShortUrlRepository for PgShortUrlRepository {
    async fn find_by_code(&self, code: &str) -> AppResult<Option<ShortUrl>> {
        let row = sqlx::query_as::<_, ShortUrlRow>(&format!(
            "SELECT {SHORT_URL_COLUMNS} FROM short_urls WHERE code = $1"
        ))
        .bind(code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(ShortUrl::try_from).transpose()
    }

    async fn list_by_owner(
        &self,
        owner_id: &str,
        offset: i64,
        limit: i64,
    ) -> AppResult<Vec<ShortUrl>> {
        let Some(owner_id) = parse_key(owner_id) else {
            return Ok(Vec::new());
        };

        let rows = sqlx::query_as::<_, ShortUrlRow>(&format!(
            r#"
            SELECT {SHORT_URL_COLUMNS}
            FROM short_urls
            WHERE owner_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(owner_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool.as_ref())
        .await?;

        rows.into_iter().map(ShortUrl::try_from).collect()
    }

    async fn count_by_owner(&self, owner_id: &str) -> AppResult<i64> {
        let Some(owner_id) = parse_key(owner_id) else {
            return Ok(0);
        };

        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM short_urls WHERE owner_id = $1")
                .bind(owner_id)
                .fetch_one(self.pool.as_ref())
                .await?;

        Ok(count)
    }
}
