//! Row types read from PostgreSQL and their conversion into entities.
//!
//! Rows are re-validated on the way in: a row that no longer satisfies the
//! entity invariants surfaces as a storage error instead of a panic.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::domain::entities::{Session, ShortUrl, User};
use crate::domain::values::{Digest, ValidEmail, ValidUrl};
use crate::error::AppError;

/// Column list matching [`ShortUrlRow`].
pub const SHORT_URL_COLUMNS: &str = "id, code, url, owner_id, created_at";

pub const USER_COLUMNS: &str = "id, email, password_hash, created_at";

pub const SESSION_COLUMNS: &str = "id, user_id, access_digest, refresh_digest, digest_algorithm, \
     access_expires_at, refresh_expires_at, created_at";

/// Parses a string id into a `BIGSERIAL` key.
pub fn parse_key(id: &str) -> Option<i64> {
    id.parse().ok()
}

fn corrupt(table: &str, id: i64, reason: impl std::fmt::Display) -> AppError {
    AppError::storage(format!("corrupt {table} row {id}: {reason}"))
}

#[derive(Debug, FromRow)]
pub struct ShortUrlRow {
    pub id: i64,
    pub code: String,
    pub url: String,
    pub owner_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ShortUrlRow> for ShortUrl {
    type Error = AppError;

    fn try_from(row: ShortUrlRow) -> Result<Self, Self::Error> {
        let url = ValidUrl::parse(&row.url).map_err(|e| corrupt("short_urls", row.id, e))?;

        ShortUrl::restore(
            row.id.to_string(),
            row.code,
            url,
            row.owner_id.map(|id| id.to_string()),
            row.created_at,
        )
        .map_err(|e| corrupt("short_urls", row.id, e))
    }
}

#[derive(Debug, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = AppError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = ValidEmail::parse(&row.email).map_err(|e| corrupt("users", row.id, e))?;

        Ok(User {
            id: Some(row.id.to_string()),
            email,
            password_hash: row.password_hash,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub struct SessionRow {
    pub id: i64,
    pub user_id: i64,
    pub access_digest: String,
    pub refresh_digest: String,
    pub digest_algorithm: String,
    pub access_expires_at: DateTime<Utc>,
    pub refresh_expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<SessionRow> for Session {
    fn from(row: SessionRow) -> Self {
        Session {
            id: Some(row.id.to_string()),
            user_id: row.user_id.to_string(),
            access_digest: Digest::new(row.access_digest, row.digest_algorithm.clone()),
            refresh_digest: Digest::new(row.refresh_digest, row.digest_algorithm),
            access_expires_at: row.access_expires_at,
            refresh_expires_at: row.refresh_expires_at,
            created_at: row.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_short_url_row_converts() {
        let row = ShortUrlRow {
            id: 3,
            code: "abc1234".to_string(),
            url: "https://example.com".to_string(),
            owner_id: Some(9),
            created_at: Utc::now(),
        };

        let short_url = ShortUrl::try_from(row).unwrap();
        assert_eq!(short_url.id(), Some("3"));
        assert_eq!(short_url.owner_id(), Some("9"));
    }

    #[test]
    fn test_corrupt_row_is_storage_error() {
        let row = ShortUrlRow {
            id: 4,
            code: "abc1234".to_string(),
            url: "not a url".to_string(),
            owner_id: None,
            created_at: Utc::now(),
        };

        let err = ShortUrl::try_from(row).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Storage);
        assert!(err.to_string().contains("short_urls row 4"));
    }

    #[test]
    fn test_parse_key() {
        assert_eq!(parse_key("42"), Some(42));
        assert_eq!(parse_key("abc"), None);
    }
}
