//! Short URL entity: the mapping from a short code to its target.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use crate::domain::values::ValidUrl;
use crate::error::DomainError;

/// Longest short code accepted anywhere in the system.
pub const MAX_CODE_LENGTH: usize = 32;

static CODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]{1,32}$").unwrap());

/// Returns true if `code` has the shape of a short code (1-32 ASCII alphanumerics).
pub fn is_valid_code_format(code: &str) -> bool {
    CODE_REGEX.is_match(code)
}

/// A shortened URL.
///
/// `id` is `None` until a repository persists the entity. The code is checked
/// at construction, so an instance with an empty code cannot exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortUrl {
    id: Option<String>,
    code: String,
    url: ValidUrl,
    owner_id: Option<String>,
    created_at: DateTime<Utc>,
}

impl ShortUrl {
    /// Creates a transient (not yet persisted) short URL.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidShortCode`] if `code` is empty or is not
    /// 1-32 ASCII alphanumerics.
    pub fn new(
        code: impl Into<String>,
        url: ValidUrl,
        owner_id: Option<String>,
    ) -> Result<Self, DomainError> {
        let code = code.into();
        Self::check_code(&code)?;

        Ok(Self {
            id: None,
            code,
            url,
            owner_id,
            created_at: Utc::now(),
        })
    }

    /// Rebuilds a persisted short URL from storage.
    ///
    /// # Errors
    ///
    /// Same code rule as [`ShortUrl::new`].
    pub fn restore(
        id: impl Into<String>,
        code: impl Into<String>,
        url: ValidUrl,
        owner_id: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let code = code.into();
        Self::check_code(&code)?;

        Ok(Self {
            id: Some(id.into()),
            code,
            url,
            owner_id,
            created_at,
        })
    }

    fn check_code(code: &str) -> Result<(), DomainError> {
        if code.is_empty() {
            return Err(DomainError::invalid_short_code("code must not be empty"));
        }

        if !is_valid_code_format(code) {
            return Err(DomainError::invalid_short_code(format!(
                "'{code}' must be 1-{MAX_CODE_LENGTH} ASCII letters or digits"
            )));
        }

        Ok(())
    }

    /// Marks the entity as stored under `id`.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn url(&self) -> &ValidUrl {
        &self.url
    }

    pub fn owner_id(&self) -> Option<&str> {
        self.owner_id.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns true once a repository has assigned an id.
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner_id.as_deref() == Some(user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn url() -> ValidUrl {
        ValidUrl::parse("https://example.com").unwrap()
    }

    #[test]
    fn test_new_short_url_is_transient() {
        let short_url = ShortUrl::new("abc1234", url(), None).unwrap();

        assert_eq!(short_url.code(), "abc1234");
        assert_eq!(short_url.url().as_str(), "https://example.com");
        assert!(short_url.id().is_none());
        assert!(!short_url.is_persisted());
    }

    #[test]
    fn test_with_id_marks_persisted() {
        let short_url = ShortUrl::new("abc1234", url(), None)
            .unwrap()
            .with_id("17");

        assert_eq!(short_url.id(), Some("17"));
        assert!(short_url.is_persisted());
    }

    #[test]
    fn test_empty_code_fails_at_construction() {
        let err = ShortUrl::new("", url(), None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidShortCode);
        assert!(err.to_string().contains("must not be empty"));
    }

    #[test]
    fn test_non_alphanumeric_code_fails() {
        assert!(ShortUrl::new("abc-123", url(), None).is_err());
        assert!(ShortUrl::new("a b", url(), None).is_err());
        assert!(ShortUrl::new("x".repeat(MAX_CODE_LENGTH + 1), url(), None).is_err());
    }

    #[test]
    fn test_restore_validates_code() {
        assert!(ShortUrl::restore("1", "", url(), None, Utc::now()).is_err());

        let restored =
            ShortUrl::restore("1", "Zz9", url(), Some("5".to_string()), Utc::now()).unwrap();
        assert!(restored.is_persisted());
        assert!(restored.is_owned_by("5"));
        assert!(!restored.is_owned_by("6"));
    }

    #[test]
    fn test_code_format() {
        assert!(is_valid_code_format("aZ09"));
        assert!(!is_valid_code_format(""));
        assert!(!is_valid_code_format("favicon.ico"));
    }
}
