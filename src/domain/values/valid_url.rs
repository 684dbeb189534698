//! Validated redirect target.

use std::fmt;

use url::Url;

use crate::error::DomainError;

/// Longest target URL accepted, in bytes.
pub const MAX_URL_LENGTH: usize = 2048;

/// A syntactically valid, absolute HTTP(S) URL.
///
/// The wrapped string is the trimmed input exactly as supplied: resolving a
/// short code must hand back the same URL that was shortened, so nothing is
/// rewritten (no host lowercasing, no trailing-slash insertion).
///
/// # Rules
///
/// 1. Must parse as an absolute URL
/// 2. Scheme must be `http` or `https` (rejects `javascript:`, `data:`, `file:`, ...)
/// 3. Must have a non-empty host
/// 4. At most [`MAX_URL_LENGTH`] bytes
/// 5. No spaces or ASCII control characters inside the trimmed input
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValidUrl(String);

impl ValidUrl {
    /// Validates `input` and wraps it.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidUrl`] if any rule is violated.
    ///
    /// # Examples
    ///
    /// ```
    /// use snaplink::domain::values::ValidUrl;
    ///
    /// let url = ValidUrl::parse("https://example.com/very/long/path").unwrap();
    /// assert_eq!(url.as_str(), "https://example.com/very/long/path");
    ///
    /// assert!(ValidUrl::parse("not-a-url").is_err());
    /// assert!(ValidUrl::parse("").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<Self, DomainError> {
        let trimmed = input.trim();

        if trimmed.is_empty() {
            return Err(DomainError::invalid_url("empty input"));
        }

        if trimmed.len() > MAX_URL_LENGTH {
            return Err(DomainError::invalid_url(format!(
                "longer than {MAX_URL_LENGTH} bytes"
            )));
        }

        // Stored verbatim, so nothing the parser would silently drop or encode.
        if let Some(c) = trimmed.chars().find(|c| c.is_ascii_control() || *c == ' ') {
            return Err(DomainError::invalid_url(format!(
                "contains a disallowed character {c:?}"
            )));
        }

        let parsed = Url::parse(trimmed)
            .map_err(|e| DomainError::invalid_url(format!("'{trimmed}' ({e})")))?;

        match parsed.scheme() {
            "http" | "https" => {}
            other => {
                return Err(DomainError::invalid_url(format!(
                    "scheme '{other}' is not allowed"
                )));
            }
        }

        if parsed.host_str().is_none_or(str::is_empty) {
            return Err(DomainError::invalid_url(format!("'{trimmed}' has no host")));
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ValidUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ValidUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
