//! Validated, normalized email address.

use std::fmt;

use validator::ValidateEmail;

use crate::error::DomainError;

/// An email address that passed syntax validation.
///
/// Stored trimmed and lowercased so lookups and the uniqueness constraint
/// treat `Alice@Example.com` and `alice@example.com` as the same account.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValidEmail(String);

impl ValidEmail {
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidEmail`] when the input is empty or not a
    /// syntactically valid address.
    pub fn parse(input: &str) -> Result<Self, DomainError> {
        let normalized = input.trim().to_lowercase();

        if normalized.is_empty() {
            return Err(DomainError::invalid_email("empty input"));
        }

        if !normalized.validate_email() {
            return Err(DomainError::invalid_email(format!(
                "'{normalized}' is not a valid address"
            )));
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ValidEmail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
