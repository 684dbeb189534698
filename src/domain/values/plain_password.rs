//! Plaintext password that meets the strength policy.

use std::fmt;

use crate::error::DomainError;

pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// A password accepted by the strength policy, held only until it is hashed.
///
/// `Debug` is redacted so the plaintext never reaches a log line.
#[derive(Clone)]
pub struct PlainPassword(String);

impl PlainPassword {
    /// # Rules
    ///
    /// - 8 to 128 characters
    /// - at least one letter
    /// - at least one digit
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::PasswordTooWeak`] naming the first failed rule.
    pub fn parse(input: &str) -> Result<Self, DomainError> {
        let length = input.chars().count();

        if length < MIN_PASSWORD_LENGTH {
            return Err(DomainError::password_too_weak(format!(
                "must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }

        if length > MAX_PASSWORD_LENGTH {
            return Err(DomainError::password_too_weak(format!(
                "must be at most {MAX_PASSWORD_LENGTH} characters"
            )));
        }

        if !input.chars().any(char::is_alphabetic) {
            return Err(DomainError::password_too_weak("must contain a letter"));
        }

        if !input.chars().any(|c| c.is_ascii_digit()) {
            return Err(DomainError::password_too_weak("must contain a digit"));
        }

        Ok(Self(input.to_string()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PlainPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PlainPassword(***)")
    }
}
