//! Random bearer secrets and the `<session_id>.<secret>` token format.
//!
//! Secrets are 32 bytes from the OS RNG, encoded as URL-safe base64 without
//! padding (43 characters). Only their digests are ever persisted.

use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use crate::error::{AppResult, DomainError, InfrastructureError};

const SECRET_BYTES: usize = 32;

/// Encoded length of a secret.
pub const SECRET_LENGTH: usize = 43;

fn generate_secret() -> AppResult<String> {
    let mut buffer = [0u8; SECRET_BYTES];
    getrandom::fill(&mut buffer)
        .map_err(|e| InfrastructureError::Crypto(format!("random source failed: {e}")))?;
    Ok(URL_SAFE_NO_PAD.encode(buffer))
}

fn is_well_formed(secret: &str) -> bool {
    secret.len() == SECRET_LENGTH
        && secret
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// Plaintext half of a refresh token.
#[derive(Clone, PartialEq, Eq)]
pub struct PlainRefreshSecret(String);

impl PlainRefreshSecret {
    /// Draws a fresh secret from the OS random source.
    ///
    /// # Errors
    ///
    /// Returns [`InfrastructureError::Crypto`] if the random source fails.
    pub fn generate() -> AppResult<Self> {
        generate_secret().map(Self)
    }

    /// # Errors
    ///
    /// Returns [`DomainError::InvalidRefreshSecret`] unless `input` is a
    /// 43-character URL-safe base64 string.
    pub fn parse(input: &str) -> Result<Self, DomainError> {
        if is_well_formed(input) {
            Ok(Self(input.to_string()))
        } else {
            Err(DomainError::InvalidRefreshSecret)
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PlainRefreshSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PlainRefreshSecret(***)")
    }
}

/// Plaintext half of an access (session) token.
#[derive(Clone, PartialEq, Eq)]
pub struct PlainSessionSecret(String);

impl PlainSessionSecret {
    pub fn generate() -> AppResult<Self> {
        generate_secret().map(Self)
    }

    /// Returns `None` for anything that could not have been issued by
    /// [`PlainSessionSecret::generate`].
    pub fn parse(input: &str) -> Option<Self> {
        is_well_formed(input).then(|| Self(input.to_string()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PlainSessionSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PlainSessionSecret(***)")
    }
}

/// A bearer token split into the session it names and the secret proving it.
///
/// Wire format: `<session_id>.<secret>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken<S> {
    pub session_id: String,
    pub secret: S,
}

impl<S> SessionToken<S> {
    pub fn new(session_id: impl Into<String>, secret: S) -> Self {
        Self {
            session_id: session_id.into(),
            secret,
        }
    }

    /// Splits `<session_id>.<secret>` and validates the secret with `parse_secret`.
    pub fn parse_with(input: &str, parse_secret: impl FnOnce(&str) -> Option<S>) -> Option<Self> {
        let (session_id, secret) = input.trim().split_once('.')?;

        if session_id.is_empty() || !session_id.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return None;
        }

        Some(Self::new(session_id, parse_secret(secret)?))
    }
}

impl SessionToken<PlainRefreshSecret> {
    pub fn encode(&self) -> String {
        format!("{}.{}", self.session_id, self.secret.expose())
    }
}

impl SessionToken<PlainSessionSecret> {
    pub fn encode(&self) -> String {
        format!("{}.{}", self.session_id, self.secret.expose())
    }
}
