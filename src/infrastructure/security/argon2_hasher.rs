//! Argon2id password hashing.

use argon2::password_hash::{PasswordHash, PasswordVerifier, SaltString};
use argon2::{Argon2, PasswordHasher as _};

use crate::domain::ports::PasswordHasher;
use crate::domain::values::PlainPassword;
use crate::error::{AppResult, InfrastructureError};

const SALT_BYTES: usize = 16;

/// [`PasswordHasher`] producing Argon2id PHC strings with default parameters.
#[derive(Default)]
pub struct Argon2PasswordHasher {
    argon2: Argon2<'static>,
}

impl Argon2PasswordHasher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, password: &PlainPassword) -> AppResult<String> {
        let mut salt = [0u8; SALT_BYTES];
        getrandom::fill(&mut salt)
            .map_err(|e| InfrastructureError::Crypto(format!("random source failed: {e}")))?;

        let salt = SaltString::encode_b64(&salt)
            .map_err(|e| InfrastructureError::Crypto(format!("salt encoding failed: {e}")))?;

        let hash = self
            .argon2
            .hash_password(password.expose().as_bytes(), &salt)
            .map_err(|e| InfrastructureError::Crypto(format!("password hashing failed: {e}")))?;

        Ok(hash.to_string())
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hash) else {
            return false;
        };

        self.argon2
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}
