use crate::domain::values::PlainPassword;
use crate::error::AppResult;

/// One-way password hashing.
pub trait PasswordHasher: Send + Sync {
    /// Hashes with a fresh salt and returns a PHC string.
    fn hash(&self, password: &PlainPassword) -> AppResult<String>;

    /// Returns false for a wrong password and for an unparseable hash.
    fn verify(&self, password: &str, hash: &str) -> bool;
}
