//! Cryptographic adapters for the digesting and hashing ports.

pub mod argon2_hasher;
pub mod hmac_digester;

pub use argon2_hasher::Argon2PasswordHasher;
pub use hmac_digester::{HmacAlgorithm, HmacTokenDigester};
