//! Infrastructure layer: adapters implementing the domain ports.
//!
//! # Modules
//!
//! - [`persistence`] - PostgreSQL storage
//! - [`memory`] - in-process storage
//! - [`cache`] - redirect cache (Redis and no-op)
//! - [`security`] - HMAC token digests and Argon2 password hashing

pub mod cache;
pub mod memory;
pub mod persistence;
pub mod security;
