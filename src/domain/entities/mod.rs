//! Core domain entities.
//!
//! Entities carry identity as an explicit `id: Option<String>`: `None` while
//! transient, `Some` once a repository has stored them.
//!
//! # Entity Types
//!
//! - [`ShortUrl`] - a short code mapped to a target URL, optionally owned
//! - [`User`] - an account that owns short URLs
//! - [`Session`] - a login session backing access and refresh tokens

pub mod session;
pub mod short_url;
pub mod user;

pub use session::{Session, SessionRotation};
pub use short_url::{ShortUrl, is_valid_code_format};
pub use user::User;
