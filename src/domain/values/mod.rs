//! Value objects: immutable, validated at construction, compared by value.
//!
//! - [`ValidUrl`] - redirect target
//! - [`ValidEmail`] - normalized account email
//! - [`PlainPassword`] - password meeting the strength policy
//! - [`PlainRefreshSecret`], [`PlainSessionSecret`], [`SessionToken`] - bearer secrets
//! - [`Digest`] - stored form of a secret

pub mod digest;
pub mod plain_password;
pub mod secret;
pub mod valid_email;
pub mod valid_url;

pub use digest::Digest;
pub use plain_password::PlainPassword;
pub use secret::{PlainRefreshSecret, PlainSessionSecret, SessionToken};
pub use valid_email::ValidEmail;
pub use valid_url::ValidUrl;
