//! Application layer: use cases orchestrated over the domain ports.
//!
//! Services take their collaborators as `Arc<dyn Trait>` and return
//! [`crate::error::AppResult`]. They never see HTTP types.
//!
//! # Available Services
//!
//! - [`services::ShortenerService`] - short code allocation and resolution
//! - [`services::AuthService`] - registration, login and session tokens

pub mod services;
