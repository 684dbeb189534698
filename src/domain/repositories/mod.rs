//! Repository trait definitions for the domain layer.
//!
//! Reads and writes are split. Readers (`*Repository`) are shared
//! `Arc<dyn _>` handles that only ever see committed data. Writers (`*Writer`)
//! are borrowed from an open [`crate::domain::ports::Transaction`] and take
//! `&mut self`, so a write cannot happen outside a unit of work.
//!
//! # Available Repositories
//!
//! - [`ShortUrlRepository`] / [`ShortUrlWriter`] - short URLs
//! - [`UserRepository`] / [`UserWriter`] - accounts
//! - [`SessionRepository`] / [`SessionWriter`] - login sessions
//!
//! Implementations live in [`crate::infrastructure::persistence`] (PostgreSQL)
//! and [`crate::infrastructure::memory`] (in-process). Reader mocks are
//! generated with `mockall` under `cfg(test)`.

pub mod session_repository;
pub mod short_url_repository;
pub mod user_repository;

pub use session_repository::{SessionRepository, SessionWriter};
pub use short_url_repository::{CodeError, ShortUrlRepository, ShortUrlWriter};
pub use user_repository::{UserRepository, UserSaveError, UserWriter};

#[cfg(test)]
pub use session_repository::MockSessionRepository;
#[cfg(test)]
pub use short_url_repository::MockShortUrlRepository;
#[cfg(test)]
pub use user_repository::MockUserRepository;
