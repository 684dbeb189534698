//! PostgreSQL implementations of the storage ports.
//!
//! Queries are built at runtime with `sqlx::query_as` and `FromRow` rows, so
//! the crate builds without a live database. The schema lives in
//! `migrations/`.
//!
//! - [`PgUnitOfWork`] - transactions and all writers
//! - [`PgShortUrlRepository`] - short URL reads
//! - [`PgUserRepository`] - user reads
//! - [`PgSessionRepository`] - session reads

pub mod pg_session_repository;
pub mod pg_short_url_repository;
pub mod pg_unit_of_work;
pub mod pg_user_repository;
pub mod rows;

pub use pg_session_repository::PgSessionRepository;
pub use pg_short_url_repository::PgShortUrlRepository;
pub use pg_unit_of_work::{PgTransaction, PgUnitOfWork};
pub use pg_user_repository::PgUserRepository;
