//! In-process storage backend, selected with `STORE_URL=memory://`.
//!
//! Data lives for the lifetime of the process. Used by the integration tests
//! and for running the service without PostgreSQL.

pub mod store;

pub use store::{MemoryStore, MemoryTransaction};
