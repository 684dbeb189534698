//! Helpers shared across layers.
//!
//! - [`code_generator`] - random base62 codes and reserved words
//! - [`db_error`] - PostgreSQL constraint-violation detection

pub mod code_generator;
pub mod db_error;
