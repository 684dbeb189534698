//! Domain layer: entities, value objects and the ports they are stored through.
//!
//! Nothing here depends on infrastructure or presentation code.
//!
//! - [`values`] - validated value objects
//! - [`entities`] - [`entities::ShortUrl`], [`entities::User`], [`entities::Session`]
//! - [`repositories`] - reader and writer traits
//! - [`ports`] - unit of work, digesting, hashing, code generation

pub mod entities;
pub mod ports;
pub mod repositories;
pub mod values;
