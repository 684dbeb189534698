//! Data Transfer Objects for API requests and responses.

pub mod auth;
pub mod health;
pub mod links;
pub mod pagination;
pub mod shorten;
