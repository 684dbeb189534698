//! REST API layer.
//!
//! Translates HTTP requests into service calls and service results into
//! responses. Errors are rendered by [`error::ApiError`].
//!
//! # Modules
//!
//! - [`dto`] - request/response bodies
//! - [`error`] - error kind to status mapping
//! - [`extract`] - JSON and query extractors with uniform rejections
//! - [`handlers`] - HTTP request handlers
//! - [`middleware`] - authentication and tracing
//! - [`routes`] - `/api` route groups

pub mod dto;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod routes;
