//! HTTP middleware: bearer authentication and request tracing.

pub mod auth;
pub mod tracing;
