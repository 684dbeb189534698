//! Top-level router.
//!
//! # Route Structure
//!
//! - `GET  /{code}`              - redirect (public)
//! - `GET  /health`              - store and cache health (public)
//! - `POST /api/shorten`         - create a short URL (bearer token optional)
//! - `POST /api/auth/register`   - create an account
//! - `POST /api/auth/login`      - open a session
//! - `POST /api/auth/refresh`    - rotate session tokens
//! - `POST /api/auth/logout`     - close the session (bearer token required)
//! - `GET  /api/links`           - list own short URLs (bearer token required)

use axum::routing::get;
use axum::{Router, middleware};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

use crate::api;
use crate::api::handlers::{health_handler, redirect_handler};
use crate::api::middleware::{auth, tracing};
use crate::state::AppState;

/// Builds the router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let protected = api::routes::protected_routes()
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer));

    let optional = api::routes::optional_auth_routes().route_layer(
        middleware::from_fn_with_state(state.clone(), auth::optional_layer),
    );

    let api_router = Router::new()
        .merge(api::routes::public_routes())
        .merge(optional)
        .merge(protected);

    Router::new()
        .route("/{code}", get(redirect_handler))
        .route("/health", get(health_handler))
        .nest("/api", api_router)
        .with_state(state)
        .layer(tracing::layer())
}

/// [`build_router`] with trailing slashes trimmed before routing.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(build_router(state))
}
