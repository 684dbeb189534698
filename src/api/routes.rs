//! Routes under `/api`.

use axum::Router;
use axum::routing::{get, post};

use crate::api::handlers::{
    links_handler, login_handler, logout_handler, refresh_handler, register_handler,
    shorten_handler,
};
use crate::state::AppState;

/// Routes open to anyone.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register_handler))
        .route("/auth/login", post(login_handler))
        .route("/auth/refresh", post(refresh_handler))
}

/// Routes that accept an optional bearer token.
pub fn optional_auth_routes() -> Router<AppState> {
    Router::new().route("/shorten", post(shorten_handler))
}

/// Routes that require a bearer token.
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/links", get(links_handler))
        .route("/auth/logout", post(logout_handler))
}
