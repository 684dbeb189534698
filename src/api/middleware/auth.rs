//! Bearer token authentication middleware.
//!
//! Both layers resolve the access token through
//! [`crate::application::services::AuthService::authenticate`] and store the
//! outcome in the request extensions.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use axum_auth::AuthBearer;

use crate::api::error::ApiError;
use crate::application::services::AuthenticatedUser;
use crate::state::AppState;

/// The caller of a route that accepts but does not require authentication.
#[derive(Debug, Clone)]
pub struct Viewer(pub Option<AuthenticatedUser>);

/// Requires `Authorization: Bearer <access token>`.
///
/// Inserts [`AuthenticatedUser`] for the handler.
///
/// # Errors
///
/// `401` with `MISSING_CREDENTIALS` when the header is absent or not a bearer
/// token, `INVALID_SESSION` when the token is rejected.
///
/// ```rust,ignore
/// let protected = Router::new()
///     .route("/links", get(links_handler))
///     .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer));
/// ```
pub async fn layer(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let (mut parts, body) = req.into_parts();

    let AuthBearer(token) = AuthBearer::from_request_parts(&mut parts, &())
        .await
        .map_err(|_| ApiError::missing_credentials())?;

    let user = state.auth.authenticate(&token).await?;
    parts.extensions.insert(user);

    Ok(next.run(Request::from_parts(parts, body)).await)
}

/// Authenticates when an `Authorization` header is present.
///
/// Inserts [`Viewer`]. A present but invalid token is still rejected with
/// `401`; only a missing header yields an anonymous viewer.
pub async fn optional_layer(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let (mut parts, body) = req.into_parts();

    let viewer = if parts.headers.contains_key(header::AUTHORIZATION) {
        let AuthBearer(token) = AuthBearer::from_request_parts(&mut parts, &())
            .await
            .map_err(|_| ApiError::missing_credentials())?;

        Some(state.auth.authenticate(&token).await?)
    } else {
        None
    };

    parts.extensions.insert(Viewer(viewer));

    Ok(next.run(Request::from_parts(parts, body)).await)
}
