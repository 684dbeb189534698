//! Handlers for account and session endpoints.

use axum::{Extension, Json, extract::State, http::StatusCode};

use crate::api::dto::auth::{CredentialsRequest, RefreshRequest, TokenResponse, UserResponse};
use crate::api::error::ApiError;
use crate::api::extract::ApiJson;
use crate::application::services::AuthenticatedUser;
use crate::state::AppState;

/// `POST /api/auth/register` - `201` with the new account.
///
/// `409 EMAIL_ALREADY_REGISTERED` if the email is taken.
pub async fn register_handler(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CredentialsRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let user = state
        .auth
        .register(&payload.email, &payload.password)
        .await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// `POST /api/auth/login` - access and refresh tokens.
pub async fn login_handler(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CredentialsRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let issued = state.auth.login(&payload.email, &payload.password).await?;
    Ok(Json(issued.into()))
}

/// `POST /api/auth/refresh` - exchanges a refresh token for a new pair.
pub async fn refresh_handler(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RefreshRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let issued = state.auth.refresh(&payload.refresh_token).await?;
    Ok(Json(issued.into()))
}

/// `POST /api/auth/logout` - ends the caller's session. `204`.
pub async fn logout_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<StatusCode, ApiError> {
    state.auth.logout(&user.session_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
