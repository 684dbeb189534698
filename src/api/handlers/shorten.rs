//! Handler for the shortening endpoint.

use axum::{Extension, Json, extract::State, http::StatusCode};

use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::api::error::ApiError;
use crate::api::extract::ApiJson;
use crate::api::middleware::auth::Viewer;
use crate::state::AppState;

/// Creates a short URL.
///
/// # Endpoint
///
/// `POST /api/shorten`
///
/// ```json
/// { "url": "https://example.com/some/long/path" }
/// ```
///
/// Responds `201 Created`:
///
/// ```json
/// {
///   "id": "1",
///   "code": "aZ3k9Qx",
///   "url": "https://example.com/some/long/path",
///   "short_url": "http://localhost:3000/aZ3k9Qx"
/// }
/// ```
///
/// An authenticated caller becomes the owner of the link.
///
/// # Errors
///
/// - `400 INVALID_URL` / `400 MALFORMED_REQUEST`
/// - `401` for a present but invalid bearer token
/// - `500 MAX_CODE_GENERATION_ATTEMPTS` when no free code was found
/// - `503 OPERATION_TIMED_OUT`
pub async fn shorten_handler(
    State(state): State<AppState>,
    Extension(Viewer(viewer)): Extension<Viewer>,
    ApiJson(payload): ApiJson<ShortenRequest>,
) -> Result<(StatusCode, Json<ShortenResponse>), ApiError> {
    let owner_id = viewer.map(|user| user.user_id);

    let short_url = state
        .shortener
        .shorten(&payload.url, owner_id, Some(state.deadline()))
        .await?;

    let response = ShortenResponse {
        id: short_url.id().unwrap_or_default().to_string(),
        code: short_url.code().to_string(),
        url: short_url.url().to_string(),
        short_url: state.short_url(short_url.code()),
    };

    Ok((StatusCode::CREATED, Json(response)))
}
