//! Handler for short URL redirects.

use axum::{
    extract::{Path, State},
    response::Redirect,
};
use tracing::debug;

use crate::api::error::ApiError;
use crate::domain::entities::is_valid_code_format;
use crate::state::AppState;

/// Redirects a short code to its target.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// Cache hits are answered without touching the store. On a miss the target
/// is resolved from the store and written to the cache in the background.
///
/// # Errors
///
/// `404 RESOURCE_NOT_FOUND` if the code is unknown.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Redirect, ApiError> {
    if is_valid_code_format(&code)
        && let Some(target) = state.cache.get_target(&code).await
    {
        debug!(code = %code, "Redirect served from cache");
        return Ok(Redirect::temporary(&target));
    }

    let short_url = state.shortener.resolve(&code, Some(state.deadline())).await?;
    let target = short_url.url().to_string();

    let cache = state.cache.clone();
    let cached_target = target.clone();
    tokio::spawn(async move {
        cache.put_target(&code, &cached_target).await;
    });

    Ok(Redirect::temporary(&target))
}
