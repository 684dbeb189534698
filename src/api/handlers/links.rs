//! Handler for listing the caller's short URLs.

use axum::{Extension, Json, extract::State};
use validator::Validate;

use crate::api::dto::links::{LinkItem, LinksResponse};
use crate::api::dto::pagination::PaginationParams;
use crate::api::error::ApiError;
use crate::api::extract::ApiQuery;
use crate::application::services::AuthenticatedUser;
use crate::state::AppState;

/// Lists short URLs owned by the caller, newest first.
///
/// # Endpoint
///
/// `GET /api/links?page=1&page_size=20` (bearer token required)
pub async fn links_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiQuery(params): ApiQuery<PaginationParams>,
) -> Result<Json<LinksResponse>, ApiError> {
    params
        .validate()
        .map_err(|e| ApiError::malformed_request(e.to_string()))?;

    let page = params.page();
    let page_size = params.page_size();

    let owned = state
        .shortener
        .list_owned(&user.user_id, i64::from(page), i64::from(page_size))
        .await?;

    let items = owned
        .items
        .into_iter()
        .map(|short_url| LinkItem {
            id: short_url.id().unwrap_or_default().to_string(),
            short_url: state.short_url(short_url.code()),
            code: short_url.code().to_string(),
            url: short_url.url().to_string(),
            created_at: short_url.created_at(),
        })
        .collect();

    Ok(Json(LinksResponse {
        items,
        page,
        page_size,
        total: owned.total,
    }))
}
