//! Handler for the health check endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::state::AppState;

/// Reports store and cache health.
///
/// # Endpoint
///
/// `GET /health`
///
/// - **200 OK**: every component healthy
/// - **503 Service Unavailable**: at least one component degraded
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "checks": {
///     "store": { "status": "ok", "message": "Store reachable" },
///     "cache": { "status": "ok", "message": "redis reachable" }
///   }
/// }
/// ```
pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let store = if state.unit_of_work.health_check().await {
        CheckStatus::ok("Store reachable")
    } else {
        CheckStatus::error("Store unreachable")
    };

    let backend = state.cache.backend();
    let cache = if state.cache.health_check().await {
        CheckStatus::ok(format!("{backend} reachable"))
    } else {
        CheckStatus::error(format!("{backend} unreachable"))
    };

    let healthy = store.is_ok() && cache.is_ok();
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = HealthResponse {
        status: if healthy { "healthy" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        checks: HealthChecks { store, cache },
    };

    (status, Json(response))
}
