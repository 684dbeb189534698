//! DTOs for the shortening endpoint.

use serde::{Deserialize, Serialize};

/// `POST /api/shorten` body.
///
/// The URL is validated by the domain layer, not here, so every rejection
/// carries the same `INVALID_URL` code.
#[derive(Debug, Deserialize)]
pub struct ShortenRequest {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct ShortenResponse {
    pub id: String,
    pub code: String,
    pub url: String,
    pub short_url: String,
}
