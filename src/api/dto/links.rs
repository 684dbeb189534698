//! DTOs for listing a user's short URLs.

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct LinkItem {
    pub id: String,
    pub code: String,
    pub url: String,
    pub short_url: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct LinksResponse {
    pub items: Vec<LinkItem>,
    pub page: u32,
    pub page_size: u32,
    pub total: i64,
}
