//! DTOs for account and session endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::services::IssuedSession;
use crate::domain::entities::User;

/// Body of `register` and `login`.
#[derive(Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.unwrap_or_default(),
            email: user.email.as_str().to_string(),
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub session_id: String,
    pub token_type: &'static str,
    pub access_token: String,
    pub refresh_token: String,
    pub access_expires_at: DateTime<Utc>,
    pub refresh_expires_at: DateTime<Utc>,
}

impl From<IssuedSession> for TokenResponse {
    fn from(issued: IssuedSession) -> Self {
        Self {
            session_id: issued.session_id,
            token_type: "Bearer",
            access_token: issued.access_token,
            refresh_token: issued.refresh_token,
            access_expires_at: issued.access_expires_at,
            refresh_expires_at: issued.refresh_expires_at,
        }
    }
}
