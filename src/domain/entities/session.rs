//! Login session entity.

use chrono::{DateTime, Utc};

use crate::domain::values::Digest;

/// An authenticated session issued at login.
///
/// Holds digests of the access and refresh secrets, never the secrets
/// themselves. Refreshing rotates both digests in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: Option<String>,
    pub user_id: String,
    pub access_digest: Digest,
    pub refresh_digest: Digest,
    pub access_expires_at: DateTime<Utc>,
    pub refresh_expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Replacement secrets written when a session is refreshed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRotation {
    pub access_digest: Digest,
    pub refresh_digest: Digest,
    pub access_expires_at: DateTime<Utc>,
    pub refresh_expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    pub fn is_access_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.access_expires_at
    }

    pub fn is_refresh_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.refresh_expires_at
    }

    /// Applies a rotation, keeping identity and ownership.
    pub fn rotated(mut self, rotation: SessionRotation) -> Self {
        self.access_digest = rotation.access_digest;
        self.refresh_digest = rotation.refresh_digest;
        self.access_expires_at = rotation.access_expires_at;
        self.refresh_expires_at = rotation.refresh_expires_at;
        self
    }
}
