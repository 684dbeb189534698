//! User entity.

use chrono::{DateTime, Utc};

use crate::domain::values::ValidEmail;

/// A registered account that can own short URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// `None` until persisted.
    pub id: Option<String>,
    pub email: ValidEmail,
    /// Argon2 PHC string; the plaintext password is never stored.
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: ValidEmail, password_hash: String) -> Self {
        Self {
            id: None,
            email,
            password_hash,
            created_at: Utc::now(),
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_is_transient() {
        let user = User::new(
            ValidEmail::parse("a@example.com").unwrap(),
            "$argon2id$...".to_string(),
        );

        assert!(!user.is_persisted());
        assert_eq!(user.email.as_str(), "a@example.com");
    }
}
