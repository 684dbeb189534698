//! Classification of PostgreSQL errors.

/// Unique constraint on `short_urls.code`.
pub const SHORT_URL_CODE_CONSTRAINT: &str = "short_urls_code_key";

/// Unique constraint on `users.email`.
pub const USER_EMAIL_CONSTRAINT: &str = "users_email_key";

/// Returns true if `e` is a unique violation of the named constraint.
pub fn is_unique_violation_on(e: &sqlx::Error, constraint: &str) -> bool {
    let Some(db_err) = e.as_database_error() else {
        return false;
    };

    if !db_err.is_unique_violation() {
        return false;
    }

    db_err.constraint() == Some(constraint)
}
