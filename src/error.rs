//! Result and error vocabulary shared by every layer.
//!
//! Failures never cross a layer boundary as panics. Each layer owns an error
//! enum ([`DomainError`], [`ApplicationError`], [`InfrastructureError`]) and all of
//! them fold into the tagged union [`AppError`], which is what services and
//! repositories return through [`AppResult`].
//!
//! Every error exposes an [`ErrorCategory`] and a machine-readable [`ErrorKind`].
//! The presentation layer turns the kind into an HTTP status in exactly one place
//! (see [`crate::api::error::status_for`]).

use serde::Serialize;
use thiserror::Error;

/// Result type used across service and repository boundaries.
pub type AppResult<T> = Result<T, AppError>;

/// Layer an error originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Domain,
    Application,
    Infrastructure,
    Presentation,
}

/// Machine-readable error identity.
///
/// The serialized form (see [`ErrorKind::code`]) is part of the public API and
/// appears in every error response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    // domain
    InvalidUrl,
    InvalidEmail,
    PasswordTooWeak,
    InvalidShortCode,
    InvalidRefreshSecret,
    // application
    MaxCodeGenerationAttempts,
    ResourceNotFound,
    InvalidSession,
    InvalidCredentials,
    EmailAlreadyRegistered,
    OperationTimedOut,
    // infrastructure
    UnsupportedHmacAlgorithm,
    Storage,
    Crypto,
    // presentation
    MalformedRequest,
    MissingCredentials,
}

impl ErrorKind {
    /// Every declared kind, in declaration order.
    pub const ALL: [ErrorKind; 16] = [
        ErrorKind::InvalidUrl,
        ErrorKind::InvalidEmail,
        ErrorKind::PasswordTooWeak,
        ErrorKind::InvalidShortCode,
        ErrorKind::InvalidRefreshSecret,
        ErrorKind::MaxCodeGenerationAttempts,
        ErrorKind::ResourceNotFound,
        ErrorKind::InvalidSession,
        ErrorKind::InvalidCredentials,
        ErrorKind::EmailAlreadyRegistered,
        ErrorKind::OperationTimedOut,
        ErrorKind::UnsupportedHmacAlgorithm,
        ErrorKind::Storage,
        ErrorKind::Crypto,
        ErrorKind::MalformedRequest,
        ErrorKind::MissingCredentials,
    ];

    /// Stable SCREAMING_SNAKE_CASE code sent to clients.
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::InvalidUrl => "INVALID_URL",
            ErrorKind::InvalidEmail => "INVALID_EMAIL",
            ErrorKind::PasswordTooWeak => "PASSWORD_TOO_WEAK",
            ErrorKind::InvalidShortCode => "INVALID_SHORT_CODE",
            ErrorKind::InvalidRefreshSecret => "INVALID_REFRESH_SECRET",
            ErrorKind::MaxCodeGenerationAttempts => "MAX_CODE_GENERATION_ATTEMPTS",
            ErrorKind::ResourceNotFound => "RESOURCE_NOT_FOUND",
            ErrorKind::InvalidSession => "INVALID_SESSION",
            ErrorKind::InvalidCredentials => "INVALID_CREDENTIALS",
            ErrorKind::EmailAlreadyRegistered => "EMAIL_ALREADY_REGISTERED",
            ErrorKind::OperationTimedOut => "OPERATION_TIMED_OUT",
            ErrorKind::UnsupportedHmacAlgorithm => "UNSUPPORTED_HMAC_ALGORITHM",
            ErrorKind::Storage => "STORAGE_FAILURE",
            ErrorKind::Crypto => "CRYPTO_FAILURE",
            ErrorKind::MalformedRequest => "MALFORMED_REQUEST",
            ErrorKind::MissingCredentials => "MISSING_CREDENTIALS",
        }
    }

    pub fn category(self) -> ErrorCategory {
        match self {
            ErrorKind::InvalidUrl
            | ErrorKind::InvalidEmail
            | ErrorKind::PasswordTooWeak
            | ErrorKind::InvalidShortCode
            | ErrorKind::InvalidRefreshSecret => ErrorCategory::Domain,
            ErrorKind::MaxCodeGenerationAttempts
            | ErrorKind::ResourceNotFound
            | ErrorKind::InvalidSession
            | ErrorKind::InvalidCredentials
            | ErrorKind::EmailAlreadyRegistered
            | ErrorKind::OperationTimedOut => ErrorCategory::Application,
            ErrorKind::UnsupportedHmacAlgorithm | ErrorKind::Storage | ErrorKind::Crypto => {
                ErrorCategory::Infrastructure
            }
            ErrorKind::MalformedRequest | ErrorKind::MissingCredentials => {
                ErrorCategory::Presentation
            }
        }
    }
}

/// Invalid input caught while constructing a value object or entity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("Invalid Url: {reason}")]
    InvalidUrl { reason: String },

    #[error("Invalid email: {reason}")]
    InvalidEmail { reason: String },

    #[error("Password too weak: {reason}")]
    PasswordTooWeak { reason: String },

    #[error("Invalid short code: {reason}")]
    InvalidShortCode { reason: String },

    #[error("Invalid refresh secret")]
    InvalidRefreshSecret,
}

impl DomainError {
    pub fn invalid_url(reason: impl Into<String>) -> Self {
        Self::InvalidUrl {
            reason: reason.into(),
        }
    }

    pub fn invalid_email(reason: impl Into<String>) -> Self {
        Self::InvalidEmail {
            reason: reason.into(),
        }
    }

    pub fn password_too_weak(reason: impl Into<String>) -> Self {
        Self::PasswordTooWeak {
            reason: reason.into(),
        }
    }

    pub fn invalid_short_code(reason: impl Into<String>) -> Self {
        Self::InvalidShortCode {
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::InvalidUrl { .. } => ErrorKind::InvalidUrl,
            DomainError::InvalidEmail { .. } => ErrorKind::InvalidEmail,
            DomainError::PasswordTooWeak { .. } => ErrorKind::PasswordTooWeak,
            DomainError::InvalidShortCode { .. } => ErrorKind::InvalidShortCode,
            DomainError::InvalidRefreshSecret => ErrorKind::InvalidRefreshSecret,
        }
    }
}

/// Use-case failures raised by application services.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApplicationError {
    /// Every generated candidate collided. Operational exhaustion, not bad input.
    #[error("Could not allocate a unique short code after {attempts} attempts")]
    MaxCodeGenerationAttempts { attempts: u32 },

    #[error("{resource} '{id}' not found")]
    ResourceNotFound { resource: &'static str, id: String },

    #[error("Session is invalid or expired")]
    InvalidSession,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Email '{email}' is already registered")]
    EmailAlreadyRegistered { email: String },

    #[error("Operation '{operation}' timed out")]
    Timeout { operation: &'static str },
}

impl ApplicationError {
    pub fn not_found(resource: &'static str, id: impl Into<String>) -> Self {
        Self::ResourceNotFound {
            resource,
            id: id.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ApplicationError::MaxCodeGenerationAttempts { .. } => {
                ErrorKind::MaxCodeGenerationAttempts
            }
            ApplicationError::ResourceNotFound { .. } => ErrorKind::ResourceNotFound,
            ApplicationError::InvalidSession => ErrorKind::InvalidSession,
            ApplicationError::InvalidCredentials => ErrorKind::InvalidCredentials,
            ApplicationError::EmailAlreadyRegistered { .. } => ErrorKind::EmailAlreadyRegistered,
            ApplicationError::Timeout { .. } => ErrorKind::OperationTimedOut,
        }
    }
}

/// Failures of the backing store, cache, or crypto primitives.
#[derive(Debug, Error)]
pub enum InfrastructureError {
    #[error("Unsupported HMAC algorithm '{0}'")]
    UnsupportedHmacAlgorithm(String),

    #[error("Storage failure: {message}")]
    Storage {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Crypto failure: {0}")]
    Crypto(String),
}

impl InfrastructureError {
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
            source: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            InfrastructureError::UnsupportedHmacAlgorithm(_) => {
                ErrorKind::UnsupportedHmacAlgorithm
            }
            InfrastructureError::Storage { .. } => ErrorKind::Storage,
            InfrastructureError::Crypto(_) => ErrorKind::Crypto,
        }
    }
}

/// Any failure that can cross a service or repository boundary.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Application(#[from] ApplicationError),

    #[error(transparent)]
    Infrastructure(#[from] InfrastructureError),
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Domain(e) => e.kind(),
            AppError::Application(e) => e.kind(),
            AppError::Infrastructure(e) => e.kind(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        self.kind().category()
    }

    pub fn storage(message: impl Into<String>) -> Self {
        InfrastructureError::storage(message).into()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        InfrastructureError::Storage {
            message: "database error".to_string(),
            source: Some(Box::new(e)),
        }
        .into()
    }
}
