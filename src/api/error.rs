//! HTTP error responses.
//!
//! [`status_for`] is the only place an [`ErrorKind`] becomes a status code.
//! Every failing handler returns an [`ApiError`], which renders as
//!
//! ```json
//! { "code": "INVALID_URL", "message": "Invalid Url: relative URL without a base" }
//! ```

use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::{debug, error};

use crate::error::{AppError, ErrorCategory, ErrorKind};

/// Message shown for every infrastructure failure.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Maps an error kind to its HTTP status.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidUrl
        | ErrorKind::InvalidEmail
        | ErrorKind::PasswordTooWeak
        | ErrorKind::InvalidShortCode
        | ErrorKind::InvalidRefreshSecret
        | ErrorKind::MalformedRequest => StatusCode::BAD_REQUEST,

        ErrorKind::InvalidSession
        | ErrorKind::InvalidCredentials
        | ErrorKind::MissingCredentials => StatusCode::UNAUTHORIZED,

        ErrorKind::ResourceNotFound => StatusCode::NOT_FOUND,
        ErrorKind::EmailAlreadyRegistered => StatusCode::CONFLICT,
        ErrorKind::OperationTimedOut => StatusCode::SERVICE_UNAVAILABLE,

        ErrorKind::MaxCodeGenerationAttempts
        | ErrorKind::UnsupportedHmacAlgorithm
        | ErrorKind::Storage
        | ErrorKind::Crypto => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    code: &'static str,
    message: &'a str,
}

/// A failed request, ready to be rendered.
///
/// The originating [`AppError`], if any, is kept as `cause` for logging and
/// is never serialized.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    kind: ErrorKind,
    message: String,
    cause: Option<AppError>,
}

impl ApiError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            status: status_for(kind),
            kind,
            message: message.into(),
            cause: None,
        }
    }

    /// The request body or query could not be decoded.
    pub fn malformed_request(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedRequest, message)
    }

    /// No usable `Authorization: Bearer` header.
    pub fn missing_credentials() -> Self {
        Self::new(
            ErrorKind::MissingCredentials,
            "Authorization header is missing or invalid",
        )
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn cause(&self) -> Option<&AppError> {
        self.cause.as_ref()
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        let kind = err.kind();
        let message = match err.category() {
            ErrorCategory::Infrastructure => INTERNAL_ERROR_MESSAGE.to_string(),
            _ => err.to_string(),
        };

        Self {
            status: status_for(kind),
            kind,
            message,
            cause: Some(err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.kind.code();

        if self.status.is_server_error() {
            match &self.cause {
                Some(cause) => error!(code, error = ?cause, "Request failed"),
                None => error!(code, message = %self.message, "Request failed"),
            }
        } else {
            debug!(code, status = self.status.as_u16(), "Request rejected");
        }

        let body = ErrorBody {
            code,
            message: &self.message,
        };
        let mut response = (self.status, Json(body)).into_response();

        if self.status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ApplicationError, DomainError, InfrastructureError};

    #[test]
    fn test_every_kind_has_a_status() {
        for kind in ErrorKind::ALL {
            let status = status_for(kind);
            assert!(
                status.is_client_error() || status.is_server_error(),
                "{kind:?} maps to {status}"
            );
        }
    }

    #[test]
    fn test_status_table() {
        assert_eq!(status_for(ErrorKind::InvalidUrl), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorKind::MalformedRequest), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorKind::InvalidSession), StatusCode::UNAUTHORIZED);
        assert_eq!(status_for(ErrorKind::ResourceNotFound), StatusCode::NOT_FOUND);
        assert_eq!(
            status_for(ErrorKind::EmailAlreadyRegistered),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_for(ErrorKind::OperationTimedOut),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_for(ErrorKind::MaxCodeGenerationAttempts),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_domain_errors_keep_their_message() {
        let api: ApiError = AppError::from(DomainError::invalid_url("empty input")).into();

        assert_eq!(api.status(), StatusCode::BAD_REQUEST);
        assert_eq!(api.message(), "Invalid Url: empty input");
        assert!(api.cause().is_some());
    }

    #[test]
    fn test_infrastructure_errors_are_masked() {
        let api: ApiError = AppError::from(InfrastructureError::storage(
            "relation \"short_urls\" does not exist",
        ))
        .into();

        assert_eq!(api.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.kind().code(), "STORAGE_FAILURE");
        assert_eq!(api.message(), INTERNAL_ERROR_MESSAGE);
    }

    #[test]
    fn test_unauthorized_response_has_challenge_header() {
        let response =
            ApiError::from(AppError::from(ApplicationError::InvalidSession)).into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[header::WWW_AUTHENTICATE], "Bearer");
    }
}
