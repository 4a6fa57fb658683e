//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//!
//! Status mapping: validation, conflict, and token failures are 400;
//! missing/invalid credentials are 401; valid-but-insufficient state is 403;
//! absent entities are 404; everything unanticipated collapses to an opaque 500.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::orders::OrderError;
use crate::services::tokens::TokenError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication workflow failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Order workflow failed.
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    /// Malformed or missing input.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Uniqueness violation.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Token failed signature, expiry, or comparison checks.
    #[error("Invalid or expired token")]
    InvalidToken,

    /// Missing or invalid credential.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Valid credential, insufficient state or rights.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Referenced entity absent.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Invalid => Self::InvalidToken,
            TokenError::Encoding(e) => Self::Internal(format!("token encoding: {e}")),
        }
    }
}

/// JSON error payload returned to clients.
#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
}

impl AppError {
    fn is_server_error(&self) -> bool {
        match self {
            Self::Database(err)
            | Self::Auth(AuthError::Repository(err))
            | Self::Order(OrderError::Repository(err)) => matches!(
                err,
                RepositoryError::Database(_) | RepositoryError::DataCorruption(_)
            ),
            Self::Internal(_)
            | Self::Auth(AuthError::PasswordHash | AuthError::Token(TokenError::Encoding(_))) => {
                true
            }
            _ => false,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Database(err) => repository_status(err),
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Auth(err) => match err {
                AuthError::InvalidEmail(_)
                | AuthError::MissingFields
                | AuthError::MissingPassword
                | AuthError::AlreadyRegistered
                | AuthError::AlreadyInWishlist
                | AuthError::AddressBookFull
                | AuthError::InvalidToken => StatusCode::BAD_REQUEST,
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::EmailNotVerified => StatusCode::FORBIDDEN,
                AuthError::UserNotFound | AuthError::AddressNotFound => StatusCode::NOT_FOUND,
                AuthError::Token(err) => match err {
                    TokenError::Invalid => StatusCode::BAD_REQUEST,
                    TokenError::Encoding(_) => StatusCode::INTERNAL_SERVER_ERROR,
                },
                AuthError::Repository(err) => repository_status(err),
                AuthError::PasswordHash => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Order(err) => match err {
                OrderError::InvalidDeliveryMethod
                | OrderError::MissingAddress
                | OrderError::InvalidQuantity => StatusCode::BAD_REQUEST,
                OrderError::ProductNotFound(_) | OrderError::OrderNotFound => {
                    StatusCode::NOT_FOUND
                }
                OrderError::Repository(err) => repository_status(err),
            },
            Self::Validation(_) | Self::Conflict(_) | Self::InvalidToken => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
        };

        // Don't expose internal error details to clients
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            "Internal server error".to_string()
        } else {
            match &self {
                Self::Auth(err) => err.to_string(),
                Self::Order(err) => err.to_string(),
                Self::Database(RepositoryError::Conflict(msg)) => msg.clone(),
                Self::Database(RepositoryError::NotFound) => "not found".to_string(),
                Self::Validation(msg) | Self::Conflict(msg) => msg.clone(),
                Self::InvalidToken => "Invalid or expired token".to_string(),
                Self::Unauthorized(msg) | Self::Forbidden(msg) => msg.clone(),
                Self::NotFound(what) => format!("{what} not found"),
                _ => self.to_string(),
            }
        };

        (status, Json(ErrorBody { message })).into_response()
    }
}

const fn repository_status(err: &RepositoryError) -> StatusCode {
    match err {
        RepositoryError::Conflict(_) => StatusCode::BAD_REQUEST,
        RepositoryError::NotFound => StatusCode::NOT_FOUND,
        RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product".to_string());
        assert_eq!(err.to_string(), "Not found: product");

        let err = AppError::Validation("all fields are required".to_string());
        assert_eq!(err.to_string(), "Validation error: all fields are required");
    }

    #[test]
    fn test_taxonomy_status_codes() {
        assert_eq!(
            get_status(AppError::Validation("bad".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Conflict("dup".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(get_status(AppError::InvalidToken), StatusCode::BAD_REQUEST);
        assert_eq!(
            get_status(AppError::Unauthorized("no token".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Forbidden("unverified".to_string())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::NotFound("order".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Internal("boom".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_auth_error_status_codes() {
        assert_eq!(
            get_status(AppError::Auth(AuthError::InvalidCredentials)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::EmailNotVerified)),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::AlreadyRegistered)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::UserNotFound)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::InvalidToken)),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_server_errors_are_opaque() {
        let response = AppError::Internal("connection pool exhausted".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        // Body must not leak the internal detail; checked via the composed message
        let err = AppError::Internal("connection pool exhausted".to_string());
        assert!(err.is_server_error());
    }
}
