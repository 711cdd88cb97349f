//! Error types for songrate-api
//!
//! [`ApiError`] is the single tagged application error. Its `IntoResponse`
//! implementation is the one place failures are logged and turned into a
//! `{ status, message }` body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use songrate_common::api::{AuthError, ErrorResponse};
use thiserror::Error;
use tracing::{error, warn};

/// Message returned for every token failure; callers learn nothing more
pub const ACCESS_DENIED: &str = "Access denied.";

/// Message for a valid token whose user no longer exists
pub const UNKNOWN_USER: &str = "Access denied!";

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed input (400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Missing/invalid token or bad credentials (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Missing entity (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Duplicate unique value (409)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) | ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the client. Server-side failures are not described.
    fn public_message(&self) -> String {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg) => msg.clone(),
            ApiError::Internal(_) | ApiError::Database(_) => "Internal server error".to_string(),
        }
    }
}

impl From<songrate_common::Error> for ApiError {
    fn from(err: songrate_common::Error) -> Self {
        use songrate_common::Error as Common;

        match err {
            Common::NotFound(msg) => ApiError::NotFound(msg),
            Common::InvalidInput(msg) => ApiError::BadRequest(msg),
            Common::Unauthorized(msg) => ApiError::Unauthorized(msg),
            Common::Database(e) => ApiError::Database(e),
            Common::Config(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Missing | AuthError::Invalid | AuthError::Expired => {
                ApiError::Unauthorized(ACCESS_DENIED.to_string())
            }
            AuthError::PasswordTooLong => {
                ApiError::BadRequest(AuthError::PasswordTooLong.to_string())
            }
            AuthError::Hashing(msg) => ApiError::Internal(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            error!(status = status.as_u16(), "{}", self);
        } else {
            warn!(status = status.as_u16(), "{}", self);
        }

        let body = ErrorResponse::new(status.as_u16(), self.public_message());
        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
