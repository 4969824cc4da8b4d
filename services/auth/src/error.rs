//! Error type for the authentication layer

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Custom error type for authentication and user management
#[derive(Error, Debug)]
pub enum AuthError {
    /// No session, or the session token is invalid or expired
    #[error("Not authenticated")]
    Unauthenticated,

    /// The session is valid but the account has been deactivated
    #[error("Account is inactive")]
    InactiveAccount,

    /// The caller is authenticated but not allowed to act on the resource
    #[error("Forbidden")]
    Forbidden,

    #[error("User not found")]
    UserNotFound,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("A user with this email already exists")]
    DuplicateEmail,

    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    #[error("Invalid password: {0}")]
    InvalidPassword(String),

    /// Reset or verification token that is malformed, expired or already used
    #[error("Invalid or expired token")]
    BadToken,

    #[error("User is already verified")]
    AlreadyVerified,

    #[error("Token signing error: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    #[error("Password hashing error: {0}")]
    Hashing(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl AuthError {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::Unauthenticated | AuthError::InactiveAccount => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::UserNotFound => StatusCode::NOT_FOUND,
            AuthError::InvalidCredentials
            | AuthError::DuplicateEmail
            | AuthError::InvalidEmail(_)
            | AuthError::InvalidPassword(_)
            | AuthError::BadToken
            | AuthError::AlreadyVerified => StatusCode::BAD_REQUEST,
            AuthError::Signing(_) | AuthError::Hashing(_) | AuthError::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("Authentication failure: {}", self);
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
