//! Request-boundary error type.
//!
//! Component failures propagate up to the handler, get mapped to an
//! [`AppError`], and are rendered as a JSON body with a matching status.

use crate::authenticator::AuthError;
use crate::domain::StoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    // ---
    #[error("validation error: {0}")]
    Validation(String),

    #[error("not found")]
    NotFound,

    /// Store-level username conflict. Registration reports it as
    /// `RegistrationFailed` instead, so no current route answers 409.
    #[error("user '{0}' already exists")]
    DuplicateUser(String),

    /// Registration failed for any reason; the cause is deliberately hidden.
    #[error("registration failed")]
    RegistrationFailed,

    /// Wrong password or unknown username; the two are not distinguished.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// Missing, malformed, tampered or expired bearer token.
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    /// Authenticated, but not allowed to touch this resource.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("store error: {0}")]
    Store(#[source] StoreError),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("request timed out")]
    Timeout,
}

impl AppError {
    // ---
    pub fn status_code(&self) -> StatusCode {
        // ---
        match self {
            AppError::Validation(_) | AppError::RegistrationFailed => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::DuplicateUser(_) => StatusCode::CONFLICT,
            AppError::InvalidCredentials
            | AppError::Unauthenticated(_)
            | AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Timeout => StatusCode::REQUEST_TIMEOUT,
            AppError::Store(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable code for programmatic error handling.
    pub fn error_code(&self) -> &'static str {
        // ---
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::NotFound => "NOT_FOUND",
            AppError::DuplicateUser(_) => "DUPLICATE_USER",
            AppError::RegistrationFailed => "REGISTRATION_FAILED",
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::Unauthenticated(_) => "UNAUTHENTICATED",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::Store(_) => "STORE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
            AppError::Timeout => "TIMEOUT",
        }
    }

    /// Message safe to show to clients.
    pub fn user_message(&self) -> String {
        // ---
        match self {
            AppError::Store(_) | AppError::Internal(_) => "Internal server error".to_string(),
            AppError::Unauthenticated(_) => "Authentication required".to_string(),
            other => other.to_string(),
        }
    }

    /// Log at a level matching the severity.
    pub fn log(&self) {
        // ---
        let status = self.status_code();
        let code = self.error_code();

        if status.is_server_error() {
            tracing::error!(error = %self, error_code = %code, status = %status.as_u16(), "Server error occurred");
        } else if status == StatusCode::UNAUTHORIZED {
            tracing::warn!(error = %self, error_code = %code, "Request rejected");
        } else {
            tracing::debug!(error = %self, error_code = %code, "Client error occurred");
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        // ---
        match err {
            StoreError::NotFound => AppError::NotFound,
            StoreError::DuplicateUser(username) => AppError::DuplicateUser(username),
            StoreError::UnknownSender(username) => {
                AppError::Unauthenticated(format!("sender '{username}' no longer exists"))
            }
            StoreError::UnknownRecipient(username) => {
                AppError::Validation(format!("unknown recipient '{username}'"))
            }
            other => AppError::Store(other),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        // ---
        match err {
            AuthError::Store(store) => store.into(),
            AuthError::Hashing(msg) => AppError::Internal(msg),
            AuthError::Token(token) => AppError::Internal(token.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // ---
        self.log();

        let status = self.status_code();
        let body = json!({
            "error": self.user_message(),
            "errorCode": self.error_code(),
            "status": status.as_u16(),
        });

        (status, Json(body)).into_response()
    }
}
