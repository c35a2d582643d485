use crate::error::{AppError, AppResult};
use axum::extract::rejection::JsonRejection;
use axum::Json;
use serde::Serialize;

/// `{ "token": ... }` returned by login and registration.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// `{ "message": ... }` wrapper used by every message endpoint.
#[derive(Debug, Serialize)]
pub struct MessageEnvelope<T> {
    pub message: T,
}

/// `{ "messages": [...] }` wrapper for inbox and outbox listings.
#[derive(Debug, Serialize)]
pub struct MessagesEnvelope<T> {
    pub messages: Vec<T>,
}

/// Unwraps a JSON body, turning axum's rejection into a validation error.
pub fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    // ---
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::Validation(rejection.body_text()))
}

/// Parses a message id path segment; ids are positive integers.
pub fn parse_message_id(raw: &str) -> AppResult<i64> {
    // ---
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(AppError::Validation(format!("invalid message id '{raw}'"))),
    }
}
