//! Message handlers.
//!
//! Every route here requires a bearer token. The acting username is checked
//! against the message's sender and recipient before anything is returned
//! or changed.

use crate::app_state::AppState;
use crate::domain::guard::{can_mark_read, can_view};
use crate::domain::validation::{validate_body, validate_username};
use crate::domain::MessageDetail;
use crate::error::{AppError, AppResult};
use crate::handlers::auth_user::AuthUser;
use crate::handlers::shared_types::{json_body, parse_message_id, MessageEnvelope};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub to_username: String,
    pub body: String,
}

/// Confirmation returned after sending.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SentReceipt {
    pub id: i64,
    pub from_username: String,
    pub to_username: String,
    pub body: String,
    pub sent_at: DateTime<Utc>,
}

/// Confirmation returned after marking read.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadReceipt {
    pub id: i64,
    pub read_at: Option<DateTime<Utc>>,
}

// ============================================================================
// Handlers
// ============================================================================

/// Loads a message or fails with `NotFound`.
async fn load_message(state: &AppState, id: i64) -> AppResult<MessageDetail> {
    // ---
    state
        .messages()
        .get_by_id(id)
        .await?
        .ok_or(AppError::NotFound)
}

/// GET /messages/{id}: full message with both parties resolved.
///
/// Only the sender or the recipient may view it; anyone else gets `401`.
#[tracing::instrument(skip(state, id))]
pub async fn get_message(
    State(state): State<AppState>,
    AuthUser(acting): AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<MessageEnvelope<MessageDetail>>> {
    // ---
    let id = parse_message_id(&id)?;
    let message = load_message(&state, id).await?;

    if !can_view(&acting, &message) {
        return Err(AppError::Unauthorized(
            "not authorized to view this message".to_string(),
        ));
    }

    Ok(Json(MessageEnvelope { message }))
}

/// POST /messages: `{toUsername, body}` sent from the acting user.
///
/// The body is stored trimmed.
#[tracing::instrument(skip(state, payload))]
pub async fn send_message(
    State(state): State<AppState>,
    AuthUser(acting): AuthUser,
    payload: Result<Json<SendMessageRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<MessageEnvelope<SentReceipt>>)> {
    // ---
    let req = json_body(payload)?;
    validate_username(&req.to_username).map_err(AppError::Validation)?;

    // Surrounding whitespace is dropped, so the stored body obeys the limit.
    let body = req.body.trim();
    validate_body(body).map_err(AppError::Validation)?;

    let message = state
        .messages()
        .create(&acting, &req.to_username, body)
        .await?;
    state.metrics().record_message_sent();
    tracing::info!("Message {} sent to {}", message.id, message.to_username);

    let receipt = SentReceipt {
        id: message.id,
        from_username: message.from_username,
        to_username: message.to_username,
        body: message.body,
        sent_at: message.sent_at,
    };

    Ok((StatusCode::CREATED, Json(MessageEnvelope { message: receipt })))
}

/// POST /messages/{id}/read: stamp the read time.
///
/// Only the recipient may do this. Repeating it returns the original
/// read time.
#[tracing::instrument(skip(state, id))]
pub async fn mark_read(
    State(state): State<AppState>,
    AuthUser(acting): AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<MessageEnvelope<ReadReceipt>>> {
    // ---
    let id = parse_message_id(&id)?;
    let message = load_message(&state, id).await?;

    if !can_mark_read(&acting, &message) {
        return Err(AppError::Unauthorized(
            "only the recipient may mark a message read".to_string(),
        ));
    }

    let updated = state
        .messages()
        .mark_read(id)
        .await?
        .ok_or(AppError::NotFound)?;
    state.metrics().record_message_read();

    Ok(Json(MessageEnvelope {
        message: ReadReceipt {
            id: updated.id,
            read_at: updated.read_at,
        },
    }))
}
