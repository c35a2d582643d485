//! User directory and per-user mailbox handlers.
//!
//! Listing users only needs a valid token. Reading a user's profile or
//! mailbox is limited to that user.

use crate::app_state::AppState;
use crate::domain::guard::is_same_user;
use crate::domain::{ReceivedMessage, SentMessage, UserDetail, UserSummary};
use crate::error::{AppError, AppResult};
use crate::handlers::auth_user::AuthUser;
use crate::handlers::shared_types::MessagesEnvelope;
use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct UsersResponse {
    pub users: Vec<UserSummary>,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: UserDetail,
}

fn ensure_correct_user(acting: &str, username: &str) -> AppResult<()> {
    // ---
    if is_same_user(acting, username) {
        Ok(())
    } else {
        Err(AppError::Unauthorized(format!(
            "'{acting}' may not access data belonging to '{username}'"
        )))
    }
}

/// GET /users: basic info on every user.
pub async fn list_users(
    State(state): State<AppState>,
    AuthUser(_acting): AuthUser,
) -> AppResult<Json<UsersResponse>> {
    // ---
    let users = state.users().list_all().await?;
    Ok(Json(UsersResponse { users }))
}

/// GET /users/{username}: the acting user's own profile.
#[tracing::instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    AuthUser(acting): AuthUser,
    Path(username): Path<String>,
) -> AppResult<Json<UserResponse>> {
    // ---
    ensure_correct_user(&acting, &username)?;

    let user = state
        .users()
        .find_by_username(&username)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(UserResponse { user: user.detail() }))
}

/// GET /users/{username}/to: messages received by the acting user.
#[tracing::instrument(skip(state))]
pub async fn messages_to(
    State(state): State<AppState>,
    AuthUser(acting): AuthUser,
    Path(username): Path<String>,
) -> AppResult<Json<MessagesEnvelope<ReceivedMessage>>> {
    // ---
    ensure_correct_user(&acting, &username)?;

    let messages = state.messages().list_by_recipient(&username).await?;
    Ok(Json(MessagesEnvelope { messages }))
}

/// GET /users/{username}/from: messages sent by the acting user.
#[tracing::instrument(skip(state))]
pub async fn messages_from(
    State(state): State<AppState>,
    AuthUser(acting): AuthUser,
    Path(username): Path<String>,
) -> AppResult<Json<MessagesEnvelope<SentMessage>>> {
    // ---
    ensure_correct_user(&acting, &username)?;

    let messages = state.messages().list_by_sender(&username).await?;
    Ok(Json(MessagesEnvelope { messages }))
}
