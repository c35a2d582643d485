//! Login and registration handlers.
//!
//! Both answer with `{ "token": ... }`. Failures are deliberately vague:
//! a bad login never says whether the username exists, and a failed
//! registration never says why.

use crate::app_state::AppState;
use crate::authenticator::{AuthError, Registration};
use crate::domain::validation::{validate_password, validate_required, validate_username};
use crate::error::{AppError, AppResult};
use crate::handlers::shared_types::{json_body, TokenResponse};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

// ============================================================================
// Request Types
// ============================================================================

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}

impl RegisterRequest {
    fn validate(&self) -> Result<(), String> {
        // ---
        validate_username(&self.username)?;
        validate_password(&self.password)?;
        validate_required("firstName", &self.first_name)?;
        validate_required("lastName", &self.last_name)?;
        validate_required("phone", &self.phone)?;
        Ok(())
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /login: `{username, password}` => `{token}`.
///
/// Updates the user's last-login timestamp on success.
///
/// # Errors
/// - `400` if the body is malformed
/// - `401 INVALID_CREDENTIALS` for an unknown user or a wrong password
#[tracing::instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<Json<TokenResponse>> {
    // ---
    let req = json_body(payload)?;
    if req.username.is_empty() || req.password.is_empty() {
        return Err(AppError::Validation("username and password are required".to_string()));
    }

    let token = state.authenticator().login(&req.username, &req.password).await?;
    state.metrics().record_login(token.is_some());

    match token {
        Some(token) => {
            tracing::info!("User logged in: {}", req.username);
            Ok(Json(TokenResponse { token }))
        }
        None => Err(AppError::InvalidCredentials),
    }
}

/// POST /register: `{username, password, firstName, lastName, phone}` => `{token}`.
///
/// Registers the user and logs them in.
///
/// # Errors
/// - `400 VALIDATION_ERROR` for a malformed or incomplete body
/// - `400 REGISTRATION_FAILED` for a taken username or any store failure
#[tracing::instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<TokenResponse>)> {
    // ---
    let req = json_body(payload)?;
    req.validate().map_err(AppError::Validation)?;

    let registration = Registration {
        username: req.username,
        password: req.password,
        first_name: req.first_name,
        last_name: req.last_name,
        phone: req.phone,
    };

    match state.authenticator().register(registration).await {
        Ok((_user, token)) => {
            state.metrics().record_user_registered();
            Ok((StatusCode::CREATED, Json(TokenResponse { token })))
        }
        Err(AuthError::Store(cause)) => {
            tracing::warn!("Registration rejected: {}", cause);
            Err(AppError::RegistrationFailed)
        }
        Err(other) => Err(other.into()),
    }
}
