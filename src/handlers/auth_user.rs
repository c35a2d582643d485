//! Bearer-token extractor resolving the acting user.

use crate::app_state::AppState;
use crate::error::AppError;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

/// The username proven by a valid bearer token.
///
/// Handlers that take this extractor are unreachable without
/// `Authorization: Bearer <token>`; any failure rejects with
/// `Unauthenticated` before the handler runs.
#[derive(Debug, Clone)]
pub struct AuthUser(pub String);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        // ---
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or_else(|| {
                // ---
                tracing::debug!("Missing Authorization header");
                AppError::Unauthenticated("missing Authorization header".to_string())
            })?
            .to_str()
            .map_err(|_| {
                // ---
                tracing::debug!("Invalid Authorization header encoding");
                AppError::Unauthenticated("invalid Authorization header".to_string())
            })?;

        let token = header.strip_prefix("Bearer ").ok_or_else(|| {
            // ---
            tracing::debug!("Authorization header missing Bearer prefix");
            AppError::Unauthenticated("invalid Authorization header format".to_string())
        })?;

        let username = state
            .authenticator()
            .verify_token(token.trim())
            .map_err(|e| AppError::Unauthenticated(e.to_string()))?;

        Ok(AuthUser(username))
    }
}
