//! Session tokens for authenticated users.
//!
//! A session token is an HS256-signed JWT whose `sub` claim is the username.
//! Verification needs only the signing secret, so resolving the acting user
//! never touches the database.

use crate::config::AuthConfig;
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

// ---

/// Claims carried by every session token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    //
    /// Username the token was issued to.
    pub sub: String,
    /// Unique per token.
    pub jti: String,
    pub iat: i64,
    pub iss: String,
    /// Absent when tokens are configured not to expire.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

#[derive(Debug, Error)]
pub enum TokenError {
    //
    /// Tampered, expired, wrongly issued, or malformed token.
    #[error("invalid session token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),

    #[error("session token has an empty subject")]
    EmptySubject,

    #[error("failed to sign session token: {0}")]
    Signing(jsonwebtoken::errors::Error),
}

// ---

/// Issues and verifies session tokens.
pub struct SessionManager {
    //
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    ttl: Option<Duration>,
    validation: Validation,
}

impl SessionManager {
    //
    pub fn new(config: &AuthConfig) -> Self {
        // ---
        Self::from_secret(
            config.jwt_secret.as_bytes(),
            &config.jwt_issuer,
            config.token_ttl,
        )
    }

    pub fn from_secret(secret: &[u8], issuer: &str, ttl: Option<Duration>) -> Self {
        // ---
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[issuer]);
        match ttl {
            Some(_) => validation.set_required_spec_claims(&["exp", "iss", "sub"]),
            None => {
                validation.validate_exp = false;
                validation.set_required_spec_claims(&["iss", "sub"]);
            }
        }

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            issuer: issuer.to_string(),
            ttl,
            validation,
        }
    }

    /// Signs a fresh token for `username`.
    pub fn issue_token(&self, username: &str) -> Result<String, TokenError> {
        // ---
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: username.to_string(),
            jti: Uuid::new_v4().to_string(),
            iat: now,
            iss: self.issuer.clone(),
            exp: self.ttl.map(|ttl| now + ttl.as_secs() as i64),
        };

        let token =
            encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
                .map_err(TokenError::Signing)?;

        tracing::debug!("Issued session token for user: {}", username);

        Ok(token)
    }

    /// Checks the signature, issuer and expiry, then returns the username.
    pub fn verify_token(&self, token: &str) -> Result<String, TokenError> {
        // ---
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;

        if data.claims.sub.is_empty() {
            return Err(TokenError::EmptySubject);
        }
        Ok(data.claims.sub)
    }
}
