//! Password authentication and session issuance.
//!
//! Passwords are hashed with bcrypt on the blocking thread pool. Identity
//! after login is carried by signed session tokens (see [`crate::session`]).

use crate::domain::{NewUser, StoreError, User, UserStorePtr};
use crate::session::{SessionManager, TokenError};
use chrono::Utc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    // ---
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error(transparent)]
    Token(#[from] TokenError),
}

/// Everything needed to create an account. The password is plain text here.
#[derive(Debug, Clone)]
pub struct Registration {
    // ---
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}

pub struct Authenticator {
    // ---
    users: UserStorePtr,
    sessions: SessionManager,
    bcrypt_cost: u32,

    /// Verified against when the username is unknown, so both failure paths
    /// cost one bcrypt comparison.
    dummy_hash: String,
}

impl Authenticator {
    // ---
    pub fn new(
        users: UserStorePtr,
        sessions: SessionManager,
        bcrypt_cost: u32,
    ) -> anyhow::Result<Self> {
        // ---
        let dummy_hash = bcrypt::hash("messagely-dummy-password", bcrypt_cost)?;

        Ok(Self {
            users,
            sessions,
            bcrypt_cost,
            dummy_hash,
        })
    }

    /// Creates the account and returns it together with a fresh token.
    ///
    /// Store failures, including `DuplicateUser`, are returned as-is; the
    /// HTTP layer collapses them into one generic registration failure.
    #[tracing::instrument(skip(self, registration), fields(username = %registration.username))]
    pub async fn register(&self, registration: Registration) -> Result<(User, String), AuthError> {
        // ---
        let password_hash = hash_password(registration.password, self.bcrypt_cost).await?;

        let user = self
            .users
            .create(NewUser {
                username: registration.username,
                password_hash,
                first_name: registration.first_name,
                last_name: registration.last_name,
                phone: registration.phone,
            })
            .await?;

        let token = self.issue_token(&user.username)?;
        tracing::info!("Registered user: {}", user.username);

        Ok((user, token))
    }

    /// Returns whether `password` is correct for `username`.
    ///
    /// An unknown username yields `Ok(false)`, indistinguishable from a wrong
    /// password. Only store or hashing failures produce `Err`.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<bool, AuthError> {
        // ---
        let user = self.users.find_by_username(username).await?;

        let (hash, known) = match &user {
            Some(u) => (u.password_hash.clone(), true),
            None => (self.dummy_hash.clone(), false),
        };

        let matches = verify_password(password.to_string(), hash).await?;
        Ok(known && matches)
    }

    /// Authenticates, records the login time, and issues a token.
    ///
    /// Returns `Ok(None)` when the credentials are rejected.
    #[tracing::instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<Option<String>, AuthError> {
        // ---
        if !self.authenticate(username, password).await? {
            tracing::warn!("Rejected login for: {}", username);
            return Ok(None);
        }

        self.users.update_last_login(username, Utc::now()).await?;
        let token = self.issue_token(username)?;

        Ok(Some(token))
    }

    /// Signs a fresh token for `username`. Every call yields a distinct token.
    pub fn issue_token(&self, username: &str) -> Result<String, AuthError> {
        // ---
        Ok(self.sessions.issue_token(username)?)
    }

    /// Resolves a token to the username it was issued for.
    pub fn verify_token(&self, token: &str) -> Result<String, TokenError> {
        // ---
        self.sessions.verify_token(token)
    }
}

async fn hash_password(password: String, cost: u32) -> Result<String, AuthError> {
    // ---
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| AuthError::Hashing(e.to_string()))?
        .map_err(|e| AuthError::Hashing(e.to_string()))
}

async fn verify_password(password: String, hash: String) -> Result<bool, AuthError> {
    // ---
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| AuthError::Hashing(e.to_string()))?
        .map_err(|e| AuthError::Hashing(e.to_string()))
}
