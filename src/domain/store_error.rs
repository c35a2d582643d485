use thiserror::Error;

/// Failures reported by the user and message stores.
#[derive(Debug, Error)]
pub enum StoreError {
    // ---
    #[error("user '{0}' already exists")]
    DuplicateUser(String),

    #[error("record not found")]
    NotFound,

    #[error("unknown sender '{0}'")]
    UnknownSender(String),

    #[error("unknown recipient '{0}'")]
    UnknownRecipient(String),

    /// Underlying persistence failure. Not retried at this layer.
    #[error("store backend failure: {0:#}")]
    Backend(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;
