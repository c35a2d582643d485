use super::models::{
    Message, MessageDetail, NewUser, ReceivedMessage, SentMessage, User, UserSummary,
};
use super::store_error::StoreResult;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Persistence for user records.
#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    // ---
    /// Insert a new user. Fails with `DuplicateUser` if the username is taken.
    async fn create(&self, new_user: NewUser) -> StoreResult<User>;

    /// Look up a user by username.
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    /// Set `last_login_at` for exactly this user. Fails with `NotFound` if absent.
    async fn update_last_login(&self, username: &str, at: DateTime<Utc>) -> StoreResult<()>;

    /// Basic info on every user, ordered by username.
    async fn list_all(&self) -> StoreResult<Vec<UserSummary>>;

    /// Connectivity check for the backing store.
    async fn ping(&self) -> StoreResult<()>;
}

/// Persistence for messages.
#[async_trait::async_trait]
pub trait MessageStore: Send + Sync {
    // ---
    /// Persist a message with `sent_at = now` and `read_at = None`.
    ///
    /// Fails with `UnknownSender` / `UnknownRecipient` when either username
    /// does not resolve to a user.
    async fn create(&self, from_username: &str, to_username: &str, body: &str)
        -> StoreResult<Message>;

    /// Fetch a message with both parties resolved.
    async fn get_by_id(&self, id: i64) -> StoreResult<Option<MessageDetail>>;

    /// Atomically set `read_at` if it is still unset and return the message.
    ///
    /// Calling this on an already-read message returns it unchanged.
    async fn mark_read(&self, id: i64) -> StoreResult<Option<Message>>;

    /// Messages sent by `username`, oldest first.
    async fn list_by_sender(&self, username: &str) -> StoreResult<Vec<SentMessage>>;

    /// Messages received by `username`, oldest first.
    async fn list_by_recipient(&self, username: &str) -> StoreResult<Vec<ReceivedMessage>>;
}

/// Type alias for any backend that implements UserStore.
pub type UserStorePtr = Arc<dyn UserStore>;

/// Type alias for any backend that implements MessageStore.
pub type MessageStorePtr = Arc<dyn MessageStore>;
