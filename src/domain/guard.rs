//! Authorization predicates over message participants.
//!
//! The acting identity is always the username string resolved from a
//! verified token. These checks are pure; callers turn a `false` into an
//! `Unauthorized` failure before touching the store.

use super::models::{Message, MessageDetail};

/// Anything that names a sender and a recipient.
pub trait Participants {
    fn sender(&self) -> &str;
    fn recipient(&self) -> &str;
}

impl Participants for Message {
    fn sender(&self) -> &str {
        &self.from_username
    }

    fn recipient(&self) -> &str {
        &self.to_username
    }
}

impl Participants for MessageDetail {
    fn sender(&self) -> &str {
        &self.from_user.username
    }

    fn recipient(&self) -> &str {
        &self.to_user.username
    }
}

/// True iff `acting` sent or received the message.
pub fn can_view<M: Participants + ?Sized>(acting: &str, message: &M) -> bool {
    // ---
    acting == message.sender() || acting == message.recipient()
}

/// True iff `acting` is the recipient. Senders cannot acknowledge receipt.
pub fn can_mark_read<M: Participants + ?Sized>(acting: &str, message: &M) -> bool {
    // ---
    acting == message.recipient()
}

/// True iff `acting` is asking about their own account.
pub fn is_same_user(acting: &str, username: &str) -> bool {
    // ---
    acting == username
}
