pub mod guard;
mod metrics;
mod models;
mod store;
mod store_error;
pub mod validation;

// Publicly expose the Metrics abstraction
pub use metrics::{Metrics, MetricsPtr};

// Publicly expose the persistence abstractions
pub use models::{
    Message, MessageDetail, NewUser, ReceivedMessage, SentMessage, User, UserDetail, UserSummary,
};
pub use store::{MessageStore, MessageStorePtr, UserStore, UserStorePtr};
pub use store_error::{StoreError, StoreResult};
