// src/infrastructure/memory/mod.rs
mod memory_store;

pub use memory_store::MemoryStore;
use crate::domain::{MessageStorePtr, UserStorePtr};
use std::sync::Arc;

/// Creates an in-process store serving both users and messages.
///
/// Nothing is persisted. Intended for tests and local experiments; both
/// handles share one underlying state so message references resolve.
pub fn create() -> (UserStorePtr, MessageStorePtr) {
    // ---
    let store = Arc::new(MemoryStore::new());
    let users: UserStorePtr = store.clone();
    let messages: MessageStorePtr = store;
    (users, messages)
}
