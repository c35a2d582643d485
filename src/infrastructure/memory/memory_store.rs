use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use crate::domain::{
    Message, MessageDetail, MessageStore, NewUser, ReceivedMessage, SentMessage, StoreError,
    StoreResult, User, UserStore, UserSummary,
};

#[derive(Default)]
struct State {
    users: BTreeMap<String, User>,
    messages: BTreeMap<i64, Message>,
    next_id: i64,
}

impl State {
    fn summary(&self, username: &str) -> StoreResult<UserSummary> {
        // ---
        self.users
            .get(username)
            .map(User::summary)
            .ok_or_else(|| StoreError::Backend(anyhow::anyhow!("dangling user '{username}'")))
    }
}

/// In-memory implementation of [`UserStore`] and [`MessageStore`].
///
/// Every operation runs inside one critical section, which gives the same
/// atomicity the database provides per statement. The lock is never held
/// across an `.await`.
#[derive(Default)]
pub struct MemoryStore {
    // ---
    state: Mutex<State>,
}

impl MemoryStore {
    // ---
    pub fn new() -> Self {
        // ---
        Self::default()
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, State>> {
        // ---
        self.state
            .lock()
            .map_err(|_| StoreError::Backend(anyhow::anyhow!("memory store lock poisoned")))
    }
}

#[async_trait::async_trait]
impl UserStore for MemoryStore {
    // ---
    async fn create(&self, new_user: NewUser) -> StoreResult<User> {
        // ---
        let mut state = self.lock()?;
        if state.users.contains_key(&new_user.username) {
            return Err(StoreError::DuplicateUser(new_user.username));
        }

        let now = Utc::now();
        let user = User {
            username: new_user.username,
            password_hash: new_user.password_hash,
            first_name: new_user.first_name,
            last_name: new_user.last_name,
            phone: new_user.phone,
            join_at: now,
            last_login_at: now,
        };
        state.users.insert(user.username.clone(), user.clone());

        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        // ---
        Ok(self.lock()?.users.get(username).cloned())
    }

    async fn update_last_login(&self, username: &str, at: DateTime<Utc>) -> StoreResult<()> {
        // ---
        let mut state = self.lock()?;
        let user = state.users.get_mut(username).ok_or(StoreError::NotFound)?;
        user.last_login_at = at;
        Ok(())
    }

    async fn list_all(&self) -> StoreResult<Vec<UserSummary>> {
        // ---
        Ok(self.lock()?.users.values().map(User::summary).collect())
    }

    async fn ping(&self) -> StoreResult<()> {
        // ---
        self.lock().map(|_| ())
    }
}

#[async_trait::async_trait]
impl MessageStore for MemoryStore {
    // ---
    async fn create(
        &self,
        from_username: &str,
        to_username: &str,
        body: &str,
    ) -> StoreResult<Message> {
        // ---
        let mut state = self.lock()?;
        if !state.users.contains_key(from_username) {
            return Err(StoreError::UnknownSender(from_username.to_string()));
        }
        if !state.users.contains_key(to_username) {
            return Err(StoreError::UnknownRecipient(to_username.to_string()));
        }

        state.next_id += 1;
        let message = Message {
            id: state.next_id,
            from_username: from_username.to_string(),
            to_username: to_username.to_string(),
            body: body.to_string(),
            sent_at: Utc::now(),
            read_at: None,
        };
        state.messages.insert(message.id, message.clone());

        Ok(message)
    }

    async fn get_by_id(&self, id: i64) -> StoreResult<Option<MessageDetail>> {
        // ---
        let state = self.lock()?;
        let Some(m) = state.messages.get(&id) else {
            return Ok(None);
        };

        Ok(Some(MessageDetail {
            id: m.id,
            body: m.body.clone(),
            sent_at: m.sent_at,
            read_at: m.read_at,
            from_user: state.summary(&m.from_username)?,
            to_user: state.summary(&m.to_username)?,
        }))
    }

    async fn mark_read(&self, id: i64) -> StoreResult<Option<Message>> {
        // ---
        let mut state = self.lock()?;
        Ok(state.messages.get_mut(&id).map(|m| {
            m.read_at.get_or_insert_with(Utc::now);
            m.clone()
        }))
    }

    async fn list_by_sender(&self, username: &str) -> StoreResult<Vec<SentMessage>> {
        // ---
        let state = self.lock()?;
        state
            .messages
            .values()
            .filter(|m| m.from_username == username)
            .map(|m| -> StoreResult<SentMessage> {
                Ok(SentMessage {
                    id: m.id,
                    to_user: state.summary(&m.to_username)?,
                    body: m.body.clone(),
                    sent_at: m.sent_at,
                    read_at: m.read_at,
                })
            })
            .collect()
    }

    async fn list_by_recipient(&self, username: &str) -> StoreResult<Vec<ReceivedMessage>> {
        // ---
        let state = self.lock()?;
        state
            .messages
            .values()
            .filter(|m| m.to_username == username)
            .map(|m| -> StoreResult<ReceivedMessage> {
                Ok(ReceivedMessage {
                    id: m.id,
                    from_user: state.summary(&m.from_username)?,
                    body: m.body.clone(),
                    sent_at: m.sent_at,
                    read_at: m.read_at,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    fn new_user(username: &str) -> NewUser {
        // ---
        NewUser {
            username: username.to_string(),
            password_hash: "hash".to_string(),
            first_name: format!("{username}-first"),
            last_name: format!("{username}-last"),
            phone: "555-0100".to_string(),
        }
    }

    async fn store_with(usernames: &[&str]) -> MemoryStore {
        // ---
        let store = MemoryStore::new();
        for username in usernames {
            UserStore::create(&store, new_user(username)).await.unwrap();
        }
        store
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected_without_a_second_row() {
        // ---
        let store = store_with(&["bob"]).await;

        let err = UserStore::create(&store, new_user("bob")).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateUser(ref u) if u == "bob"));
        assert_eq!(store.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn join_and_last_login_start_equal() {
        // ---
        let store = MemoryStore::new();
        let user = UserStore::create(&store, new_user("bob")).await.unwrap();
        assert_eq!(user.join_at, user.last_login_at);
    }

    #[tokio::test]
    async fn update_last_login_touches_only_that_user() {
        // ---
        let store = store_with(&["bob", "carol"]).await;
        let carol_before = store.find_by_username("carol").await.unwrap().unwrap();

        let later = Utc::now() + chrono::Duration::seconds(60);
        store.update_last_login("bob", later).await.unwrap();

        let bob = store.find_by_username("bob").await.unwrap().unwrap();
        let carol = store.find_by_username("carol").await.unwrap().unwrap();
        assert_eq!(bob.last_login_at, later);
        assert_eq!(carol.last_login_at, carol_before.last_login_at);
        assert_ne!(bob.join_at, later);
    }

    #[tokio::test]
    async fn update_last_login_for_missing_user_is_not_found() {
        // ---
        let store = MemoryStore::new();
        let err = store.update_last_login("ghost", Utc::now()).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[tokio::test]
    async fn list_all_is_sorted_by_username() {
        // ---
        let store = store_with(&["carol", "alice", "bob"]).await;
        let names: Vec<String> = store
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.username)
            .collect();
        assert_eq!(names, vec!["alice", "bob", "carol"]);
    }

    #[tokio::test]
    async fn create_message_checks_both_parties() {
        // ---
        let store = store_with(&["bob"]).await;

        let err = MessageStore::create(&store, "ghost", "bob", "hi").await.unwrap_err();
        assert!(matches!(err, StoreError::UnknownSender(_)));

        let err = MessageStore::create(&store, "bob", "ghost", "hi").await.unwrap_err();
        assert!(matches!(err, StoreError::UnknownRecipient(_)));
    }

    #[tokio::test]
    async fn get_by_id_resolves_summaries() {
        // ---
        let store = store_with(&["bob", "carol"]).await;
        let sent = MessageStore::create(&store, "bob", "carol", "hi").await.unwrap();
        assert!(sent.read_at.is_none());

        let detail = store.get_by_id(sent.id).await.unwrap().unwrap();
        assert_eq!(detail.from_user.username, "bob");
        assert_eq!(detail.from_user.first_name, "bob-first");
        assert_eq!(detail.to_user.username, "carol");
        assert_eq!(detail.body, "hi");

        assert!(store.get_by_id(sent.id + 100).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn mark_read_is_idempotent() {
        // ---
        let store = store_with(&["bob", "carol"]).await;
        let sent = MessageStore::create(&store, "bob", "carol", "hi").await.unwrap();

        let first = store.mark_read(sent.id).await.unwrap().unwrap();
        let second = store.mark_read(sent.id).await.unwrap().unwrap();

        assert!(first.read_at.is_some());
        assert_eq!(first.read_at, second.read_at);
        assert!(store.mark_read(9999).await.unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_mark_read_stamps_once() {
        // ---
        let store = std::sync::Arc::new(store_with(&["bob", "carol"]).await);
        let sent = MessageStore::create(store.as_ref(), "bob", "carol", "hi")
            .await
            .unwrap();

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.mark_read(sent.id).await })
            })
            .collect();

        let results = futures::future::join_all(handles).await;
        let stamps: Vec<_> = results
            .into_iter()
            .map(|joined| joined.unwrap().unwrap().unwrap().read_at)
            .collect();

        assert!(stamps[0].is_some());
        assert!(stamps.iter().all(|stamp| *stamp == stamps[0]));
    }

    #[tokio::test]
    async fn outbox_and_inbox_show_the_other_party() {
        // ---
        let store = store_with(&["bob", "carol", "dave"]).await;
        MessageStore::create(&store, "bob", "carol", "one").await.unwrap();
        MessageStore::create(&store, "dave", "carol", "two").await.unwrap();
        MessageStore::create(&store, "bob", "dave", "three").await.unwrap();

        let sent = store.list_by_sender("bob").await.unwrap();
        let to: Vec<&str> = sent.iter().map(|m| m.to_user.username.as_str()).collect();
        assert_eq!(to, vec!["carol", "dave"]);

        let inbox = store.list_by_recipient("carol").await.unwrap();
        let from: Vec<&str> = inbox.iter().map(|m| m.from_user.username.as_str()).collect();
        assert_eq!(from, vec!["bob", "dave"]);
        assert_eq!(inbox[0].body, "one");

        assert!(store.list_by_sender("carol").await.unwrap().is_empty());
    }
}
