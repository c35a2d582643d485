use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::schema::{MESSAGES_FROM_FK, MESSAGES_TO_FK};
use crate::domain::{
    Message, MessageDetail, MessageStore, ReceivedMessage, SentMessage, StoreError, StoreResult,
    UserSummary,
};

#[derive(sqlx::FromRow)]
struct MessageRow {
    id: i64,
    from_username: String,
    to_username: String,
    body: String,
    sent_at: DateTime<Utc>,
    read_at: Option<DateTime<Utc>>,
}

impl From<MessageRow> for Message {
    fn from(r: MessageRow) -> Self {
        // ---
        Message {
            id: r.id,
            from_username: r.from_username,
            to_username: r.to_username,
            body: r.body,
            sent_at: r.sent_at,
            read_at: r.read_at,
        }
    }
}

/// A message joined with both parties' profiles.
#[derive(sqlx::FromRow)]
struct DetailRow {
    id: i64,
    body: String,
    sent_at: DateTime<Utc>,
    read_at: Option<DateTime<Utc>>,
    from_username: String,
    from_first_name: String,
    from_last_name: String,
    from_phone: String,
    to_username: String,
    to_first_name: String,
    to_last_name: String,
    to_phone: String,
}

/// A message joined with the profile of the *other* party.
#[derive(sqlx::FromRow)]
struct CounterpartRow {
    id: i64,
    body: String,
    sent_at: DateTime<Utc>,
    read_at: Option<DateTime<Utc>>,
    username: String,
    first_name: String,
    last_name: String,
    phone: String,
}

impl CounterpartRow {
    fn counterpart(&self) -> UserSummary {
        // ---
        UserSummary {
            username: self.username.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            phone: self.phone.clone(),
        }
    }
}

const MESSAGE_COLUMNS: &str = "id, from_username, to_username, body, sent_at, read_at";

pub struct PostgresMessageStore {
    // ---
    pool: PgPool,
}

impl PostgresMessageStore {
    // ---
    pub fn new(pool: PgPool) -> Self {
        // ---
        Self { pool }
    }

    async fn list_with_counterpart(
        &self,
        filter_column: &str,
        join_column: &str,
        username: &str,
    ) -> StoreResult<Vec<CounterpartRow>> {
        // ---
        // Column names come from the two call sites below, never from input.
        let sql = format!(
            "SELECT m.id, m.body, m.sent_at, m.read_at,
                    u.username, u.first_name, u.last_name, u.phone
             FROM messages m
             JOIN users u ON u.username = m.{join_column}
             WHERE m.{filter_column} = $1
             ORDER BY m.sent_at, m.id"
        );

        let rows = sqlx::query_as::<_, CounterpartRow>(&sql)
            .bind(username)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }
}

#[async_trait::async_trait]
impl MessageStore for PostgresMessageStore {
    // ---
    async fn create(
        &self,
        from_username: &str,
        to_username: &str,
        body: &str,
    ) -> StoreResult<Message> {
        // ---
        let sql = format!(
            "INSERT INTO messages (from_username, to_username, body, sent_at)
             VALUES ($1, $2, $3, $4)
             RETURNING {MESSAGE_COLUMNS}"
        );

        let result = sqlx::query_as::<_, MessageRow>(&sql)
            .bind(from_username)
            .bind(to_username)
            .bind(body)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await;

        match result {
            Ok(row) => Ok(row.into()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_foreign_key_violation() => {
                let constraint = db_err.constraint().map(str::to_owned);
                match constraint.as_deref() {
                    Some(MESSAGES_FROM_FK) => Err(StoreError::UnknownSender(from_username.into())),
                    Some(MESSAGES_TO_FK) => Err(StoreError::UnknownRecipient(to_username.into())),
                    _ => Err(sqlx::Error::Database(db_err).into()),
                }
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn get_by_id(&self, id: i64) -> StoreResult<Option<MessageDetail>> {
        // ---
        let row = sqlx::query_as::<_, DetailRow>(
            "SELECT m.id, m.body, m.sent_at, m.read_at,
                    f.username   AS from_username,
                    f.first_name AS from_first_name,
                    f.last_name  AS from_last_name,
                    f.phone      AS from_phone,
                    t.username   AS to_username,
                    t.first_name AS to_first_name,
                    t.last_name  AS to_last_name,
                    t.phone      AS to_phone
             FROM messages m
             JOIN users f ON f.username = m.from_username
             JOIN users t ON t.username = m.to_username
             WHERE m.id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| MessageDetail {
            id: r.id,
            body: r.body,
            sent_at: r.sent_at,
            read_at: r.read_at,
            from_user: UserSummary {
                username: r.from_username,
                first_name: r.from_first_name,
                last_name: r.from_last_name,
                phone: r.from_phone,
            },
            to_user: UserSummary {
                username: r.to_username,
                first_name: r.to_first_name,
                last_name: r.to_last_name,
                phone: r.to_phone,
            },
        }))
    }

    async fn mark_read(&self, id: i64) -> StoreResult<Option<Message>> {
        // ---
        // Single-statement conditional update: the row lock serializes
        // concurrent callers and the first timestamp wins.
        let sql = format!(
            "UPDATE messages SET read_at = COALESCE(read_at, $2)
             WHERE id = $1
             RETURNING {MESSAGE_COLUMNS}"
        );

        let row = sqlx::query_as::<_, MessageRow>(&sql)
            .bind(id)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Message::from))
    }

    async fn list_by_sender(&self, username: &str) -> StoreResult<Vec<SentMessage>> {
        // ---
        let rows = self
            .list_with_counterpart("from_username", "to_username", username)
            .await?;

        Ok(rows
            .into_iter()
            .map(|r| SentMessage {
                id: r.id,
                to_user: r.counterpart(),
                body: r.body,
                sent_at: r.sent_at,
                read_at: r.read_at,
            })
            .collect())
    }

    async fn list_by_recipient(&self, username: &str) -> StoreResult<Vec<ReceivedMessage>> {
        // ---
        let rows = self
            .list_with_counterpart("to_username", "from_username", username)
            .await?;

        Ok(rows
            .into_iter()
            .map(|r| ReceivedMessage {
                id: r.id,
                from_user: r.counterpart(),
                body: r.body,
                sent_at: r.sent_at,
                read_at: r.read_at,
            })
            .collect())
    }
}
