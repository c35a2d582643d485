//! PostgreSQL-backed stores.

mod postgres_message_store;
mod postgres_user_store;
mod schema;

use crate::config::DatabaseConfig;
use crate::domain::{MessageStorePtr, StoreError, UserStorePtr};
use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

pub use postgres_message_store::PostgresMessageStore;
pub use postgres_user_store::PostgresUserStore;

/// Delay between connection attempts.
const RETRY_DELAY: Duration = Duration::from_secs(1);

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        // ---
        StoreError::Backend(err.into())
    }
}

/// Connects to PostgreSQL, retrying while the server comes up, then makes
/// sure the tables exist.
///
/// # Errors
/// Returns the last connection error once `retry_count` attempts are used up,
/// or any failure while creating the schema.
pub async fn connect_with_retry(config: &DatabaseConfig) -> Result<PgPool> {
    // ---
    let attempts = config.retry_count.max(1);
    let mut last_err = None;

    for attempt in 1..=attempts {
        let result = PgPoolOptions::new()
            .min_connections(config.min_connections)
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect(&config.database_url)
            .await;

        match result {
            Ok(pool) => {
                tracing::info!(attempt, "Connected to PostgreSQL");
                ensure_schema(&pool).await?;
                return Ok(pool);
            }
            Err(err) => {
                tracing::warn!(attempt, attempts, "PostgreSQL not ready: {err}");
                last_err = Some(err);
                if attempt < attempts {
                    tokio::time::sleep(RETRY_DELAY).await;
                }
            }
        }
    }

    Err(last_err
        .map(anyhow::Error::from)
        .unwrap_or_else(|| anyhow::anyhow!("no connection attempts made")))
    .context("Failed to connect to PostgreSQL")
}

/// Creates the tables and indexes if they are missing.
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    // ---
    for stmt in schema::SCHEMA_STATEMENTS {
        sqlx::query(stmt)
            .execute(pool)
            .await
            .with_context(|| format!("Failed to apply schema statement: {stmt}"))?;
    }
    tracing::debug!("Schema is in place");
    Ok(())
}

/// Builds both stores over one shared pool.
pub fn create_postgres_stores(pool: PgPool) -> (UserStorePtr, MessageStorePtr) {
    // ---
    let users: UserStorePtr = Arc::new(PostgresUserStore::new(pool.clone()));
    let messages: MessageStorePtr = Arc::new(PostgresMessageStore::new(pool));
    (users, messages)
}
