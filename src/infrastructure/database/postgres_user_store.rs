use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{NewUser, StoreError, StoreResult, User, UserStore, UserSummary};

#[derive(sqlx::FromRow)]
struct UserRow {
    username: String,
    password_hash: String,
    first_name: String,
    last_name: String,
    phone: String,
    join_at: DateTime<Utc>,
    last_login_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(r: UserRow) -> Self {
        // ---
        User {
            username: r.username,
            password_hash: r.password_hash,
            first_name: r.first_name,
            last_name: r.last_name,
            phone: r.phone,
            join_at: r.join_at,
            last_login_at: r.last_login_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SummaryRow {
    username: String,
    first_name: String,
    last_name: String,
    phone: String,
}

pub struct PostgresUserStore {
    // ---
    pool: PgPool,
}

impl PostgresUserStore {
    // ---
    pub fn new(pool: PgPool) -> Self {
        // ---
        Self { pool }
    }
}

#[async_trait::async_trait]
impl UserStore for PostgresUserStore {
    // ---
    async fn create(&self, new_user: NewUser) -> StoreResult<User> {
        // ---
        let now = Utc::now();

        let result = sqlx::query_as::<_, UserRow>(
            "INSERT INTO users
                 (username, password_hash, first_name, last_name, phone, join_at, last_login_at)
             VALUES ($1, $2, $3, $4, $5, $6, $6)
             RETURNING username, password_hash, first_name, last_name, phone, join_at, last_login_at",
        )
        .bind(&new_user.username)
        .bind(&new_user.password_hash)
        .bind(&new_user.first_name)
        .bind(&new_user.last_name)
        .bind(&new_user.phone)
        .bind(now)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => Ok(row.into()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(StoreError::DuplicateUser(new_user.username))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        // ---
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT username, password_hash, first_name, last_name, phone, join_at, last_login_at
             FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    async fn update_last_login(&self, username: &str, at: DateTime<Utc>) -> StoreResult<()> {
        // ---
        let result = sqlx::query("UPDATE users SET last_login_at = $1 WHERE username = $2")
            .bind(at)
            .bind(username)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn list_all(&self) -> StoreResult<Vec<UserSummary>> {
        // ---
        let rows = sqlx::query_as::<_, SummaryRow>(
            "SELECT username, first_name, last_name, phone FROM users ORDER BY username",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| UserSummary {
                username: r.username,
                first_name: r.first_name,
                last_name: r.last_name,
                phone: r.phone,
            })
            .collect())
    }

    async fn ping(&self) -> StoreResult<()> {
        // ---
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
