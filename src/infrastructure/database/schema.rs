//! Idempotent table bootstrap run at startup.

pub(crate) const MESSAGES_FROM_FK: &str = "messages_from_username_fkey";
pub(crate) const MESSAGES_TO_FK: &str = "messages_to_username_fkey";

/// Statements executed in order; each is safe to re-run.
pub(crate) const SCHEMA_STATEMENTS: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS users (
        username      TEXT PRIMARY KEY,
        password_hash TEXT NOT NULL,
        first_name    TEXT NOT NULL,
        last_name     TEXT NOT NULL,
        phone         TEXT NOT NULL,
        join_at       TIMESTAMPTZ NOT NULL,
        last_login_at TIMESTAMPTZ NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS messages (
        id            BIGSERIAL PRIMARY KEY,
        from_username TEXT NOT NULL
            CONSTRAINT messages_from_username_fkey REFERENCES users (username),
        to_username   TEXT NOT NULL
            CONSTRAINT messages_to_username_fkey REFERENCES users (username),
        body          TEXT NOT NULL,
        sent_at       TIMESTAMPTZ NOT NULL,
        read_at       TIMESTAMPTZ
    )"#,
    "CREATE INDEX IF NOT EXISTS messages_from_username_idx ON messages (from_username)",
    "CREATE INDEX IF NOT EXISTS messages_to_username_idx ON messages (to_username)",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn foreign_key_names_match_schema() {
        let messages = SCHEMA_STATEMENTS[1];
        assert!(messages.contains(MESSAGES_FROM_FK));
        assert!(messages.contains(MESSAGES_TO_FK));
    }

    #[test]
    fn every_statement_is_rerunnable() {
        for stmt in SCHEMA_STATEMENTS {
            assert!(stmt.contains("IF NOT EXISTS"), "not idempotent: {stmt}");
        }
    }
}
