// src/config.rs

//! Application configuration loaded from environment variables.
//!
//! This module defines all startup-time configuration for the service.
//! Configuration is validated eagerly and failures are treated as
//! deployment errors rather than recoverable runtime conditions.

use anyhow::Result;
use std::time::Duration;

// ============================================================
// Local macros (config-only, intentionally explicit)
// ============================================================

/// Reads a required environment variable.
///
/// # Behavior
/// - Fails fast if the variable is missing
/// - Produces a clear, human-readable error message
/// - Intended for startup-time configuration validation
macro_rules! required_env {
    // ---
    ($key:literal) => {
        std::env::var($key)
            .map_err(|_| anyhow::anyhow!(concat!("Missing required configuration: ", $key)))?
    };
}

/// Reads an optional environment variable and attempts to parse it.
///
/// If the variable is missing or cannot be parsed, the provided
/// default value is used. Appropriate for non-critical tuning parameters.
macro_rules! optional_env_parse {
    // ---
    ($key:literal, $ty:ty, $default:expr) => {
        std::env::var($key)
            .ok()
            .and_then(|v| v.parse::<$ty>().ok())
            .unwrap_or($default)
    };
}

#[cfg(test)]
/// Asserts that a configuration constructor fails due to a missing
/// required environment variable.
macro_rules! assert_missing_config {
    // ---
    ($expr:expr, $key:literal) => {{
        let err = $expr.expect_err("expected configuration error");
        assert!(
            err.to_string()
                .contains(concat!("Missing required configuration: ", $key)),
            "unexpected error: {err}"
        );
    }};
}

// ============================================================
// Public configuration facade
// ============================================================

/// Aggregated application configuration.
///
/// This is the single source of truth for startup configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: database::DatabaseConfig,
    pub auth: auth::AuthConfig,
    pub server: server::ServerConfig,
}

impl AppConfig {
    /// Loads and validates all application configuration from the environment.
    ///
    /// # Errors
    /// Returns an error if any required configuration is missing or invalid.
    pub fn from_env() -> Result<Self> {
        // ---
        Ok(Self {
            database: database::DatabaseConfig::from_env()?,
            auth: auth::AuthConfig::from_env()?,
            server: server::ServerConfig::from_env(),
        })
    }
}

// ============================================================
// Database configuration
// ============================================================

mod database {
    // ---
    use super::*;

    /// Database-related configuration derived from environment variables.
    #[derive(Debug, Clone)]
    pub struct DatabaseConfig {
        /// PostgreSQL connection string.
        pub database_url: String,

        /// Number of retry attempts when initializing the database connection. Defaults to 50.
        pub retry_count: u32,

        /// Maximum time to wait when acquiring a connection from the pool. Defaults to 30 seconds.
        pub acquire_timeout: Duration,

        /// Minimum number of connections to keep in the pool, even when idle. Defaults to 2.
        pub min_connections: u32,

        /// Maximum number of connections open concurrently. Defaults to 15.
        pub max_connections: u32,
    }

    impl DatabaseConfig {
        /// Builds a [`DatabaseConfig`] from environment variables.
        ///
        /// # Errors
        /// Returns an error if `DATABASE_URL` is missing.
        pub fn from_env() -> Result<Self> {
            // ---
            let database_url = required_env!("DATABASE_URL");
            let retry_count = optional_env_parse!("MESSAGELY_DB_RETRY_COUNT", u32, 50);
            let acquire_timeout_secs =
                optional_env_parse!("MESSAGELY_DB_ACQUIRE_TIMEOUT_SEC", u64, 30);
            let min_connections = optional_env_parse!("MESSAGELY_DB_MIN_CONNECTIONS", u32, 2);
            let max_connections = optional_env_parse!("MESSAGELY_DB_MAX_CONNECTIONS", u32, 15);

            Ok(Self {
                database_url,
                retry_count,
                acquire_timeout: Duration::from_secs(acquire_timeout_secs),
                min_connections,
                max_connections,
            })
        }
    }
}
pub use database::DatabaseConfig;

// ============================================================
// Authentication configuration
// ============================================================

mod auth {
    // ---
    use super::*;

    /// Lowest and highest work factors bcrypt accepts.
    pub const MIN_BCRYPT_COST: u32 = 4;
    pub const MAX_BCRYPT_COST: u32 = 31;

    /// Token signing and password hashing parameters.
    #[derive(Clone)]
    pub struct AuthConfig {
        /// HS256 signing secret.
        pub jwt_secret: String,

        /// Value of the `iss` claim. Defaults to "messagely".
        pub jwt_issuer: String,

        /// Token lifetime. `None` means tokens never expire. Defaults to 24 hours.
        pub token_ttl: Option<Duration>,

        /// bcrypt work factor. Defaults to 12.
        pub bcrypt_cost: u32,
    }

    // Keep the secret out of logs.
    impl std::fmt::Debug for AuthConfig {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            // ---
            f.debug_struct("AuthConfig")
                .field("jwt_secret", &"<redacted>")
                .field("jwt_issuer", &self.jwt_issuer)
                .field("token_ttl", &self.token_ttl)
                .field("bcrypt_cost", &self.bcrypt_cost)
                .finish()
        }
    }

    impl AuthConfig {
        /// Builds an [`AuthConfig`] from environment variables.
        ///
        /// # Errors
        /// Returns an error if `MESSAGELY_JWT_SECRET` is missing or empty.
        pub fn from_env() -> Result<Self> {
            // ---
            let jwt_secret = required_env!("MESSAGELY_JWT_SECRET");
            if jwt_secret.trim().is_empty() {
                anyhow::bail!("MESSAGELY_JWT_SECRET must not be empty");
            }

            let jwt_issuer =
                std::env::var("MESSAGELY_JWT_ISSUER").unwrap_or_else(|_| "messagely".to_string());

            let ttl_secs = optional_env_parse!("MESSAGELY_TOKEN_TTL_SEC", u64, 86_400);
            let token_ttl = (ttl_secs > 0).then(|| Duration::from_secs(ttl_secs));

            let bcrypt_cost = optional_env_parse!("MESSAGELY_BCRYPT_COST", u32, 12)
                .clamp(MIN_BCRYPT_COST, MAX_BCRYPT_COST);

            Ok(Self {
                jwt_secret,
                jwt_issuer,
                token_ttl,
                bcrypt_cost,
            })
        }
    }
}
pub use auth::AuthConfig;

// ============================================================
// Server configuration
// ============================================================

mod server {
    // ---
    use super::*;

    /// Which metrics backend to install.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum MetricsKind {
        Noop,
        Prometheus,
    }

    /// HTTP listener and request-handling settings. Every field has a default.
    #[derive(Debug, Clone)]
    pub struct ServerConfig {
        /// Listen address. Defaults to 127.0.0.1:8080.
        pub bind_addr: String,

        /// Upper bound on handling time for a single request. Defaults to 10 seconds.
        pub request_timeout: Duration,

        /// Metrics backend; "prom" selects Prometheus, anything else is no-op.
        pub metrics: MetricsKind,
    }

    impl ServerConfig {
        pub fn from_env() -> Self {
            // ---
            let bind_addr = std::env::var("MESSAGELY_BIND_ADDR")
                .unwrap_or_else(|_| "127.0.0.1:8080".to_string());
            let timeout_secs = optional_env_parse!("MESSAGELY_REQUEST_TIMEOUT_SEC", u64, 10);
            let metrics = match std::env::var("MESSAGELY_METRICS_TYPE").as_deref() {
                Ok("prom") => MetricsKind::Prometheus,
                _ => MetricsKind::Noop,
            };

            Self {
                bind_addr,
                request_timeout: Duration::from_secs(timeout_secs.max(1)),
                metrics,
            }
        }
    }
}
pub use server::{MetricsKind, ServerConfig};

// ============================================================
// Tests
// ============================================================
