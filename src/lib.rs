// src/lib.rs
use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use handlers::{
    get_message, get_user, health_check, list_users, login, mark_read, messages_from,
    messages_to, metrics_handler, register, root_handler, send_message,
};

// Public exports (visible outside this module)
pub mod domain;

// Internal-only exports (sibling access within this module)
mod app_state;
mod authenticator;
mod config;
mod error;
mod handlers;
mod infrastructure;
mod request_tracking;
mod session;

// Hoist up only the public symbol(s)
pub use app_state::AppState;
pub use authenticator::{AuthError, Authenticator, Registration};
pub use error::{AppError, AppResult};
pub use session::{Claims, SessionManager, TokenError};

pub use config::*;

// Publicly expose the infrastructure creation functions
pub use infrastructure::{
    connect_with_retry, // ---
    create_metrics,
    create_memory_stores,
    create_noop_metrics,
    create_postgres_stores,
    create_prom_metrics,
};

/// Install the global tracing subscriber; honours `RUST_LOG`.
///
/// Ignores the error if a subscriber is already installed.
pub fn init_tracing() {
    // ---
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(filter).try_init().ok();
}

/// Build the HTTP router around already-constructed state.
///
/// This is the seam tests use to inject the in-memory stores.
pub fn build_router(app_state: AppState) -> Router {
    // ---
    let auth_routes = Router::new()
        .route("/login", post(login))
        .route("/register", post(register));

    let routes = Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .merge(auth_routes.clone())
        .nest("/auth", auth_routes)
        .nest(
            "/messages",
            Router::new()
                .route("/", post(send_message))
                .route("/{id}", get(get_message))
                .route("/{id}/read", post(mark_read)),
        )
        .nest(
            "/users",
            Router::new()
                .route("/", get(list_users))
                .route("/{username}", get(get_user))
                .route("/{username}/to", get(messages_to))
                .route("/{username}/from", get(messages_from)),
        );

    request_tracking::with_request_layers(routes, &app_state).with_state(app_state)
}

/// Build the HTTP router from configuration: connects to PostgreSQL,
/// prepares the schema and wires every dependency.
pub async fn create_app(config: &AppConfig) -> Result<Router> {
    // ---
    let metrics = create_metrics(config.server.metrics)?;

    let pool = connect_with_retry(&config.database).await?;
    let (users, messages) = create_postgres_stores(pool);

    let sessions = SessionManager::new(&config.auth);
    let authenticator = Authenticator::new(users.clone(), sessions, config.auth.bcrypt_cost)
        .context("Failed to initialise authenticator")?;

    let app_state = AppState::new(
        metrics,
        users,
        messages,
        Arc::new(authenticator),
        config.server.request_timeout,
    );

    Ok(build_router(app_state))
}
