//! Application state management.
//!
//! This module defines the shared state handed to every Axum handler via the
//! `State` extractor. It holds the injected stores, the authenticator and
//! the metrics backend. Everything heavy sits behind an `Arc`, so cloning the
//! state per request is cheap.

use crate::authenticator::Authenticator;
use crate::domain::{MessageStorePtr, MetricsPtr, UserStorePtr};
use std::sync::Arc;
use std::time::Duration;

/// Shared application state passed to all Axum handlers.
///
/// This struct is the dependency injection container. Stores come in as
/// trait objects, so tests can swap PostgreSQL for the in-memory store.
///
/// # Lifecycle
///
/// 1. Built once at startup (or by a test) via [`AppState::new`]
/// 2. Attached to the router via `.with_state(app_state)`
/// 3. Cloned by Axum for each incoming request
#[derive(Clone)]
pub struct AppState {
    /// Metrics implementation, Prometheus-backed or no-op.
    metrics: MetricsPtr,

    /// Credential store.
    users: UserStorePtr,

    /// Message store.
    messages: MessageStorePtr,

    /// Password verification and session tokens.
    authenticator: Arc<Authenticator>,

    /// Upper bound on the time spent handling a single request.
    request_timeout: Duration,
}

impl AppState {
    // ---

    pub fn new(
        metrics: MetricsPtr,
        users: UserStorePtr,
        messages: MessageStorePtr,
        authenticator: Arc<Authenticator>,
        request_timeout: Duration,
    ) -> Self {
        // ---
        AppState {
            metrics,
            users,
            messages,
            authenticator,
            request_timeout,
        }
    }

    /// Get a reference to the metrics implementation.
    pub(crate) fn metrics(&self) -> &MetricsPtr {
        // ---
        &self.metrics
    }

    /// Get a reference to the credential store.
    pub(crate) fn users(&self) -> &UserStorePtr {
        // ---
        &self.users
    }

    /// Get a reference to the message store.
    pub(crate) fn messages(&self) -> &MessageStorePtr {
        // ---
        &self.messages
    }

    /// Get a reference to the authenticator.
    pub(crate) fn authenticator(&self) -> &Authenticator {
        // ---
        &self.authenticator
    }

    /// Get the per-request timeout.
    pub(crate) fn request_timeout(&self) -> Duration {
        // ---
        self.request_timeout
    }
}
