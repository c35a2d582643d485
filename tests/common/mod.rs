// Test helpers are intentionally partially used
#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use messagely::domain::MetricsPtr;
use messagely::{
    build_router, create_memory_stores, create_noop_metrics, AppState, Authenticator,
    SessionManager,
};
use reqwest::Client;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::time::sleep;
use tower::ServiceExt;

// ============================================================================
// Test Setup
// ============================================================================

pub const TEST_SECRET: &[u8] = b"integration-test-secret";
pub const TEST_ISSUER: &str = "messagely";

/// bcrypt's minimum cost keeps the suite fast.
const TEST_BCRYPT_COST: u32 = 4;

/// A session manager sharing the test secret, for checking issued tokens.
pub fn test_sessions() -> SessionManager {
    // ---
    SessionManager::from_secret(TEST_SECRET, TEST_ISSUER, Some(Duration::from_secs(3600)))
}

/// Fresh state over an empty in-memory store.
pub fn test_state_with_metrics(metrics: MetricsPtr) -> AppState {
    // ---
    let (users, messages) = create_memory_stores();
    let authenticator = Authenticator::new(users.clone(), test_sessions(), TEST_BCRYPT_COST)
        .expect("authenticator should build");

    AppState::new(
        metrics,
        users,
        messages,
        Arc::new(authenticator),
        Duration::from_secs(10),
    )
}

/// Router over an empty in-memory store with no-op metrics.
pub fn test_app() -> Router {
    // ---
    let metrics = create_noop_metrics().expect("noop metrics");
    build_router(test_state_with_metrics(metrics))
}

// ============================================================================
// Request Helpers
// ============================================================================

/// Sends one request through the router and decodes the JSON body
/// (`Value::Null` when the body is empty or not JSON).
pub async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    // ---
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    (status, json)
}

/// Registers a user with predictable profile fields and returns the token.
pub async fn register(app: &Router, username: &str, password: &str) -> String {
    // ---
    let (status, body) = call(
        app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({
            "username": username,
            "password": password,
            "firstName": format!("{username}-first"),
            "lastName": format!("{username}-last"),
            "phone": "555-0100",
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "register {username}: {body}");
    body["token"].as_str().expect("token in body").to_string()
}

/// Logs in and returns the raw status and body.
pub async fn login(app: &Router, username: &str, password: &str) -> (StatusCode, Value) {
    // ---
    call(
        app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "username": username, "password": password })),
    )
    .await
}

/// Sends a message and returns its id.
pub async fn send_message(app: &Router, token: &str, to: &str, body: &str) -> i64 {
    // ---
    let (status, json) = call(
        app,
        Method::POST,
        "/messages",
        Some(token),
        Some(json!({ "toUsername": to, "body": body })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "send to {to}: {json}");
    json["message"]["id"].as_i64().expect("message id")
}

// ============================================================================
// Live Server
// ============================================================================

pub struct TestServer {
    pub addr: std::net::SocketAddr,
    pub client: Client,
}

impl TestServer {
    // ---
    pub async fn new() -> Self {
        // ---
        Self::with_router(test_app()).await
    }

    pub async fn with_router(app: Router) -> Self {
        // ---
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        // Spawn the server in the background
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Give the server a moment to start
        sleep(Duration::from_millis(100)).await;

        let client = Client::new();

        Self { addr, client }
    }

    pub fn url(&self, path: &str) -> String {
        // ---
        format!("http://{}{}", self.addr, path)
    }
}
