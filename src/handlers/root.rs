use axum::response::IntoResponse;

pub async fn root_handler() -> impl IntoResponse {
    let version = env!("CARGO_PKG_VERSION");
    format!(
        r#"Welcome to Messagely
Version: {version}

Available endpoints:
  - POST /auth/register          - Register and receive a token
  - POST /auth/login             - Log in and receive a token
  - GET  /users                  - List users (token required)
  - GET  /users/{{username}}       - Your profile (token required)
  - GET  /users/{{username}}/to    - Messages you received
  - GET  /users/{{username}}/from  - Messages you sent
  - POST /messages               - Send a message
  - GET  /messages/{{id}}          - View a message you sent or received
  - POST /messages/{{id}}/read     - Mark a received message read
  - GET  /health                 - Light health check
  - GET  /health?mode=full       - Full health check (includes the store)
  - GET  /metrics                - Prometheus metrics
"#
    )
}
