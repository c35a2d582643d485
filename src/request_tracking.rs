//! Per-request timeout and HTTP metrics.

use crate::app_state::AppState;
use crate::error::AppError;
use axum::{
    extract::{MatchedPath, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    Router,
};
use std::time::Instant;
use tower_http::timeout::TimeoutLayer;

/// Metrics label for requests that matched no route.
pub const UNMATCHED_PATH: &str = "<unmatched>";

/// Wraps every route with the request timeout, the JSON timeout body and
/// HTTP metrics, outermost last.
pub(crate) fn with_request_layers(router: Router<AppState>, state: &AppState) -> Router<AppState> {
    // ---
    router
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            state.request_timeout(),
        ))
        .layer(middleware::map_response(render_timeout))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            track_http_metrics,
        ))
}

/// Replaces the empty 408 produced by the timeout layer with the usual
/// JSON error body.
pub async fn render_timeout(response: Response) -> Response {
    // ---
    if response.status() == StatusCode::REQUEST_TIMEOUT {
        tracing::warn!("Request exceeded the configured timeout");
        return AppError::Timeout.into_response();
    }
    response
}

/// Records request duration against the route template (e.g.
/// `/messages/{id}`), so ids and unknown paths never become label values.
pub async fn track_http_metrics(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    // ---
    let start = Instant::now();
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| UNMATCHED_PATH.to_owned());

    let response = next.run(request).await;

    state
        .metrics()
        .record_http_request(start, &path, &method, response.status().as_u16());

    response
}
