use messagely::{build_router, create_noop_metrics, create_prom_metrics};
use serial_test::serial;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

mod common;

use common::{test_state_with_metrics, TestServer};

// NOTE: The Prometheus recorder is process-wide.
// Tests are serial so concurrent installs don't race.

async fn prom_server() -> TestServer {
    // ---
    let metrics = create_prom_metrics().expect("prometheus metrics");
    TestServer::with_router(build_router(test_state_with_metrics(metrics))).await
}

#[tokio::test]
#[serial]
async fn metrics_endpoint_with_prometheus() {
    // ---
    let server = prom_server().await;

    // First, hit some endpoints to generate metrics
    let _ = server.client.get(server.url("/health")).send().await.unwrap();
    let _ = server.client.get(server.url("/")).send().await.unwrap();
    let _ = server
        .client
        .post(server.url("/login"))
        .json(&serde_json::json!({ "username": "ghost", "password": "nope" }))
        .send()
        .await
        .unwrap();

    // Give metrics a moment to be recorded
    sleep(Duration::from_millis(50)).await;

    let res = server.client.get(server.url("/metrics")).send().await.unwrap();
    assert!(res.status().is_success(), "Metrics endpoint should return success");

    let body = res.text().await.unwrap();
    assert!(
        body.contains("http_request_duration_seconds"),
        "missing request histogram: {body}"
    );
    assert!(body.contains("messagely_logins_total"), "missing login counter: {body}");
}

#[tokio::test]
#[serial]
async fn metrics_endpoint_with_noop() {
    // ---
    let metrics = create_noop_metrics().expect("noop metrics");
    let server = TestServer::with_router(build_router(test_state_with_metrics(metrics))).await;

    let _ = server.client.get(server.url("/health")).send().await.unwrap();

    let res = server.client.get(server.url("/metrics")).send().await.unwrap();

    // Should still return success even with noop metrics
    assert!(
        res.status().is_success(),
        "Metrics endpoint should return success even with noop"
    );
    assert!(res.text().await.unwrap().is_empty());
}

#[tokio::test]
#[serial]
async fn metrics_endpoint_survives_load() {
    // ---
    let server = Arc::new(prom_server().await);

    // Generate some load
    let futures = (0..20).map(|i| {
        let server = Arc::clone(&server);
        async move {
            let endpoint = match i % 3 {
                0 => "/health",
                1 => "/",
                _ => "/metrics",
            };
            server.client.get(server.url(endpoint)).send().await
        }
    });

    let responses = futures::future::join_all(futures).await;

    for (i, response) in responses.into_iter().enumerate() {
        // ---
        let response = response.unwrap_or_else(|_| panic!("Request {i} should succeed"));
        assert!(
            response.status().is_success(),
            "Request {i} should return success"
        );
    }

    let res = server.client.get(server.url("/metrics")).send().await.unwrap();
    assert!(res.status().is_success());
    assert!(!res.text().await.unwrap().is_empty());
}

#[tokio::test]
#[serial]
async fn metrics_content_type_is_correct() {
    // ---
    let server = prom_server().await;

    let res = server.client.get(server.url("/metrics")).send().await.unwrap();
    assert!(res.status().is_success());

    let content_type = res
        .headers()
        .get("content-type")
        .expect("content-type header")
        .to_str()
        .unwrap();
    assert!(
        content_type.starts_with("text/plain"),
        "Content type should be Prometheus text format: {content_type}"
    );
}

#[tokio::test]
#[serial]
async fn unknown_paths_do_not_become_labels() {
    // ---
    let server = prom_server().await;

    for path in ["/scan-0", "/scan-1"] {
        let res = server.client.get(server.url(path)).send().await.unwrap();
        assert_eq!(res.status(), 404);
    }

    let body = server
        .client
        .get(server.url("/metrics"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(!body.contains("scan-"), "raw path leaked into labels: {body}");
    assert!(body.contains("path=\"<unmatched>\""), "missing unmatched label: {body}");
}
