//! Prometheus metrics implementation.
//!
//! Concrete `Metrics` backend. It delegates to the helpers in `counters.rs`
//! and `recorder.rs`, which talk to the global `metrics` crate registry.
//! Metrics register themselves on first use; a single global handle renders
//! them in Prometheus text format.

use crate::domain::Metrics;
use std::time::Instant;

/// Prometheus-based metrics implementation.
///
/// Empty because all state lives in the global recorder installed by
/// `recorder::init_metrics`.
pub struct PrometheusMetrics {}

impl PrometheusMetrics {
    pub fn new() -> Self {
        tracing::info!("Creating Prometheus metrics");
        PrometheusMetrics {}
    }
}

impl Metrics for PrometheusMetrics {
    fn render(&self) -> String {
        super::render_metrics()
    }

    fn record_user_registered(&self) {
        tracing::debug!("Recording user registered event");
        super::increment_user_registered();
    }

    fn record_login(&self, success: bool) {
        super::increment_login(success);
    }

    fn record_message_sent(&self) {
        tracing::debug!("Recording message sent event");
        super::increment_message_sent();
    }

    fn record_message_read(&self) {
        super::increment_message_read();
    }

    fn record_http_request(&self, start: Instant, path: &str, method: &str, status: u16) {
        super::track_http_request(start, path, method, status);
    }
}
