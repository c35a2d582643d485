// src/infrastructure/metrics/noop/mod.rs
mod noop_metrics;

pub use noop_metrics::NoopMetrics;
use std::sync::Arc;

/// Metrics backend for `MESSAGELY_METRICS_TYPE=noop` (the default).
///
/// Every counter and histogram call is discarded and `/metrics` answers
/// with an empty body.
pub fn create() -> anyhow::Result<crate::domain::MetricsPtr> {
    Ok(Arc::new(NoopMetrics::new()))
}
