use metrics::{counter, histogram};
use std::time::Instant;

/// Increment the registered-users counter.
pub fn increment_user_registered() {
    counter!("messagely_users_registered_total").increment(1);
}

/// Count a login attempt, labelled by outcome.
pub fn increment_login(success: bool) {
    let outcome = if success { "success" } else { "failure" };
    counter!("messagely_logins_total", "outcome" => outcome).increment(1);
}

/// Increment the sent-messages counter.
pub fn increment_message_sent() {
    counter!("messagely_messages_sent_total").increment(1);
}

/// Increment the read-receipts counter.
pub fn increment_message_read() {
    counter!("messagely_messages_read_total").increment(1);
}

/// Track HTTP request latency using a histogram.
pub fn track_http_request(start: Instant, path: &str, method: &str, status: u16) {
    let elapsed = start.elapsed();
    histogram!(
        "http_request_duration_seconds",
        "path" => path.to_string(),
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .record(elapsed);
}
