//! Prometheus metrics for the request layer and page server.
//!
//! This module provides metrics for:
//! - Crawl service request latency per endpoint
//! - Request outcomes per endpoint
//! - Pages rendered by the page server

use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::debug;

// === Metric Name Constants ===

/// Crawl service request latency metric name.
pub const METRIC_API_REQUEST_LATENCY: &str = "api_request_latency_ms";
/// Crawl service request outcome counter metric name.
pub const METRIC_API_REQUESTS: &str = "api_requests_total";
/// Pages rendered counter metric name.
pub const METRIC_PAGES_RENDERED: &str = "pages_rendered_total";

/// Outcome label for a decoded success response.
pub const OUTCOME_SUCCESS: &str = "success";
/// Outcome label for a non-success status from the service.
pub const OUTCOME_SERVICE_ERROR: &str = "service_error";
/// Outcome label for network or decode failures.
pub const OUTCOME_TRANSPORT_ERROR: &str = "transport_error";
/// Outcome label for cancelled or dropped calls.
pub const OUTCOME_CANCELLED: &str = "cancelled";
/// Outcome label for calls rejected before a request was sent.
pub const OUTCOME_INVALID_REQUEST: &str = "invalid_request";

/// Initialize all metric descriptions.
/// Call this once at startup to register metrics with descriptions.
pub fn init_metrics() {
    describe_histogram!(
        METRIC_API_REQUEST_LATENCY,
        "Crawl service request latency in milliseconds"
    );
    describe_counter!(
        METRIC_API_REQUESTS,
        "Total number of crawl service requests by endpoint and outcome"
    );
    describe_counter!(
        METRIC_PAGES_RENDERED,
        "Total number of pages rendered by route and status"
    );

    debug!("Metrics initialized");
}

/// Install the Prometheus recorder and return a handle for rendering.
pub fn install_prometheus() -> Result<PrometheusHandle, String> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| format!("failed to install prometheus recorder: {}", e))?;
    init_metrics();
    Ok(handle)
}

/// Record crawl service request latency.
pub fn record_api_latency(start: Instant, endpoint: &'static str) {
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    histogram!(METRIC_API_REQUEST_LATENCY, "endpoint" => endpoint).record(latency_ms);
}

/// Increment the request outcome counter.
pub fn inc_request_outcome(endpoint: &'static str, outcome: &'static str) {
    counter!(METRIC_API_REQUESTS, "endpoint" => endpoint, "outcome" => outcome).increment(1);
}

/// Increment the pages rendered counter.
pub fn inc_pages_rendered(route: &'static str, status: u16) {
    counter!(METRIC_PAGES_RENDERED, "route" => route, "status" => status.to_string()).increment(1);
}
