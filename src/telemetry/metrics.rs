//! Prometheus metrics setup and metric definitions

use anyhow::{Context, Result};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus recorder and return a handle for rendering metrics.
pub fn install_prometheus_recorder() -> Result<PrometheusHandle> {
    let buckets = [
        0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
    ];

    PrometheusBuilder::new()
        .set_buckets(&buckets)
        .context("failed to set histogram buckets")?
        .install_recorder()
        .context("failed to install Prometheus recorder")
}

/// Register HELP/TYPE metadata so every metric shows up from startup.
pub fn describe_metrics() {
    describe_counter!("house_broker_http_requests_total", "Total number of HTTP requests");
    describe_histogram!(
        "house_broker_http_request_duration_seconds",
        "HTTP request duration in seconds"
    );
    describe_gauge!(
        "house_broker_http_requests_in_flight",
        "Number of HTTP requests currently being processed"
    );

    describe_counter!(
        "house_broker_auth_login_total",
        "Login attempts by result (success/failure)"
    );
    describe_counter!(
        "house_broker_auth_register_total",
        "Registrations by result (success/conflict)"
    );
    describe_counter!(
        "house_broker_property_mutations_total",
        "Listing writes by operation (create/update/delete)"
    );
}

pub fn record_login(success: bool) {
    let result = if success { "success" } else { "failure" };
    counter!("house_broker_auth_login_total", "result" => result).increment(1);
}

pub fn record_registration(result: &'static str) {
    counter!("house_broker_auth_register_total", "result" => result).increment(1);
}

pub fn record_property_mutation(operation: &'static str) {
    counter!("house_broker_property_mutations_total", "operation" => operation).increment(1);
}
