//! Prometheus metrics for DefendEarth.
//!
//! Counters are incremented where the work happens (dispatcher, monitor,
//! upstream clients, API handlers); this module only describes them and
//! installs the global recorder.

use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use thiserror::Error;

/// Errors raised while installing the metrics recorder.
#[derive(Error, Debug)]
pub enum MetricsError {
    #[error("Failed to install Prometheus recorder: {0}")]
    Install(#[from] BuildError),
}

/// Registers metric descriptions.
/// This should be called once during server initialization.
pub fn register_metrics() {
    describe_counter!(
        "de_alerts_sent_total",
        "Alert messages accepted by a provider, by channel and provider"
    );
    describe_counter!(
        "de_alerts_failed_total",
        "Alert messages rejected by a provider, by channel and provider"
    );
    describe_counter!(
        "de_threat_checks_total",
        "Threat monitor checks, by outcome"
    );
    describe_counter!(
        "de_registrations_total",
        "User registrations, by channel and outcome"
    );
    describe_counter!(
        "de_upstream_requests_total",
        "Requests to upstream data and notification APIs, by connector and outcome"
    );
    describe_counter!(
        "de_http_requests_total",
        "HTTP requests served, by method and status"
    );
    describe_histogram!(
        "de_http_request_duration_seconds",
        "HTTP request latency in seconds"
    );
}

/// Installs the global Prometheus recorder and describes all metrics.
///
/// Call once per process; a second call fails because the global recorder
/// is already set.
pub fn install_prometheus_recorder() -> Result<PrometheusHandle, MetricsError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    register_metrics();
    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics::counter;

    #[test]
    fn test_recorder_renders_counters() {
        let handle = install_prometheus_recorder().unwrap();
        counter!("de_threat_checks_total", "outcome" => "ok").increment(1);

        let rendered = handle.render();
        assert!(rendered.contains("de_threat_checks_total"));

        // Only one global recorder per process.
        assert!(install_prometheus_recorder().is_err());
    }
}
