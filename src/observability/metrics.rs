//! Metrics collection and exposition.
//!
//! # Metrics
//! - `hop_relay_requests_total` (counter): hop requests by outcome
//!   (`done`, `forwarded`, `rejected`, `failed`)
//! - `hop_relay_forwards_total` (counter): forwards by target host
//! - `hop_relay_request_duration_seconds` (histogram): handler latency
//!
//! Recording is a no-op until [`init_metrics`] installs the exporter.

use std::net::SocketAddr;
use std::time::Duration;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and serve it on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_outcome(outcome: &'static str) {
    ::metrics::counter!("hop_relay_requests_total", "outcome" => outcome).increment(1);
}

pub fn record_forward(host: &str) {
    ::metrics::counter!("hop_relay_forwards_total", "host" => host.to_string()).increment(1);
}

pub fn record_duration(elapsed: Duration) {
    ::metrics::histogram!("hop_relay_request_duration_seconds").record(elapsed.as_secs_f64());
}
