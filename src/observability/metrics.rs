//! Metrics collection and exposition.
//!
//! # Metrics
//! - `versioning_decisions_total` (counter): dispatcher decisions by outcome
//!   (`dispatch`, `reject`, `pass_through`) and resolved version (`none` when
//!   nothing was dispatched)

use std::net::SocketAddr;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

pub const DECISIONS_TOTAL: &str = "versioning_decisions_total";

/// Count one dispatcher decision.
pub fn record_decision(outcome: &'static str, version: Option<u32>) {
    let version = version.map_or_else(|| "none".to_string(), |v| v.to_string());
    ::metrics::counter!(DECISIONS_TOTAL, "outcome" => outcome, "version" => version).increment(1);
}

/// Install the Prometheus recorder and serve it on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}
