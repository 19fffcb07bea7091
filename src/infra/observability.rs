//! Prometheus metrics infrastructure.

use metrics::describe_counter;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;

/// Prometheus handle for on-demand scrape output (`GET /metrics`).
pub type PrometheusHandle = metrics_exporter_prometheus::PrometheusHandle;

/// Installs the global recorder and registers the counters the API emits.
///
/// No HTTP listener is started; the router renders the scrape output itself
/// via `handle.render()`.
///
/// # Errors
/// Returns an error if a recorder is already installed or building fails.
pub fn init_metrics() -> Result<PrometheusHandle, metrics_exporter_prometheus::BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    describe_counter!("users_registered_total", "Accepted user registrations");
    describe_counter!("transactions_recorded_total", "Recorded book sales");
    describe_counter!("api_errors_total", "Error responses by error type");

    Ok(handle)
}

/// Wraps the handle in an `Arc` for the app state; `None` when a recorder is
/// already installed, which only happens in multi-instance test setups.
#[must_use]
pub fn init_metrics_handle() -> Option<Arc<PrometheusHandle>> {
    init_metrics().ok().map(Arc::new)
}
