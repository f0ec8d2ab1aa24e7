//! Prometheus recorder and metric definitions

use metrics::describe_counter;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus recorder and return a handle for rendering metrics.
pub fn install_prometheus_recorder() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Register metric descriptions so rendered output carries HELP/TYPE lines
/// from startup.
pub fn describe_metrics() {
    describe_counter!(
        "ticketdesk_session_bootstrap_total",
        "Session bootstrap results by outcome"
    );
    describe_counter!(
        "ticketdesk_api_requests_total",
        "Backend requests by method, endpoint template and status"
    );
    describe_counter!(
        "ticketdesk_gate_decisions_total",
        "Authorization gate evaluations by resulting state"
    );
}
