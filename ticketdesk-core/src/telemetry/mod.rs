//! Telemetry initialization: structured logging and metrics

pub mod metrics;

use crate::config::TelemetryConfig;
use metrics_exporter_prometheus::PrometheusHandle;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter when `RUST_LOG` is unset
const DEFAULT_FILTER: &str = "ticketdesk_core=info";

/// Initialise logging and, when enabled, the metrics recorder.
///
/// Returns `Some(PrometheusHandle)` when metrics are enabled so the caller
/// can render a snapshot.
pub fn init(config: &TelemetryConfig) -> Option<PrometheusHandle> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_FILTER.into());

    let registry = tracing_subscriber::registry().with(env_filter);

    // A subscriber may already be installed (tests, embedding hosts).
    let installed = if config.log_format == "json" {
        // Flatten event fields so `message` is top-level.
        let fmt_layer = tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true);
        registry.with(fmt_layer).try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    };
    if installed.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }

    if !config.metrics_enabled {
        return None;
    }

    match metrics::install_prometheus_recorder() {
        Ok(handle) => {
            metrics::describe_metrics();
            Some(handle)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to install metrics recorder, metrics disabled");
            None
        }
    }
}
