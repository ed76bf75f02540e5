//! Observability utilities for the research API.
//!
//! This crate provides:
//! - Prometheus metrics recording and export
//! - Task lifecycle metrics for the background worker
//! - Axum middleware for per-request HTTP metrics
//!
//! # Example
//!
//! ```rust,ignore
//! use observability::{init_metrics, metrics_handler, TaskMetrics};
//!
//! init_metrics();
//! TaskMetrics::record_received("process_data");
//!
//! let app = Router::new().route("/metrics", get(metrics_handler));
//! ```

pub mod middleware;
pub mod tasks;

pub use middleware::metrics_middleware;
pub use tasks::{TaskMetrics, TaskOutcome};

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use tracing::{info, warn};

static METRICS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Initialize the Prometheus metrics recorder.
///
/// Call once at startup; later calls return the existing handle. If another
/// global recorder is already installed, this logs a warning and returns
/// `None`; `/metrics` then reports that metrics are not initialized.
pub fn init_metrics() -> Option<&'static PrometheusHandle> {
    METRICS_HANDLE
        .get_or_try_init(|| {
            let handle = PrometheusBuilder::new().install_recorder()?;
            register_metric_descriptions();
            info!("Prometheus metrics recorder initialized");
            Ok::<_, BuildError>(handle)
        })
        .inspect_err(|e| warn!(error = %e, "Failed to install Prometheus recorder"))
        .ok()
}

/// Get the metrics handle (must call init_metrics first)
pub fn get_metrics_handle() -> Option<&'static PrometheusHandle> {
    METRICS_HANDLE.get()
}

/// Axum handler for /metrics endpoint
pub async fn metrics_handler() -> String {
    match get_metrics_handle() {
        Some(handle) => handle.render(),
        None => "# Metrics not initialized\n".to_string(),
    }
}

fn register_metric_descriptions() {
    use metrics::{describe_counter, describe_gauge, describe_histogram};

    describe_counter!("http_requests_total", "Total number of HTTP requests");
    describe_histogram!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds"
    );
    describe_counter!(
        "http_requests_errors_total",
        "Total number of HTTP responses with a 4xx or 5xx status"
    );

    describe_counter!("tasks_received_total", "Tasks accepted onto the queue");
    describe_counter!(
        "tasks_processed_total",
        "Task executions by terminal status"
    );
    describe_counter!("tasks_retried_total", "Task retries scheduled");
    describe_histogram!(
        "task_duration_seconds",
        "Duration of a single task attempt in seconds"
    );
    describe_gauge!("tasks_in_flight", "Tasks currently executing");
}
