//! Prometheus metrics for the prediction pipeline.
//!
//! This module provides:
//! - Prediction success and failure counters
//! - Model inference latency
//! - Database insert latency
//! - HTTP request latency

use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing::debug;

use crate::pipeline::PipelineStage;

// === Metric Name Constants ===

/// Successful predictions counter metric name.
pub const METRIC_PREDICTIONS: &str = "predictions_total";
/// Failed predictions counter metric name.
pub const METRIC_PREDICTION_FAILURES: &str = "prediction_failures_total";
/// Model inference latency metric name.
pub const METRIC_MODEL_LATENCY: &str = "model_inference_latency_ms";
/// Database insert latency metric name.
pub const METRIC_DB_INSERT_LATENCY: &str = "db_insert_latency_ms";
/// HTTP request latency metric name.
pub const METRIC_HTTP_REQUEST_LATENCY: &str = "http_request_latency_ms";

/// Install the Prometheus recorder and describe all metrics.
/// Call this once at startup.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    describe_counter!(
        METRIC_PREDICTIONS,
        "Total number of predictions computed and stored"
    );
    describe_counter!(
        METRIC_PREDICTION_FAILURES,
        "Total number of predictions that failed, by stage"
    );
    describe_histogram!(
        METRIC_MODEL_LATENCY,
        "Model inference latency in milliseconds"
    );
    describe_histogram!(
        METRIC_DB_INSERT_LATENCY,
        "Database connect-and-insert latency in milliseconds"
    );
    describe_histogram!(
        METRIC_HTTP_REQUEST_LATENCY,
        "HTTP request latency in milliseconds"
    );

    debug!("Metrics initialized");
    Ok(handle)
}

/// Record HTTP request latency.
pub fn record_http_latency(start: Instant, endpoint: &'static str) {
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    histogram!(METRIC_HTTP_REQUEST_LATENCY, "endpoint" => endpoint).record(latency_ms);
}

/// Increment successful predictions counter.
pub fn inc_predictions() {
    counter!(METRIC_PREDICTIONS).increment(1);
}

/// Increment failed predictions counter.
pub fn inc_prediction_failures(stage: PipelineStage) {
    counter!(METRIC_PREDICTION_FAILURES, "stage" => stage.to_string()).increment(1);
}

/// RAII guard for timing operations.
/// Automatically records latency when dropped.
pub struct LatencyTimer {
    start: Instant,
    metric_name: &'static str,
}

impl LatencyTimer {
    /// Create a new latency timer for the given metric.
    pub fn new(metric_name: &'static str) -> Self {
        Self {
            start: Instant::now(),
            metric_name,
        }
    }

    /// Get elapsed time in milliseconds (without recording).
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        histogram!(self.metric_name).record(self.elapsed_ms());
    }
}

/// Create a latency timer for model inference.
pub fn timer_model() -> LatencyTimer {
    LatencyTimer::new(METRIC_MODEL_LATENCY)
}

/// Create a latency timer for database writes.
pub fn timer_db_insert() -> LatencyTimer {
    LatencyTimer::new(METRIC_DB_INSERT_LATENCY)
}
