//! HTTP API handlers.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use metrics_exporter_prometheus::PrometheusHandle;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::metrics;
use crate::pipeline::{PredictionPipeline, PredictionResult};
use crate::schema::PredictionRequest;
use crate::store::PredictionStore;

/// Success message returned with every stored prediction.
pub const SUCCESS_MESSAGE: &str = "Data Added Successfully";

/// Application state shared with handlers.
pub struct AppState<S> {
    /// Prediction pipeline.
    pub pipeline: Arc<PredictionPipeline<S>>,
    /// Prometheus handle, when a recorder is installed.
    pub metrics: Option<PrometheusHandle>,
}

impl<S> AppState<S> {
    /// Create new app state.
    pub fn new(pipeline: PredictionPipeline<S>) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            metrics: None,
        }
    }

    /// Attach a Prometheus handle for `/metrics`.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            pipeline: Arc::clone(&self.pipeline),
            metrics: self.metrics.clone(),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Status: "ok".
    pub status: &'static str,
}

/// Body of a stored prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    /// Always [`SUCCESS_MESSAGE`].
    pub message: String,
    /// Charge rounded to two decimals.
    #[serde(rename = "Predicted charges")]
    pub predicted_charges: f64,
}

impl From<PredictionResult> for PredictionResponse {
    fn from(result: PredictionResult) -> Self {
        Self {
            message: SUCCESS_MESSAGE.to_string(),
            predicted_charges: result.predicted_charge.to_f64().unwrap_or(f64::NAN),
        }
    }
}

/// Body of a failed run after validation. Sent with HTTP 200.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable description.
    pub error: String,
}

/// Body of a rejected request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectionResponse {
    /// Why the body was rejected.
    pub detail: String,
}

/// Health check handler - always returns 200.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

/// Prediction handler.
///
/// Rejected bodies keep the extractor's status (422, 400 or 415) and never
/// reach the model or the database. Pipeline failures are reported as
/// `{"error": ...}` with status 200.
pub async fn predict<S: PredictionStore>(
    State(state): State<AppState<S>>,
    payload: Result<Json<PredictionRequest>, JsonRejection>,
) -> Response {
    let start = Instant::now();

    let response = match payload {
        Err(rejection) => {
            warn!("Rejected prediction request: {}", rejection.body_text());
            (
                rejection.status(),
                Json(RejectionResponse {
                    detail: rejection.body_text(),
                }),
            )
                .into_response()
        }
        Ok(Json(request)) => match state.pipeline.run(&request).await {
            Ok(result) => Json(PredictionResponse::from(result)).into_response(),
            Err(e) => (
                StatusCode::OK,
                Json(ErrorResponse {
                    error: e.client_message(),
                }),
            )
                .into_response(),
        },
    };

    metrics::record_http_latency(start, "/predict");
    response
}

/// Prometheus exposition handler - 404 when no recorder is installed.
pub async fn metrics_text<S>(State(state): State<AppState<S>>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
