//! Request-validate-predict-persist pipeline.

pub mod service;

use rust_decimal::Decimal;
use serde::Serialize;
use strum::Display;

pub use service::{round_charge, PredictionPipeline};

/// Progress of a single request through the pipeline.
///
/// `Received -> Validated -> Predicted -> Persisted -> Responded`, with
/// `Failed` reachable from every step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PipelineStage {
    /// Body arrived, not yet checked.
    Received,
    /// Schema checks passed.
    Validated,
    /// Model produced a rounded charge.
    Predicted,
    /// Row committed.
    Persisted,
    /// Success payload returned.
    Responded,
    /// Terminal failure.
    Failed,
}

/// Outcome of a successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PredictionResult {
    /// Predicted charge rounded to two decimal places.
    pub predicted_charge: Decimal,
    /// Id of the stored row.
    pub record_id: crate::store::RecordId,
}
