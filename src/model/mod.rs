//! Regression model artifact.
//!
//! This module handles:
//! - Tabular frames passed to and returned from the model
//! - Linear artifact formats
//! - Loading the artifact once at startup
//! - A stub regressor for testing

pub mod frame;
pub mod linear;
pub mod loader;
pub mod mock;

use std::fmt::Debug;

use crate::error::ModelError;

pub use frame::{FeatureFrame, FeatureValue, PredictionFrame, FEATURE_COLUMNS, LABEL_COLUMN};
pub use linear::{FeatureSpec, GenericLinearModel, PipelineModel};
pub use loader::{load, LoadStrategy, LoadedModel};
pub use mock::StubRegressor;

/// A trained regression model.
///
/// Implementations are read-only after construction and shared across
/// concurrent requests without locking.
pub trait Regressor: Send + Sync + Debug {
    /// Predict one output row per input row.
    fn predict(&self, frame: &FeatureFrame) -> Result<PredictionFrame, ModelError>;
}
