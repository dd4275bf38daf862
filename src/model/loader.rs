//! Startup loading of the model artifact.

use std::path::Path;
use std::sync::Arc;

use strum::Display;
use tracing::{info, instrument, warn};

use super::linear::{GenericLinearModel, PipelineModel};
use super::Regressor;
use crate::error::ModelError;

/// Deserialization strategy that produced the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum LoadStrategy {
    /// Artifact with embedded preprocessing.
    Pipeline,
    /// Bare coefficient table.
    Generic,
}

/// A loaded model and how it was read.
#[derive(Debug, Clone)]
pub struct LoadedModel {
    /// Shared, read-only model handle.
    pub model: Arc<dyn Regressor>,
    /// Strategy that succeeded.
    pub strategy: LoadStrategy,
}

/// Load the model artifact at `path`.
///
/// Tries the pipeline format first and the generic format second. Both
/// failures are reported together; the caller is expected to abort startup.
#[instrument(skip(path), fields(path = %path.display()))]
pub fn load(path: &Path) -> Result<LoadedModel, ModelError> {
    info!("Loading model from: {}", path.display());

    let bytes = std::fs::read(path).map_err(|source| ModelError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let primary = match serde_json::from_slice::<PipelineModel>(&bytes) {
        Ok(model) => {
            info!(features = model.features.len(), "Model loaded with pipeline strategy");
            return Ok(LoadedModel {
                model: Arc::new(model),
                strategy: LoadStrategy::Pipeline,
            });
        }
        Err(e) => {
            warn!("Failed to load model with pipeline strategy: {}", e);
            e.to_string()
        }
    };

    match serde_json::from_slice::<GenericLinearModel>(&bytes) {
        Ok(model) => {
            info!(
                coefficients = model.coefficients.len(),
                "Model loaded with generic strategy"
            );
            Ok(LoadedModel {
                model: Arc::new(model),
                strategy: LoadStrategy::Generic,
            })
        }
        Err(e) => {
            warn!("Failed to load model with generic strategy: {}", e);
            Err(ModelError::Load {
                path: path.to_path_buf(),
                primary,
                fallback: e.to_string(),
            })
        }
    }
}
