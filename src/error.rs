//! Unified error types for the prediction service.

use std::path::PathBuf;

use thiserror::Error;

use crate::pipeline::PipelineStage;

/// Process-level error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Configuration loaded but failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Model artifact error.
    #[error("model error: {0}")]
    Model(#[from] ModelError),

    /// Persistence error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Input schema violations that survive JSON type checking.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Integer field below zero.
    #[error("{field} must be a non-negative integer, got {value}")]
    Negative {
        /// Offending field.
        field: &'static str,
        /// Submitted value.
        value: i64,
    },

    /// Integer field too large for the INT column.
    #[error("{field} is out of range: {value}")]
    OutOfRange {
        /// Offending field.
        field: &'static str,
        /// Submitted value.
        value: i64,
    },

    /// BMI must be a finite positive number.
    #[error("bmi must be a positive number, got {0}")]
    NonPositiveBmi(f64),

    /// Value not in the field's enumeration.
    #[error("{field} must be one of [{allowed}], got {value:?}")]
    UnknownVariant {
        /// Offending field.
        field: &'static str,
        /// Submitted value.
        value: String,
        /// Accepted values, comma separated.
        allowed: &'static str,
    },
}

/// Model loading and inference errors.
#[derive(Error, Debug)]
pub enum ModelError {
    /// Neither deserialization strategy could read the artifact.
    #[error("failed to load model from {path}: pipeline format: {primary}; generic format: {fallback}")]
    Load {
        /// Artifact path.
        path: PathBuf,
        /// Pipeline-format failure.
        primary: String,
        /// Generic-format failure.
        fallback: String,
    },

    /// Artifact file could not be read.
    #[error("failed to read model file {path}: {source}")]
    Read {
        /// Artifact path.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Input frame lacks a column the model needs.
    #[error("missing feature column: {0}")]
    MissingFeature(String),

    /// Input frame column has the wrong value type.
    #[error("feature {name} expected {expected}")]
    FeatureType {
        /// Column name.
        name: String,
        /// Expected kind.
        expected: &'static str,
    },

    /// Frame must hold exactly one row.
    #[error("expected a single-row frame, got {0} rows")]
    RowCount(usize),

    /// Prediction frame lacks the designated output column.
    #[error("prediction output column {0} is missing")]
    MissingOutput(String),

    /// Model produced NaN, infinity, or a value too large to round.
    #[error("model produced an unusable value: {0}")]
    NonFinite(f64),
}

/// Persistence gateway errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No connection configuration available.
    #[error("{0}")]
    Config(String),

    /// Connection could not be established.
    #[error("database connection error: {0}")]
    Connect(#[source] sqlx::Error),

    /// CREATE TABLE failed.
    #[error("table creation error: {0}")]
    Schema(#[source] sqlx::Error),

    /// INSERT or COMMIT failed.
    #[error("insert error: {0}")]
    Insert(#[source] sqlx::Error),

    /// Failure raised by a non-PostgreSQL store.
    #[error("{0}")]
    Backend(String),
}

/// Failures of a single pipeline run after validation.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Model invocation failed.
    #[error("prediction failed: {0}")]
    Model(#[from] ModelError),

    /// Connection could not be acquired; no insert attempted.
    #[error("connection failed: {0}")]
    Connection(#[source] StoreError),

    /// Insert failed; nothing was written.
    #[error("persistence failed: {0}")]
    Persistence(#[source] StoreError),
}

impl PipelineError {
    /// Stage the pipeline was leaving when it failed.
    pub fn stage(&self) -> PipelineStage {
        match self {
            Self::Model(_) => PipelineStage::Validated,
            Self::Connection(_) | Self::Persistence(_) => PipelineStage::Predicted,
        }
    }

    /// Message returned to the client in the `error` field.
    pub fn client_message(&self) -> String {
        match self {
            Self::Model(_) => "Failed to compute prediction".to_string(),
            Self::Connection(StoreError::Config(msg)) => msg.clone(),
            Self::Connection(_) => "Connection to PostgreSQL failed during prediction".to_string(),
            Self::Persistence(_) => "Failed to add predictions to table".to_string(),
        }
    }
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_messages_hide_driver_details() {
        let err = PipelineError::Persistence(StoreError::Insert(sqlx::Error::PoolTimedOut));
        assert_eq!(err.client_message(), "Failed to add predictions to table");
        assert_eq!(err.stage(), PipelineStage::Predicted);

        let err = PipelineError::Connection(StoreError::Connect(sqlx::Error::PoolClosed));
        assert_eq!(
            err.client_message(),
            "Connection to PostgreSQL failed during prediction"
        );
    }

    #[test]
    fn configuration_message_is_surfaced_verbatim() {
        let err = PipelineError::Connection(StoreError::Config(
            "DATABASE_URL is not set in the environment.".to_string(),
        ));
        assert_eq!(err.client_message(), "DATABASE_URL is not set in the environment.");
    }

    #[test]
    fn model_failures_are_reported_at_validated_stage() {
        let err = PipelineError::from(ModelError::MissingOutput("prediction_label".into()));
        assert_eq!(err.stage(), PipelineStage::Validated);
        assert_eq!(err.client_message(), "Failed to compute prediction");
    }
}
