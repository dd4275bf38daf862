//! Stub regressor for unit testing.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::frame::{FeatureFrame, PredictionFrame, LABEL_COLUMN};
use super::Regressor;
use crate::error::ModelError;

/// Returns a fixed value and counts invocations.
#[derive(Debug, Clone)]
pub struct StubRegressor {
    value: f64,
    fail: bool,
    output_column: String,
    calls: Arc<AtomicUsize>,
}

impl StubRegressor {
    /// Stub that predicts `value` for every row.
    pub fn returning(value: f64) -> Self {
        Self {
            value,
            fail: false,
            output_column: LABEL_COLUMN.to_string(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Stub whose every call fails.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::returning(0.0)
        }
    }

    /// Write predictions to a different column.
    pub fn with_output_column(mut self, name: impl Into<String>) -> Self {
        self.output_column = name.into();
        self
    }

    /// Number of `predict` calls so far, across clones.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Regressor for StubRegressor {
    fn predict(&self, frame: &FeatureFrame) -> Result<PredictionFrame, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ModelError::MissingFeature("stub failure".to_string()));
        }
        let rows = frame.row_count()?;
        Ok(PredictionFrame::single(
            self.output_column.clone(),
            vec![self.value; rows],
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_call_count() {
        let stub = StubRegressor::returning(1.5);
        let clone = stub.clone();
        let frame = FeatureFrame::new().with_column(
            "age",
            vec![crate::model::frame::FeatureValue::Number(1.0)],
        );
        clone.predict(&frame).unwrap();
        assert_eq!(stub.calls(), 1);
    }

    #[test]
    fn failing_stub_still_counts() {
        let stub = StubRegressor::failing();
        assert!(stub.predict(&FeatureFrame::new()).is_err());
        assert_eq!(stub.calls(), 1);
    }
}
