//! Pipeline execution over a model and a store.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, error, info, instrument};

use super::{PipelineStage, PredictionResult};
use crate::error::{ModelError, PipelineError, StoreError};
use crate::metrics;
use crate::model::{FeatureFrame, Regressor, LABEL_COLUMN};
use crate::schema::PredictionRequest;
use crate::store::{self, PredictionRecord, PredictionStore};

/// Round a raw model output to two decimal places.
///
/// The value is scaled to cents in `f64` and rounded half to even there, so
/// `-12.005` becomes `-12.00` even though its binary value lies just past
/// the midpoint.
pub fn round_charge(raw: f64) -> Result<Decimal, ModelError> {
    let cents = (raw * 100.0).round_ties_even();
    if !cents.is_finite() {
        return Err(ModelError::NonFinite(raw));
    }
    Decimal::try_from_i128_with_scale(cents as i128, 2).map_err(|_| ModelError::NonFinite(raw))
}

/// Runs validated requests through the model and into the store.
///
/// The model handle is shared and read-only. Each run opens and releases its
/// own store connection.
#[derive(Debug)]
pub struct PredictionPipeline<S> {
    model: Arc<dyn Regressor>,
    store: S,
}

impl<S: PredictionStore> PredictionPipeline<S> {
    /// Create a pipeline.
    pub fn new(model: Arc<dyn Regressor>, store: S) -> Self {
        Self { model, store }
    }

    /// The backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Invoke the model on one request and round the output.
    pub fn predict(&self, request: &PredictionRequest) -> Result<Decimal, ModelError> {
        let _timer = metrics::timer_model();
        let frame = FeatureFrame::from_request(request);
        let output = self.model.predict(&frame)?;
        let raw = output.first(LABEL_COLUMN)?;
        let charge = round_charge(raw)?;
        debug!(raw, %charge, "Model prediction");
        Ok(charge)
    }

    /// Run a validated request to completion.
    #[instrument(skip_all, fields(age = request.age, smoker = %request.smoker, region = %request.region))]
    pub async fn run(&self, request: &PredictionRequest) -> Result<PredictionResult, PipelineError> {
        let result = self.run_stages(request).await;
        match &result {
            Ok(out) => {
                metrics::inc_predictions();
                info!(
                    stage = %PipelineStage::Persisted,
                    record_id = out.record_id,
                    "Predicted charges: {}",
                    out.predicted_charge
                );
            }
            Err(e) => {
                metrics::inc_prediction_failures(e.stage());
                error!(from = %e.stage(), stage = %PipelineStage::Failed, "Prediction error: {}", e);
            }
        }
        result
    }

    async fn run_stages(&self, request: &PredictionRequest) -> Result<PredictionResult, PipelineError> {
        let charge = self.predict(request)?;
        debug!(stage = %PipelineStage::Predicted, "Charge computed");

        let _timer = metrics::timer_db_insert();
        let mut conn = self
            .store
            .connect()
            .await
            .map_err(PipelineError::Connection)?;

        let record = PredictionRecord::new(request, charge);
        let inserted = self.store.insert_record(&mut conn, &record).await;
        self.store.release(conn).await;

        let record_id = inserted.map_err(PipelineError::Persistence)?;
        Ok(PredictionResult {
            predicted_charge: charge,
            record_id,
        })
    }

    /// Create the record table if absent. Safe to call on every startup.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        store::ensure_table(&self.store).await
    }
}
