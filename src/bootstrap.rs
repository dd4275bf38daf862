//! Service startup: load the model, ensure the table, build the state.

use std::sync::Arc;

use tracing::{error, info};

use crate::api::AppState;
use crate::config::Config;
use crate::error::Result;
use crate::model::{self, Regressor};
use crate::pipeline::PredictionPipeline;
use crate::store::{ensure_table, PgPredictionStore, PredictionStore};

/// Build the pipeline over an already loaded model and ensure the table.
///
/// A schema failure is logged and the service starts anyway; each request
/// will then report its own database error.
pub async fn assemble<S: PredictionStore>(model: Arc<dyn Regressor>, store: S) -> AppState<S> {
    let pipeline = PredictionPipeline::new(model, store);
    if let Err(e) = pipeline.ensure_schema().await {
        error!("Table creation error: {}", e);
    }
    AppState::new(pipeline)
}

/// Full startup against PostgreSQL.
///
/// Fails only when the model artifact cannot be loaded.
pub async fn bootstrap(config: &Config) -> Result<AppState<PgPredictionStore>> {
    let path = config.model_path()?;
    let loaded = model::load(&path)?;
    info!(strategy = %loaded.strategy, "Model ready");

    let store = PgPredictionStore::new(config.database());
    Ok(assemble(loaded.model, store).await)
}

/// Create the record table against the configured database.
///
/// Unlike [`bootstrap`], a schema failure here is the caller's error.
pub async fn init_schema(config: &Config) -> Result<()> {
    let store = PgPredictionStore::new(config.database());
    ensure_table(&store).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, StoreError};
    use crate::model::StubRegressor;
    use crate::store::{MockPredictionStore, MockStoreConfig};

    #[tokio::test]
    async fn assemble_creates_table() {
        let store = MockPredictionStore::new();
        let _state = assemble(Arc::new(StubRegressor::returning(1.0)), store.clone()).await;
        assert!(store.table_created());
        assert_eq!(store.releases(), 1);
    }

    #[tokio::test]
    async fn assemble_survives_unreachable_database() {
        let store = MockPredictionStore::with_config(MockStoreConfig {
            fail_connect: true,
            ..Default::default()
        });
        let _state = assemble(Arc::new(StubRegressor::returning(1.0)), store.clone()).await;
        assert!(!store.table_created());
        assert_eq!(store.connects(), 1);
    }

    #[tokio::test]
    async fn bootstrap_fails_without_model() {
        let config: Config = envy::from_iter([(
            "MODEL_PATH".to_string(),
            "/nonexistent/model.json".to_string(),
        )])
        .unwrap();
        assert!(bootstrap(&config).await.is_err());
    }

    #[tokio::test]
    async fn init_schema_without_database_settings_is_a_store_error() {
        let config: Config = envy::from_iter(Vec::<(String, String)>::new()).unwrap();
        let err = init_schema(&config).await.unwrap_err();
        assert!(matches!(err, AppError::Store(StoreError::Config(_))));
    }
}
