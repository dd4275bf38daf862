//! Persistence gateway for prediction records.
//!
//! This module handles:
//! - The `PredictionStore` seam used by the pipeline
//! - PostgreSQL implementation with per-call connections
//! - Connection target resolution from settings
//! - In-memory mock store for testing

pub mod mock;
pub mod postgres;

use std::future::Future;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, instrument};

use crate::error::StoreError;
use crate::schema::{PredictionRequest, Region, Sex, Smoker};

pub use mock::{MockPredictionStore, MockStoreConfig};
pub use postgres::{ConnectTarget, PgPredictionStore};

/// Table holding one row per successful prediction.
pub const TABLE_NAME: &str = "insu_predict";

/// Store-assigned row identifier (`SERIAL`).
pub type RecordId = i32;

/// One persisted prediction: the validated request plus its rounded charge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionRecord {
    /// Age in years.
    pub age: i32,
    /// Applicant sex.
    pub sex: Sex,
    /// Body mass index.
    pub bmi: f64,
    /// Number of dependents.
    pub children: i32,
    /// Smoking status.
    pub smoker: Smoker,
    /// Residential region.
    pub region: Region,
    /// Predicted charge, two decimal places.
    pub predictions: f64,
}

impl PredictionRecord {
    /// Combine a request with its rounded prediction.
    pub fn new(request: &PredictionRequest, charge: Decimal) -> Self {
        Self {
            age: request.age,
            sex: request.sex,
            bmi: request.bmi,
            children: request.children,
            smoker: request.smoker,
            region: request.region,
            predictions: charge.to_f64().unwrap_or(f64::NAN),
        }
    }
}

/// Relational store for prediction records.
///
/// Every operation is scoped to a connection obtained from [`connect`](Self::connect)
/// and handed back through [`release`](Self::release). There is no pooling.
pub trait PredictionStore: Send + Sync + 'static {
    /// Open connection handle.
    type Connection: Send;

    /// Resolve configuration and open a connection.
    fn connect(&self) -> impl Future<Output = Result<Self::Connection, StoreError>> + Send;

    /// Create the record table if it does not exist.
    fn ensure_schema(
        &self,
        conn: &mut Self::Connection,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Insert one record and commit. Nothing is written on failure.
    fn insert_record(
        &self,
        conn: &mut Self::Connection,
        record: &PredictionRecord,
    ) -> impl Future<Output = Result<RecordId, StoreError>> + Send;

    /// Close a connection. Errors are logged, not returned.
    fn release(&self, conn: Self::Connection) -> impl Future<Output = ()> + Send;
}

/// Create the record table if absent, on a connection of its own.
///
/// Safe to call on every startup. The connection is released whether or
/// not the statement succeeds.
#[instrument(skip_all)]
pub async fn ensure_table<S: PredictionStore>(store: &S) -> Result<(), StoreError> {
    let mut conn = store.connect().await?;
    let created = store.ensure_schema(&mut conn).await;
    store.release(conn).await;
    created?;
    info!("Table {} is ready", TABLE_NAME);
    Ok(())
}
