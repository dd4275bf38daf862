//! In-memory prediction store for unit testing.
//!
//! Records every call so tests can assert that rejected input never opens a
//! connection, and that failed inserts leave no rows behind.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::{PredictionRecord, PredictionStore, RecordId};
use crate::error::StoreError;

/// Configuration for mock store behavior.
#[derive(Debug, Clone, Default)]
pub struct MockStoreConfig {
    /// Fail `connect` as if no configuration were present.
    pub missing_config: bool,
    /// Fail `connect` as if the server were unreachable.
    pub fail_connect: bool,
    /// Fail `ensure_schema`.
    pub fail_schema: bool,
    /// Fail `insert_record`.
    pub fail_insert: bool,
}

#[derive(Debug, Default)]
struct Counters {
    connects: AtomicUsize,
    releases: AtomicUsize,
    schema_calls: AtomicUsize,
    inserts: AtomicUsize,
}

/// Handle returned by [`MockPredictionStore::connect`].
#[derive(Debug)]
pub struct MockConnection {
    /// Sequence number of this connection.
    pub id: usize,
}

/// Mock prediction store.
#[derive(Debug, Clone, Default)]
pub struct MockPredictionStore {
    config: MockStoreConfig,
    table_created: Arc<Mutex<bool>>,
    rows: Arc<Mutex<Vec<(RecordId, PredictionRecord)>>>,
    counters: Arc<Counters>,
}

impl MockPredictionStore {
    /// Create a new mock store that succeeds at everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock store with custom configuration.
    pub fn with_config(config: MockStoreConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Stored rows with their ids.
    pub fn rows(&self) -> Vec<(RecordId, PredictionRecord)> {
        self.rows.lock().unwrap().clone()
    }

    /// Whether `ensure_schema` has succeeded at least once.
    pub fn table_created(&self) -> bool {
        *self.table_created.lock().unwrap()
    }

    /// Number of `connect` calls, successful or not.
    pub fn connects(&self) -> usize {
        self.counters.connects.load(Ordering::SeqCst)
    }

    /// Number of `release` calls.
    pub fn releases(&self) -> usize {
        self.counters.releases.load(Ordering::SeqCst)
    }

    /// Number of `ensure_schema` calls.
    pub fn schema_calls(&self) -> usize {
        self.counters.schema_calls.load(Ordering::SeqCst)
    }

    /// Number of `insert_record` calls.
    pub fn inserts(&self) -> usize {
        self.counters.inserts.load(Ordering::SeqCst)
    }
}

impl PredictionStore for MockPredictionStore {
    type Connection = MockConnection;

    async fn connect(&self) -> Result<MockConnection, StoreError> {
        let id = self.counters.connects.fetch_add(1, Ordering::SeqCst);
        if self.config.missing_config {
            return Err(StoreError::Config(
                "DATABASE_URL is not set in the environment.".to_string(),
            ));
        }
        if self.config.fail_connect {
            return Err(StoreError::Backend("connection refused".to_string()));
        }
        Ok(MockConnection { id })
    }

    async fn ensure_schema(&self, _conn: &mut MockConnection) -> Result<(), StoreError> {
        self.counters.schema_calls.fetch_add(1, Ordering::SeqCst);
        if self.config.fail_schema {
            return Err(StoreError::Backend("permission denied".to_string()));
        }
        *self.table_created.lock().unwrap() = true;
        Ok(())
    }

    async fn insert_record(
        &self,
        _conn: &mut MockConnection,
        record: &PredictionRecord,
    ) -> Result<RecordId, StoreError> {
        self.counters.inserts.fetch_add(1, Ordering::SeqCst);
        if self.config.fail_insert {
            return Err(StoreError::Backend("value too long".to_string()));
        }
        let mut rows = self.rows.lock().unwrap();
        let id = RecordId::try_from(rows.len() + 1).unwrap_or(RecordId::MAX);
        rows.push((id, record.clone()));
        Ok(id)
    }

    async fn release(&self, _conn: MockConnection) {
        self.counters.releases.fetch_add(1, Ordering::SeqCst);
    }
}
