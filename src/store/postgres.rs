//! PostgreSQL prediction store.

use std::fmt;
use std::str::FromStr;

use sqlx::postgres::PgConnectOptions;
use sqlx::{Connection, PgConnection, Row};
use tracing::{debug, error, instrument, warn};

use super::{PredictionRecord, PredictionStore, RecordId};
use crate::config::DatabaseSettings;
use crate::error::StoreError;

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_NAME: &str = "insurance_prediction";
const DEFAULT_USER: &str = "postgres";
const DEFAULT_PASSWORD: &str = "admin";
const DEFAULT_PORT: u16 = 5432;

const CREATE_TABLE_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS insu_predict (
        id SERIAL PRIMARY KEY,
        age INT,
        sex TEXT,
        bmi FLOAT,
        children INT,
        smoker TEXT,
        region TEXT,
        predictions FLOAT
    )
"#;

const INSERT_SQL: &str = r#"
    INSERT INTO insu_predict (age, sex, bmi, children, smoker, region, predictions)
    VALUES ($1, $2, $3, $4, $5, $6, $7)
    RETURNING id
"#;

/// Where to connect, resolved from [`DatabaseSettings`].
#[derive(Clone, PartialEq, Eq)]
pub enum ConnectTarget {
    /// Full connection string.
    Dsn(String),
    /// Discrete parameters with defaults filled in.
    Discrete {
        /// Host.
        host: String,
        /// Port.
        port: u16,
        /// User.
        user: String,
        /// Password.
        password: String,
        /// Database name.
        database: String,
    },
}

impl ConnectTarget {
    /// Resolve settings into a target.
    ///
    /// A DSN wins. Otherwise any discrete field selects discrete mode with
    /// defaults for the rest. With neither, the configuration is missing.
    pub fn resolve(settings: &DatabaseSettings) -> Result<Self, StoreError> {
        if let Some(url) = settings.url.as_deref().filter(|u| !u.trim().is_empty()) {
            return Ok(Self::Dsn(url.to_string()));
        }

        let any_discrete = settings.host.is_some()
            || settings.name.is_some()
            || settings.user.is_some()
            || settings.password.is_some()
            || settings.port.is_some();
        if !any_discrete {
            return Err(StoreError::Config(
                "DATABASE_URL is not set in the environment.".to_string(),
            ));
        }

        Ok(Self::Discrete {
            host: settings.host.clone().unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: settings.port.unwrap_or(DEFAULT_PORT),
            user: settings.user.clone().unwrap_or_else(|| DEFAULT_USER.to_string()),
            password: settings
                .password
                .clone()
                .unwrap_or_else(|| DEFAULT_PASSWORD.to_string()),
            database: settings.name.clone().unwrap_or_else(|| DEFAULT_NAME.to_string()),
        })
    }

    /// Driver connect options.
    pub fn options(&self) -> Result<PgConnectOptions, StoreError> {
        match self {
            Self::Dsn(url) => PgConnectOptions::from_str(url).map_err(StoreError::Connect),
            Self::Discrete {
                host,
                port,
                user,
                password,
                database,
            } => Ok(PgConnectOptions::new()
                .host(host)
                .port(*port)
                .username(user)
                .password(password)
                .database(database)),
        }
    }
}

// Keeps credentials out of logs.
impl fmt::Debug for ConnectTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for ConnectTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Rebuilt from parsed options so no part of the raw string leaks.
            Self::Dsn(url) => match PgConnectOptions::from_str(url) {
                Ok(opts) => write!(
                    f,
                    "postgres://{}:***@{}:{}/{}",
                    opts.get_username(),
                    opts.get_host(),
                    opts.get_port(),
                    opts.get_database().unwrap_or_default()
                ),
                Err(_) => f.write_str("<unparseable DATABASE_URL>"),
            },
            Self::Discrete {
                host,
                port,
                user,
                database,
                ..
            } => write!(f, "postgres://{user}:***@{host}:{port}/{database}"),
        }
    }
}

/// PostgreSQL-backed store. Opens a fresh connection per operation.
#[derive(Debug, Clone)]
pub struct PgPredictionStore {
    settings: DatabaseSettings,
}

impl PgPredictionStore {
    /// Create a store over the given settings.
    pub fn new(settings: DatabaseSettings) -> Self {
        Self { settings }
    }
}

impl PredictionStore for PgPredictionStore {
    type Connection = PgConnection;

    #[instrument(skip(self))]
    async fn connect(&self) -> Result<PgConnection, StoreError> {
        let target = ConnectTarget::resolve(&self.settings).inspect_err(|e| {
            error!("Database configuration error: {}", e);
        })?;
        let options = target.options()?;
        debug!(db = %target, "Opening database connection");

        PgConnection::connect_with(&options).await.map_err(|e| {
            error!("Database connection error: {}", e);
            StoreError::Connect(e)
        })
    }

    #[instrument(skip_all)]
    async fn ensure_schema(&self, conn: &mut PgConnection) -> Result<(), StoreError> {
        sqlx::query(CREATE_TABLE_SQL)
            .execute(&mut *conn)
            .await
            .map_err(|e| {
                error!("Table creation error: {}", e);
                StoreError::Schema(e)
            })?;
        Ok(())
    }

    #[instrument(skip_all, fields(age = record.age, region = %record.region))]
    async fn insert_record(
        &self,
        conn: &mut PgConnection,
        record: &PredictionRecord,
    ) -> Result<RecordId, StoreError> {
        let insert_err = |e: sqlx::Error| {
            error!("Prediction insert error: {}", e);
            StoreError::Insert(e)
        };

        let mut tx = conn.begin().await.map_err(insert_err)?;
        let row = sqlx::query(INSERT_SQL)
            .bind(record.age)
            .bind(record.sex.to_string())
            .bind(record.bmi)
            .bind(record.children)
            .bind(record.smoker.to_string())
            .bind(record.region.to_string())
            .bind(record.predictions)
            .fetch_one(&mut *tx)
            .await
            .map_err(insert_err)?;
        // Decoded before commit so a mismatched id column rolls the row back.
        let id: RecordId = row.try_get("id").map_err(insert_err)?;
        tx.commit().await.map_err(insert_err)?;

        Ok(id)
    }

    async fn release(&self, conn: PgConnection) {
        if let Err(e) = conn.close().await {
            warn!("Failed to close database connection: {}", e);
        }
    }
}
