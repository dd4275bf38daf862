//! Application configuration loaded from environment variables.

use std::path::PathBuf;

use serde::Deserialize;

use crate::error::{AppError, Result};

/// File name of the model artifact when `MODEL_PATH` is not set.
pub const DEFAULT_MODEL_FILE: &str = "insurance_model.json";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Database ===
    /// Full connection string. Takes precedence over the discrete fields.
    #[serde(default)]
    pub database_url: Option<String>,

    /// Database host.
    #[serde(default)]
    pub db_host: Option<String>,

    /// Database name.
    #[serde(default)]
    pub db_name: Option<String>,

    /// Database user.
    #[serde(default)]
    pub db_user: Option<String>,

    /// Database password.
    #[serde(default)]
    pub db_password: Option<String>,

    /// Database port.
    #[serde(default)]
    pub db_port: Option<u16>,

    // === Model ===
    /// Model artifact path. Defaults to a file next to the executable.
    #[serde(default)]
    pub model_path: Option<PathBuf>,

    // === Server Configuration ===
    /// Bind address.
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log filter directive (trace, debug, info, warn, error or a full
    /// `EnvFilter` directive).
    #[serde(default = "default_log_level")]
    pub rust_log: String,

    /// Enable debug logging for this crate. Same as `--verbose`.
    #[serde(default)]
    pub verbose: bool,
}

/// Filter directive used for `--verbose` / `VERBOSE=true`.
pub const VERBOSE_FILTER: &str = "insurance_predict=debug,info";

/// Connection parameters handed to the persistence gateway.
///
/// Resolution into a concrete target happens on every connection attempt,
/// so a missing configuration fails each request rather than startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatabaseSettings {
    /// Full connection string.
    pub url: Option<String>,
    /// Database host.
    pub host: Option<String>,
    /// Database name.
    pub name: Option<String>,
    /// Database user.
    pub user: Option<String>,
    /// Database password.
    pub password: Option<String>,
    /// Database port.
    pub port: Option<u16>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Ok(envy::from_env()?)
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| Err(AppError::InvalidConfig(msg.to_string()));

        if self.port == 0 {
            return invalid("PORT must be non-zero");
        }

        if matches!(&self.database_url, Some(url) if url.trim().is_empty()) {
            return invalid("DATABASE_URL is set but empty");
        }

        if matches!(&self.model_path, Some(path) if path.as_os_str().is_empty()) {
            return invalid("MODEL_PATH is set but empty");
        }

        Ok(())
    }

    /// Tracing filter directive. `verbose` wins over `rust_log`.
    pub fn log_filter(&self) -> &str {
        if self.verbose {
            VERBOSE_FILTER
        } else {
            &self.rust_log
        }
    }

    /// Database connection settings.
    pub fn database(&self) -> DatabaseSettings {
        DatabaseSettings {
            url: self.database_url.clone(),
            host: self.db_host.clone(),
            name: self.db_name.clone(),
            user: self.db_user.clone(),
            password: self.db_password.clone(),
            port: self.db_port,
        }
    }

    /// Resolved model artifact path.
    pub fn model_path(&self) -> std::io::Result<PathBuf> {
        if let Some(path) = &self.model_path {
            return Ok(path.clone());
        }
        let exe = std::env::current_exe()?;
        let dir = exe.parent().map(PathBuf::from).unwrap_or_default();
        Ok(dir.join(DEFAULT_MODEL_FILE))
    }

    /// Socket address string for the HTTP listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
