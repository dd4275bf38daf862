//! Insurance charge prediction service.
//!
//! Accepts six applicant attributes over HTTP, predicts a charge with a
//! pre-trained linear model, stores the request and prediction in
//! PostgreSQL, and returns the rounded charge.
//!
//! # Pipeline
//!
//! ```text
//! POST /predict
//!   -> schema validation        (422 on bad input)
//!   -> model invocation         (shared read-only artifact)
//!   -> round to 2 decimals
//!   -> connect, insert, release (per request)
//!   -> {"message": "Data Added Successfully", "Predicted charges": 4500.12}
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`schema`]: Request validation
//! - [`model`]: Model artifact loading and inference
//! - [`store`]: PostgreSQL persistence
//! - [`pipeline`]: Per-request prediction pipeline
//! - [`api`]: HTTP API
//! - [`bootstrap`]: Startup sequence
//! - [`metrics`]: Prometheus metrics
//! - [`utils`]: Utility functions

pub mod api;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod metrics;
pub mod model;
pub mod pipeline;
pub mod schema;
pub mod store;
pub mod utils;

pub use config::Config;
pub use error::{AppError, Result};
