//! Credit Scoring API - prediction service for the credit scoring dashboard
//!
//! Wraps a pre-trained classifier behind a small HTTP surface: records are
//! aligned to the model's feature schema, coerced to numbers and scored into
//! per-class probability vectors. The active model can be swapped at runtime.

pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{ActiveModel, ModelArtifact, ModelHandle, PredictionError, ScoringModel};
pub use error::ApiError;
pub use models::{ProbabilityVector, Record, RecordBatch};
pub use routes::{configure_app, AppState};
