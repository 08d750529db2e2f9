//! Risk prediction for crimecast
//!
//! Runs one estimator or a named ensemble over a feature vector, reduces
//! the outputs to a single probability and classifies it into a
//! confidence-gated [`crimecast_core::PredictionResult`].

pub mod aggregate;
pub mod classify;
pub mod estimator;
pub mod handle;
pub mod loader;

pub use aggregate::*;
pub use classify::*;
pub use estimator::*;
pub use handle::*;
pub use loader::*;

use thiserror::Error;

/// Failure of a single estimator invocation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EstimatorError {
    #[error("Expected {expected} features, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Non-finite output: {0}")]
    NonFinite(f64),
}

/// Failure to produce an aggregated probability
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictError {
    #[error("No estimator in the ensemble produced a prediction ({attempted} attempted)")]
    EnsembleExhausted { attempted: usize },

    #[error("Estimator '{name}' failed: {source}")]
    Estimator {
        name: String,
        #[source]
        source: EstimatorError,
    },

    #[error("Aggregated probability is not finite: {0}")]
    NonFinite(f64),
}

pub type PredictResult<T> = Result<T, PredictError>;

#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid model artifact: {0}")]
    InvalidSpec(String),
}
