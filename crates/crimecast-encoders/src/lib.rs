//! Pre-trained categorical encoders
//!
//! The [`EncoderBundle`] is loaded once at startup and shared read-only by
//! every query. Any artifact may be missing; each encoding then substitutes
//! a fixed mapping and reports the substitution.

pub mod bundle;
pub mod cluster;
pub mod encode;
pub mod label;

pub use bundle::*;
pub use cluster::*;
pub use encode::*;
pub use label::*;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EncoderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid artifact: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Label '{0}' not in encoder classes")]
    UnknownLabel(String),

    #[error("Cluster model has no centroids")]
    EmptyModel,
}

pub type EncoderResult<T> = Result<T, EncoderError>;
