use thiserror::Error;

/// Errors that deny a response for a single query
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeatureError {
    #[error("Invalid datetime: {0}")]
    InvalidInput(String),

    #[error("Missing feature: {0}")]
    MissingFeature(String),
}

pub type FeatureResult<T> = Result<T, FeatureError>;
