//! Confidence classification of an aggregated probability

use crimecast_core::{PredictionResult, RiskCategory};

use crate::{Aggregation, PredictError, PredictResult};

/// Confidence at or above which a prediction is reliable
pub const RELIABILITY_THRESHOLD: f64 = 0.7;
/// Lower edge of the Medium bucket (inclusive)
pub const MEDIUM_RISK_FROM: f64 = 0.33;
/// Upper edge of the Medium bucket (inclusive)
pub const MEDIUM_RISK_TO: f64 = 0.66;

pub const HIGHER_RISK_MESSAGE: &str =
    "Model is confident: higher risk period based on historical data.";
pub const LOWER_RISK_MESSAGE: &str =
    "Model is confident: lower risk period based on historical data.";
pub const UNCERTAIN_MESSAGE: &str =
    "Model is uncertain here; not enough historical data for a strong prediction.";
pub const UNAVAILABLE_MESSAGE: &str = "Prediction unavailable for this query.";

/// Reported for any aggregation failure other than an exhausted ensemble
pub const PREDICTION_FAILED: &str = "Model prediction failed";

/// Pure mapping from a probability to a [`PredictionResult`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfidenceClassifier;

impl ConfidenceClassifier {
    /// Distance from the decision boundary, in [0.5, 1]
    pub fn confidence(p: f64) -> f64 {
        p.max(1.0 - p)
    }

    pub fn category(p: f64) -> RiskCategory {
        if p < MEDIUM_RISK_FROM {
            RiskCategory::Low
        } else if p <= MEDIUM_RISK_TO {
            RiskCategory::Medium
        } else {
            RiskCategory::High
        }
    }

    pub fn classify(p: f64) -> PredictionResult {
        let confidence = Self::confidence(p);
        let is_reliable = confidence >= RELIABILITY_THRESHOLD;
        let message = match (is_reliable, p >= 0.5) {
            (true, true) => HIGHER_RISK_MESSAGE,
            (true, false) => LOWER_RISK_MESSAGE,
            (false, _) => UNCERTAIN_MESSAGE,
        };

        PredictionResult {
            raw_probability: Some(p),
            risk_probability: p,
            confidence,
            category: Self::category(p),
            is_reliable,
            message: message.to_string(),
            error: None,
        }
    }

    /// Result carrying `error` in place of a prediction
    pub fn failed(error: impl Into<String>) -> PredictionResult {
        PredictionResult {
            raw_probability: None,
            risk_probability: 0.0,
            confidence: 0.5,
            category: RiskCategory::Low,
            is_reliable: false,
            message: UNAVAILABLE_MESSAGE.to_string(),
            error: Some(error.into()),
        }
    }

    /// Classify an aggregation outcome, folding failures into the result
    pub fn from_outcome(outcome: &PredictResult<Aggregation>) -> PredictionResult {
        match outcome {
            Ok(agg) => Self::classify(agg.raw_probability),
            Err(e @ PredictError::EnsembleExhausted { .. }) => Self::failed(e.to_string()),
            Err(_) => Self::failed(PREDICTION_FAILED),
        }
    }
}
