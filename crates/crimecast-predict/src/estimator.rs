//! Estimators and their serialized form

use serde::{Deserialize, Serialize};

use crate::EstimatorError;

/// Anything that maps a feature vector to P(positive class)
pub trait Estimator: Send + Sync {
    /// Estimator name/identifier
    fn name(&self) -> &str;

    fn predict(&self, features: &[f64]) -> Result<f64, EstimatorError>;
}

/// Serialized estimator, tagged by `kind`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EstimatorSpec {
    Logistic { coefficients: Vec<f64>, intercept: f64 },
    Linear { coefficients: Vec<f64>, intercept: f64 },
    Constant { probability: f64 },
}

impl EstimatorSpec {
    pub fn build(self, name: impl Into<String>) -> Box<dyn Estimator> {
        let name = name.into();
        match self {
            EstimatorSpec::Logistic {
                coefficients,
                intercept,
            } => Box::new(LogisticEstimator::new(name, coefficients, intercept)),
            EstimatorSpec::Linear {
                coefficients,
                intercept,
            } => Box::new(LinearEstimator::new(name, coefficients, intercept)),
            EstimatorSpec::Constant { probability } => {
                Box::new(ConstantEstimator::new(name, probability))
            }
        }
    }
}

fn affine(coefficients: &[f64], intercept: f64, features: &[f64]) -> Result<f64, EstimatorError> {
    if coefficients.len() != features.len() {
        return Err(EstimatorError::DimensionMismatch {
            expected: coefficients.len(),
            actual: features.len(),
        });
    }
    let score = coefficients
        .iter()
        .zip(features)
        .fold(intercept, |acc, (w, x)| acc + w * x);
    if score.is_finite() {
        Ok(score)
    } else {
        Err(EstimatorError::NonFinite(score))
    }
}

/// Logistic regression: sigmoid of the affine score
#[derive(Debug, Clone)]
pub struct LogisticEstimator {
    name: String,
    coefficients: Vec<f64>,
    intercept: f64,
}

impl LogisticEstimator {
    pub fn new(name: impl Into<String>, coefficients: Vec<f64>, intercept: f64) -> Self {
        Self {
            name: name.into(),
            coefficients,
            intercept,
        }
    }
}

impl Estimator for LogisticEstimator {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict(&self, features: &[f64]) -> Result<f64, EstimatorError> {
        let z = affine(&self.coefficients, self.intercept, features)?;
        Ok(1.0 / (1.0 + (-z).exp()))
    }
}

/// Linear regressor; output is the raw affine score
#[derive(Debug, Clone)]
pub struct LinearEstimator {
    name: String,
    coefficients: Vec<f64>,
    intercept: f64,
}

impl LinearEstimator {
    pub fn new(name: impl Into<String>, coefficients: Vec<f64>, intercept: f64) -> Self {
        Self {
            name: name.into(),
            coefficients,
            intercept,
        }
    }
}

impl Estimator for LinearEstimator {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict(&self, features: &[f64]) -> Result<f64, EstimatorError> {
        affine(&self.coefficients, self.intercept, features)
    }
}

/// Prior-only estimator
#[derive(Debug, Clone)]
pub struct ConstantEstimator {
    name: String,
    probability: f64,
}

impl ConstantEstimator {
    pub fn new(name: impl Into<String>, probability: f64) -> Self {
        Self {
            name: name.into(),
            probability,
        }
    }
}

impl Estimator for ConstantEstimator {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict(&self, _features: &[f64]) -> Result<f64, EstimatorError> {
        if self.probability.is_finite() {
            Ok(self.probability)
        } else {
            Err(EstimatorError::NonFinite(self.probability))
        }
    }
}
