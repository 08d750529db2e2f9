//! Ensemble aggregation
//!
//! A single estimator's output is used directly. For an ensemble every
//! member is invoked; members that fail or cannot predict are skipped and
//! recorded, and the result is the arithmetic mean of the rest.

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::{ModelHandle, ModelMember, PredictError, PredictResult};

/// Output of one estimator that took part in the aggregate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Contribution {
    pub name: String,
    pub probability: f64,
}

/// An ensemble member left out of the aggregate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Skip {
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregation {
    /// In [0, 1]
    pub raw_probability: f64,
    pub contributions: Vec<Contribution>,
    pub skipped: Vec<Skip>,
}

/// Reduces estimator outputs to one probability. Cheap to clone.
#[derive(Debug, Clone)]
pub struct EnsembleAggregator {
    model: Arc<ModelHandle>,
}

impl EnsembleAggregator {
    pub fn new(model: Arc<ModelHandle>) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &ModelHandle {
        &self.model
    }

    #[instrument(skip_all, fields(members = self.model.len()))]
    pub fn aggregate(&self, features: &[f64]) -> PredictResult<Aggregation> {
        let (mean, contributions, skipped) = match self.model.as_ref() {
            ModelHandle::Single(member) => {
                let contribution = predict_single(member, features)?;
                (contribution.probability, vec![contribution], Vec::new())
            }
            ModelHandle::Ensemble(members) => {
                let mut contributions = Vec::with_capacity(members.len());
                let mut skipped = Vec::new();
                for (name, member) in members {
                    match invoke(member, features) {
                        Ok(probability) => {
                            debug!(estimator = %name, probability, "estimator prediction");
                            contributions.push(Contribution {
                                name: name.clone(),
                                probability,
                            });
                        }
                        Err(reason) => {
                            warn!(estimator = %name, reason = %reason, "skipping estimator");
                            skipped.push(Skip {
                                name: name.clone(),
                                reason,
                            });
                        }
                    }
                }
                if contributions.is_empty() {
                    return Err(PredictError::EnsembleExhausted {
                        attempted: members.len(),
                    });
                }
                let mean = contributions.iter().map(|c| c.probability).sum::<f64>()
                    / contributions.len() as f64;
                (mean, contributions, skipped)
            }
        };

        let raw_probability = bound(mean)?;
        info!(
            raw_probability,
            contributed = contributions.len(),
            skipped = skipped.len(),
            "aggregated prediction"
        );
        Ok(Aggregation {
            raw_probability,
            contributions,
            skipped,
        })
    }
}

fn predict_single(member: &ModelMember, features: &[f64]) -> PredictResult<Contribution> {
    match member {
        ModelMember::Usable(estimator) => {
            let probability =
                estimator
                    .predict(features)
                    .map_err(|source| PredictError::Estimator {
                        name: estimator.name().to_string(),
                        source,
                    })?;
            Ok(Contribution {
                name: estimator.name().to_string(),
                probability,
            })
        }
        ModelMember::Unusable { .. } => Err(PredictError::EnsembleExhausted { attempted: 1 }),
    }
}

/// Run one ensemble member, folding every failure into a skip reason
fn invoke(member: &ModelMember, features: &[f64]) -> Result<f64, String> {
    match member {
        ModelMember::Usable(estimator) => match estimator.predict(features) {
            Ok(p) if p.is_finite() => Ok(p),
            Ok(p) => Err(format!("non-finite output {}", p)),
            Err(e) => Err(e.to_string()),
        },
        ModelMember::Unusable { reason } => Err(format!("no prediction capability: {}", reason)),
    }
}

/// Clamp into [0, 1]; NaN and infinities are errors
fn bound(p: f64) -> PredictResult<f64> {
    if !p.is_finite() {
        return Err(PredictError::NonFinite(p));
    }
    let clamped = p.clamp(0.0, 1.0);
    if clamped != p {
        warn!(raw = p, clamped, "aggregated probability outside [0, 1]");
    }
    Ok(clamped)
}
