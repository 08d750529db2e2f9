//! Single-estimator vs. ensemble model handle

use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use crate::{Estimator, EstimatorSpec, ModelLoadError};

/// One named entry of an ensemble
pub enum ModelMember {
    Usable(Box<dyn Estimator>),
    /// Present in the artifact but without a prediction capability
    Unusable { reason: String },
}

impl ModelMember {
    pub fn is_usable(&self) -> bool {
        matches!(self, ModelMember::Usable(_))
    }
}

impl fmt::Debug for ModelMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelMember::Usable(estimator) => {
                f.debug_tuple("Usable").field(&estimator.name()).finish()
            }
            ModelMember::Unusable { reason } => {
                f.debug_struct("Unusable").field("reason", reason).finish()
            }
        }
    }
}

/// A loaded model: one estimator or a named collection of them.
///
/// Built once at startup and shared read-only.
#[derive(Debug)]
pub enum ModelHandle {
    Single(ModelMember),
    Ensemble(BTreeMap<String, ModelMember>),
}

impl ModelHandle {
    pub fn single(estimator: Box<dyn Estimator>) -> Self {
        ModelHandle::Single(ModelMember::Usable(estimator))
    }

    pub fn ensemble(members: impl IntoIterator<Item = (String, ModelMember)>) -> Self {
        ModelHandle::Ensemble(members.into_iter().collect())
    }

    /// Parse an artifact document.
    ///
    /// `{"models": {name: spec, ...}}` is an ensemble; members that do not
    /// parse are kept as [`ModelMember::Unusable`]. Anything else must be a
    /// single estimator spec.
    pub fn from_json(doc: Value) -> Result<Self, ModelLoadError> {
        match doc {
            Value::Object(mut obj) if obj.contains_key("models") => {
                let Some(Value::Object(models)) = obj.remove("models") else {
                    return Err(ModelLoadError::InvalidSpec(
                        "\"models\" must be an object".to_string(),
                    ));
                };
                let members = models.into_iter().map(|(name, spec)| {
                    let member = match serde_json::from_value::<EstimatorSpec>(spec) {
                        Ok(spec) => ModelMember::Usable(spec.build(name.clone())),
                        Err(e) => ModelMember::Unusable {
                            reason: e.to_string(),
                        },
                    };
                    (name, member)
                });
                Ok(Self::ensemble(members))
            }
            doc => {
                let spec: EstimatorSpec = serde_json::from_value(doc)
                    .map_err(|e| ModelLoadError::InvalidSpec(e.to_string()))?;
                Ok(Self::single(spec.build("model")))
            }
        }
    }

    /// Number of members, usable or not
    pub fn len(&self) -> usize {
        match self {
            ModelHandle::Single(_) => 1,
            ModelHandle::Ensemble(members) => members.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn usable(&self) -> usize {
        match self {
            ModelHandle::Single(member) => usize::from(member.is_usable()),
            ModelHandle::Ensemble(members) => members.values().filter(|m| m.is_usable()).count(),
        }
    }
}
