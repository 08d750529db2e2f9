use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::{ModelHandle, ModelLoadError};

pub const MODEL_FILE: &str = "ensemble_models.json";

/// Load `{models_dir}/{city}/ensemble_models.json`.
///
/// Returns `Ok(None)` when the file does not exist.
pub fn load_city_model(
    models_dir: impl AsRef<Path>,
    city: &str,
) -> Result<Option<ModelHandle>, ModelLoadError> {
    let path = models_dir.as_ref().join(city).join(MODEL_FILE);
    if !path.exists() {
        warn!(city, path = %path.display(), "model artifact not found");
        return Ok(None);
    }

    let raw = fs::read_to_string(&path)?;
    let handle = ModelHandle::from_json(serde_json::from_str(&raw)?)?;

    if handle.usable() < handle.len() {
        warn!(
            city,
            members = handle.len(),
            usable = handle.usable(),
            "model artifact contains members without a prediction capability"
        );
    }
    info!(city, path = %path.display(), members = handle.len(), "model loaded");
    Ok(Some(handle))
}

/// Message reported in place of a prediction when no model is loaded
pub fn model_not_loaded(city: &str) -> String {
    format!("Model for city '{}' not loaded", city)
}
