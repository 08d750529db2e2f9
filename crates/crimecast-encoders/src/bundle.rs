//! Encoder bundle and artifact loading
//!
//! Lifecycle: built once during startup with [`EncoderBundle::load`] (or the
//! builder methods in tests), then wrapped in an `Arc` and never mutated.
//! Reloading requires a restart.

use crimecast_core::normalize_zip;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::{ClusterModel, EncoderResult, LabelEncoder};

pub const SEASON_ENCODER_FILE: &str = "season_label_encoder.json";
pub const TEMP_ENCODER_FILE: &str = "temp_label_encoder.json";
pub const FREQ_MAP_FILE: &str = "freq_map.json";
pub const CLUSTER_MODEL_FILE: &str = "loc_cluster_model.json";
pub const ZIP_COORDINATES_FILE: &str = "zip_to_latlon.json";

#[derive(Debug, Clone, Default)]
pub struct EncoderBundle {
    season_encoder: Option<LabelEncoder>,
    temp_encoder: Option<LabelEncoder>,
    freq_map: HashMap<String, u64>,
    cluster_model: Option<ClusterModel>,
    zip_coordinates: HashMap<String, (f64, f64)>,
}

impl EncoderBundle {
    /// Bundle with no artifacts; every encoding uses its fallback
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load every artifact found in `dir`. Never fails: a missing artifact is
    /// skipped, an unreadable one is logged and skipped.
    pub fn load(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        let bundle = Self {
            season_encoder: load_artifact(dir, SEASON_ENCODER_FILE),
            temp_encoder: load_artifact(dir, TEMP_ENCODER_FILE),
            freq_map: normalize_keys(load_artifact(dir, FREQ_MAP_FILE).unwrap_or_default()),
            cluster_model: load_artifact(dir, CLUSTER_MODEL_FILE),
            zip_coordinates: normalize_keys(
                load_artifact(dir, ZIP_COORDINATES_FILE).unwrap_or_default(),
            ),
        };

        info!(
            dir = %dir.display(),
            season_encoder = bundle.season_encoder.is_some(),
            temp_encoder = bundle.temp_encoder.is_some(),
            freq_map = bundle.freq_map.len(),
            cluster_model = bundle.cluster_model.is_some(),
            zip_coordinates = bundle.zip_coordinates.len(),
            "encoder bundle loaded"
        );
        bundle
    }

    pub fn with_season_encoder(mut self, encoder: LabelEncoder) -> Self {
        self.season_encoder = Some(encoder);
        self
    }

    pub fn with_temp_encoder(mut self, encoder: LabelEncoder) -> Self {
        self.temp_encoder = Some(encoder);
        self
    }

    /// Keys are ZIP-normalized
    pub fn with_freq_map(mut self, freq_map: HashMap<String, u64>) -> Self {
        self.freq_map = normalize_keys(freq_map);
        self
    }

    pub fn with_cluster_model(mut self, model: ClusterModel) -> Self {
        self.cluster_model = Some(model);
        self
    }

    /// Keys are ZIP-normalized
    pub fn with_zip_coordinates(mut self, table: HashMap<String, (f64, f64)>) -> Self {
        self.zip_coordinates = normalize_keys(table);
        self
    }

    pub fn season_encoder(&self) -> Option<&LabelEncoder> {
        self.season_encoder.as_ref()
    }

    pub fn temp_encoder(&self) -> Option<&LabelEncoder> {
        self.temp_encoder.as_ref()
    }

    pub fn freq_map(&self) -> &HashMap<String, u64> {
        &self.freq_map
    }

    pub fn cluster_model(&self) -> Option<&ClusterModel> {
        self.cluster_model.as_ref()
    }

    /// Static ZIP -> (latitude, longitude) cache shipped with the encoders
    pub fn zip_coordinates(&self) -> &HashMap<String, (f64, f64)> {
        &self.zip_coordinates
    }
}

fn normalize_keys<V>(table: HashMap<String, V>) -> HashMap<String, V> {
    table
        .into_iter()
        .map(|(zip, value)| (normalize_zip(zip), value))
        .collect()
}

fn load_artifact<T: DeserializeOwned>(dir: &Path, name: &str) -> Option<T> {
    let path = dir.join(name);
    if !path.exists() {
        info!(artifact = name, path = %path.display(), "encoder artifact not found");
        return None;
    }
    match read_json(&path) {
        Ok(value) => {
            info!(artifact = name, path = %path.display(), "loaded encoder artifact");
            Some(value)
        }
        Err(e) => {
            warn!(artifact = name, path = %path.display(), error = %e, "could not load encoder artifact");
            None
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> EncoderResult<T> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}
