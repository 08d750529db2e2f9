//! Categorical encodings with observable fallbacks

use crimecast_core::{Fallback, Season};
use std::fmt;
use tracing::warn;

use crate::{EncoderBundle, LocationCluster};

/// Temperature bucket of a daily average in °F
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemperatureCategory {
    Cold,
    Cool,
    Warm,
    Hot,
}

impl TemperatureCategory {
    /// <=40 Cold, <=60 Cool, <=80 Warm, else Hot
    pub fn from_temperature(tavg: f64) -> Self {
        if tavg <= 40.0 {
            TemperatureCategory::Cold
        } else if tavg <= 60.0 {
            TemperatureCategory::Cool
        } else if tavg <= 80.0 {
            TemperatureCategory::Warm
        } else {
            TemperatureCategory::Hot
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TemperatureCategory::Cold => "Cold",
            TemperatureCategory::Cool => "Cool",
            TemperatureCategory::Warm => "Warm",
            TemperatureCategory::Hot => "Hot",
        }
    }

    /// Code used when the trained encoder is unavailable
    pub fn fallback_code(self) -> i64 {
        match self {
            TemperatureCategory::Cold => 0,
            TemperatureCategory::Cool => 1,
            TemperatureCategory::Warm => 2,
            TemperatureCategory::Hot => 3,
        }
    }
}

impl fmt::Display for TemperatureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An encoded value and, if one was substituted, which fallback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Encoded {
    pub code: i64,
    pub fallback: Option<Fallback>,
}

impl Encoded {
    fn trained(code: i64) -> Self {
        Self {
            code,
            fallback: None,
        }
    }

    fn substituted(code: i64, fallback: Fallback) -> Self {
        Self {
            code,
            fallback: Some(fallback),
        }
    }
}

impl EncoderBundle {
    /// Trained season code, else `season index - 1` clamped to [0, 3]
    pub fn encode_season(&self, season: Season) -> Encoded {
        let fallback_code = (i64::from(season.index()) - 1).clamp(0, 3);
        let label = season.label();

        let Some(encoder) = self.season_encoder() else {
            warn!(fallback = "season_encoding", season = %label, "season encoder not loaded");
            return Encoded::substituted(fallback_code, Fallback::SeasonEncoding);
        };
        match encoder.transform(&label) {
            Ok(code) => Encoded::trained(code),
            Err(e) => {
                warn!(fallback = "season_encoding", season = %label, error = %e, "season encoding failed");
                Encoded::substituted(fallback_code, Fallback::SeasonEncoding)
            }
        }
    }

    /// Trained temperature-category code, else the fixed Cold..Hot = 0..3 mapping
    pub fn encode_temperature(&self, category: TemperatureCategory) -> Encoded {
        let Some(encoder) = self.temp_encoder() else {
            warn!(fallback = "temperature_encoding", category = %category, "temperature encoder not loaded");
            return Encoded::substituted(category.fallback_code(), Fallback::TemperatureEncoding);
        };
        match encoder.transform(category.label()) {
            Ok(code) => Encoded::trained(code),
            Err(e) => {
                warn!(
                    fallback = "temperature_encoding",
                    category = %category,
                    error = %e,
                    "temperature category not in encoder classes"
                );
                Encoded::substituted(category.fallback_code(), Fallback::TemperatureEncoding)
            }
        }
    }

    /// Occurrence count of the ZIP in training data, 0 when unseen
    pub fn zip_frequency(&self, zip_code: &str) -> u64 {
        self.freq_map().get(zip_code).copied().unwrap_or(0)
    }

    /// Cluster model prediction when the ZIP has known coordinates, else suburban
    pub fn location_cluster(&self, zip_code: &str) -> Encoded {
        let fallback = Encoded::substituted(LocationCluster::Suburban.id(), Fallback::LocationCluster);

        let Some(model) = self.cluster_model() else {
            warn!(fallback = "location_cluster", zip = %zip_code, "cluster model not loaded");
            return fallback;
        };
        let Some(&(lat, lon)) = self.zip_coordinates().get(zip_code) else {
            warn!(fallback = "location_cluster", zip = %zip_code, "no coordinates for zip");
            return fallback;
        };
        match model.predict(lat, lon) {
            Ok(cluster) => Encoded::trained(cluster),
            Err(e) => {
                warn!(fallback = "location_cluster", zip = %zip_code, error = %e, "cluster prediction failed");
                fallback
            }
        }
    }
}
