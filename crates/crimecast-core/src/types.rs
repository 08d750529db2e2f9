//! Core data types for a single risk query

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::{parse_timestamp, FeatureResult, ZipInput};

/// Feature names in the exact order the estimators were trained on
pub const FEATURE_ORDER: [&str; 14] = [
    "tavg",
    "prcp",
    "hour",
    "day_of_week",
    "month",
    "is_weekend",
    "is_night",
    "is_rush_hour",
    "is_business_hours",
    "ZCTA5_freq_encoded",
    "season_encoded",
    "temp_category_encoded",
    "is_rainy",
    "loc_cluster",
];

/// Length of the estimator input vector
pub const FEATURE_COUNT: usize = FEATURE_ORDER.len();

/// A validated (postal code, date, time) query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    zip_code: String,
    date: String,
    time: String,
    timestamp: NaiveDateTime,
}

impl Query {
    /// Normalize the ZIP and parse `date` + `time`.
    ///
    /// Fails with [`crate::FeatureError::InvalidInput`] when the pair does not
    /// form a valid timestamp.
    pub fn parse(zip_code: impl Into<ZipInput>, date: &str, time: &str) -> FeatureResult<Self> {
        let timestamp = parse_timestamp(date, time)?;
        Ok(Self {
            zip_code: zip_code.into().normalize(),
            date: date.to_string(),
            time: time.to_string(),
            timestamp,
        })
    }

    /// Canonical 5-character ZIP
    pub fn zip_code(&self) -> &str {
        &self.zip_code
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn time(&self) -> &str {
        &self.time
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }
}

/// Daily weather for one location, in °F and inches
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherObservation {
    pub avg_temperature: f64,
    pub precipitation: f64,
}

impl WeatherObservation {
    /// Negative precipitation is clamped to zero
    pub fn new(avg_temperature: f64, precipitation: f64) -> Self {
        Self {
            avg_temperature,
            precipitation: precipitation.max(0.0),
        }
    }

    pub fn is_rainy(&self) -> bool {
        self.precipitation > 0.0
    }
}

/// A single feature value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Integer(i64),
    Float(f64),
}

impl FeatureValue {
    pub fn as_f64(&self) -> f64 {
        match self {
            FeatureValue::Integer(v) => *v as f64,
            FeatureValue::Float(v) => *v,
        }
    }
}

impl From<bool> for FeatureValue {
    fn from(v: bool) -> Self {
        FeatureValue::Integer(i64::from(v))
    }
}

impl From<u32> for FeatureValue {
    fn from(v: u32) -> Self {
        FeatureValue::Integer(i64::from(v))
    }
}

impl From<i64> for FeatureValue {
    fn from(v: i64) -> Self {
        FeatureValue::Integer(v)
    }
}

impl From<u64> for FeatureValue {
    fn from(v: u64) -> Self {
        FeatureValue::Integer(i64::try_from(v).unwrap_or(i64::MAX))
    }
}

impl From<f64> for FeatureValue {
    fn from(v: f64) -> Self {
        FeatureValue::Float(v)
    }
}

/// Named features for one query, with the inputs echoed back
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    date: String,
    time: String,
    zip_code: String,

    /// Feature name -> value
    #[serde(flatten)]
    values: HashMap<String, FeatureValue>,
}

impl FeatureRecord {
    pub fn new(
        date: impl Into<String>,
        time: impl Into<String>,
        zip_code: impl Into<String>,
        values: HashMap<String, FeatureValue>,
    ) -> Self {
        Self {
            date: date.into(),
            time: time.into(),
            zip_code: zip_code.into(),
            values,
        }
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn time(&self) -> &str {
        &self.time
    }

    pub fn zip_code(&self) -> &str {
        &self.zip_code
    }

    pub fn get(&self, name: &str) -> Option<FeatureValue> {
        self.values.get(name).copied()
    }

    pub fn values(&self) -> &HashMap<String, FeatureValue> {
        &self.values
    }
}

/// Substitutions made while computing features
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fallback {
    Weather,
    SeasonEncoding,
    TemperatureEncoding,
    LocationCluster,
}

impl Fallback {
    pub fn as_str(self) -> &'static str {
        match self {
            Fallback::Weather => "weather",
            Fallback::SeasonEncoding => "season_encoding",
            Fallback::TemperatureEncoding => "temperature_encoding",
            Fallback::LocationCluster => "location_cluster",
        }
    }
}

impl fmt::Display for Fallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Three-bucket risk category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskCategory {
    Low,
    Medium,
    High,
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskCategory::Low => "Low",
            RiskCategory::Medium => "Medium",
            RiskCategory::High => "High",
        };
        f.write_str(s)
    }
}

/// Calibrated outcome for one query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Aggregated estimator output; absent when prediction failed
    pub raw_probability: Option<f64>,
    pub risk_probability: f64,
    /// max(p, 1 - p)
    pub confidence: f64,
    pub category: RiskCategory,
    pub is_reliable: bool,
    pub message: String,
    pub error: Option<String>,
}
