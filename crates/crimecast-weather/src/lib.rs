//! Weather resolution for risk queries
//!
//! Resolves a daily temperature/precipitation observation for a
//! (ZIP, date) pair. Live data comes from a geocoder plus a daily weather
//! provider; whenever either is missing, slow, or returns nothing usable the
//! resolver substitutes the static monthly average. Resolution never fails.

pub mod cache;
pub mod fallback;
pub mod geocode;
#[cfg(feature = "http")]
pub mod open_meteo;
pub mod resolver;
#[cfg(feature = "http")]
pub mod zippopotam;

pub use cache::*;
pub use fallback::*;
pub use geocode::*;
#[cfg(feature = "http")]
pub use open_meteo::*;
pub use resolver::*;
#[cfg(feature = "http")]
pub use zippopotam::*;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Request error: {0}")]
    Request(String),

    #[error("Unexpected status: {0}")]
    Status(u16),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout waiting for weather data")]
    Timeout,
}

pub type WeatherResult<T> = Result<T, WeatherError>;

/// Latitude/longitude pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// False when either component is NaN or infinite
    pub fn is_known(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}

/// One day of provider data in °F / inches; either field may be missing
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DailyWeather {
    pub avg_temperature: Option<f64>,
    pub precipitation: Option<f64>,
}

/// Trait for ZIP -> coordinate lookups
#[async_trait::async_trait]
pub trait Geocoder: Send + Sync {
    /// Geocoder name/identifier
    fn name(&self) -> &str;

    /// Coordinates for a canonical ZIP, `None` when unknown
    async fn locate(&self, zip_code: &str) -> WeatherResult<Option<Coordinates>>;
}

/// Trait for daily historical weather sources
#[async_trait::async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Provider name/identifier
    fn name(&self) -> &str;

    /// Weather for exactly `date` at `at`, `None` when the source has no row
    async fn daily(&self, at: Coordinates, date: NaiveDate) -> WeatherResult<Option<DailyWeather>>;
}
