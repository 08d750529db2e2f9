//! Open-Meteo historical archive provider
//!
//! Requests one day of `temperature_2m_mean` (°C) and `precipitation_sum`
//! (mm) and converts to °F / inches.

use chrono::NaiveDate;
use crimecast_core::{celsius_to_fahrenheit, millimeters_to_inches};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

use crate::{Coordinates, DailyWeather, WeatherError, WeatherProvider, WeatherResult};

pub const OPEN_METEO_ARCHIVE_URL: &str = "https://archive-api.open-meteo.com/v1/archive";

pub struct OpenMeteoArchive {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ArchiveResponse {
    daily: Option<ArchiveDaily>,
}

#[derive(Debug, Deserialize)]
struct ArchiveDaily {
    #[serde(default)]
    time: Vec<String>,
    #[serde(default)]
    temperature_2m_mean: Vec<Option<f64>>,
    #[serde(default)]
    precipitation_sum: Vec<Option<f64>>,
}

impl OpenMeteoArchive {
    pub fn new(base_url: impl Into<String>, request_timeout: Duration) -> WeatherResult<Self> {
        let base_url = base_url.into();
        if base_url.is_empty() {
            return Err(WeatherError::InvalidResponse("empty archive url".into()));
        }
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| WeatherError::Request(e.to_string()))?;
        Ok(Self { client, base_url })
    }

    fn request_url(&self, at: Coordinates, date: NaiveDate) -> WeatherResult<Url> {
        let day = date.format("%Y-%m-%d").to_string();
        Url::parse_with_params(
            &self.base_url,
            &[
                ("latitude", at.latitude.to_string()),
                ("longitude", at.longitude.to_string()),
                ("start_date", day.clone()),
                ("end_date", day),
                (
                    "daily",
                    "temperature_2m_mean,precipitation_sum".to_string(),
                ),
                ("timezone", "auto".to_string()),
            ],
        )
        .map_err(|e| WeatherError::InvalidResponse(format!("bad archive url: {}", e)))
    }
}

/// Pick the row for `date` out of the daily block
fn row_for(daily: &ArchiveDaily, date: NaiveDate) -> Option<DailyWeather> {
    let day = date.format("%Y-%m-%d").to_string();
    let idx = daily.time.iter().position(|t| *t == day)?;
    let tavg = daily.temperature_2m_mean.get(idx).copied().flatten();
    let prcp = daily.precipitation_sum.get(idx).copied().flatten();
    Some(DailyWeather {
        avg_temperature: tavg.map(celsius_to_fahrenheit),
        precipitation: prcp.map(millimeters_to_inches),
    })
}

#[async_trait::async_trait]
impl WeatherProvider for OpenMeteoArchive {
    fn name(&self) -> &str {
        "open-meteo"
    }

    async fn daily(&self, at: Coordinates, date: NaiveDate) -> WeatherResult<Option<DailyWeather>> {
        let url = self.request_url(at, date)?;
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| WeatherError::Request(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(WeatherError::Status(resp.status().as_u16()));
        }
        let body: ArchiveResponse = resp
            .json()
            .await
            .map_err(|e| WeatherError::InvalidResponse(e.to_string()))?;
        Ok(body.daily.as_ref().and_then(|d| row_for(d, date)))
    }
}
