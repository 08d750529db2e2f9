//! Weather resolution with caching and monthly fallback

use chrono::{NaiveDate, Utc};
use crimecast_core::{normalize_zip, WeatherObservation};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};

use crate::{
    monthly_fallback, CacheKey, CacheStatus, Geocoder, WeatherCache, WeatherProvider,
    WeatherResult,
};

/// Default bound on each geocoding / provider call
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(3);

/// Why the monthly fallback was used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    /// No geocoder or provider configured
    NotConfigured,
    NoCoordinates,
    /// Provider returned no row for the date
    NoData,
    /// Row present but temperature or precipitation missing
    MissingField,
    ProviderError,
    Timeout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherSource {
    Live,
    Fallback(FallbackReason),
}

/// A resolved observation and where it came from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherReading {
    pub observation: WeatherObservation,
    pub source: WeatherSource,
}

impl WeatherReading {
    pub fn live(observation: WeatherObservation) -> Self {
        Self {
            observation,
            source: WeatherSource::Live,
        }
    }

    pub fn fallback(month: u32, reason: FallbackReason) -> Self {
        Self {
            observation: monthly_fallback(month),
            source: WeatherSource::Fallback(reason),
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self.source, WeatherSource::Fallback(_))
    }
}

/// Resolves weather for (ZIP, date) pairs.
///
/// Owns its cache exclusively; share the resolver behind an `Arc` to share
/// the cache across concurrent queries.
pub struct WeatherResolver {
    geocoder: Option<Arc<dyn Geocoder>>,
    provider: Option<Arc<dyn WeatherProvider>>,
    cache: WeatherCache,
    lookup_timeout: Duration,
}

impl WeatherResolver {
    pub fn new(geocoder: Arc<dyn Geocoder>, provider: Arc<dyn WeatherProvider>) -> Self {
        Self {
            geocoder: Some(geocoder),
            provider: Some(provider),
            cache: WeatherCache::new(),
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }

    /// Resolver with no live source; every lookup resolves to the monthly fallback
    pub fn offline() -> Self {
        Self {
            geocoder: None,
            provider: None,
            cache: WeatherCache::new(),
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, lookup_timeout: Duration) -> Self {
        self.lookup_timeout = lookup_timeout;
        self
    }

    pub fn is_live(&self) -> bool {
        self.geocoder.is_some() && self.provider.is_some()
    }

    pub fn cache(&self) -> &WeatherCache {
        &self.cache
    }

    /// Resolve the observation for `zip_code` on `date` (or for `month` when
    /// no date is given). Never fails.
    #[instrument(skip(self))]
    pub async fn resolve(&self, zip_code: &str, month: u32, date: Option<NaiveDate>) -> WeatherReading {
        let zip = normalize_zip(zip_code);
        let key = CacheKey::new(zip.clone(), date, month);

        let (reading, status) = self
            .cache
            .get_or_resolve(key, || self.fetch(&zip, month, date))
            .await;

        if status == CacheStatus::Hit {
            debug!(zip = %zip, month, ?date, source = ?reading.source, "weather cache hit");
        }
        reading
    }

    async fn fetch(&self, zip: &str, month: u32, date: Option<NaiveDate>) -> WeatherReading {
        match self.fetch_live(zip, date).await {
            Ok(observation) => {
                info!(
                    zip = %zip,
                    ?date,
                    tavg = observation.avg_temperature,
                    prcp = observation.precipitation,
                    "live weather resolved"
                );
                WeatherReading::live(observation)
            }
            Err(reason) => {
                let reading = WeatherReading::fallback(month, reason);
                warn!(
                    fallback = "weather",
                    zip = %zip,
                    month,
                    ?date,
                    ?reason,
                    tavg = reading.observation.avg_temperature,
                    prcp = reading.observation.precipitation,
                    "using monthly weather fallback"
                );
                reading
            }
        }
    }

    async fn fetch_live(
        &self,
        zip: &str,
        date: Option<NaiveDate>,
    ) -> Result<WeatherObservation, FallbackReason> {
        let (Some(geocoder), Some(provider)) = (&self.geocoder, &self.provider) else {
            return Err(FallbackReason::NotConfigured);
        };
        let date = date.unwrap_or_else(|| Utc::now().date_naive());

        let coords = self
            .bounded(geocoder.name(), geocoder.locate(zip))
            .await?
            .filter(|c| c.is_known())
            .ok_or(FallbackReason::NoCoordinates)?;

        debug!(
            zip = %zip,
            lat = coords.latitude,
            lon = coords.longitude,
            provider = provider.name(),
            %date,
            "fetching daily weather"
        );

        let row = self
            .bounded(provider.name(), provider.daily(coords, date))
            .await?
            .ok_or(FallbackReason::NoData)?;

        match (row.avg_temperature, row.precipitation) {
            (Some(tavg), Some(prcp)) if tavg.is_finite() && prcp.is_finite() => {
                Ok(WeatherObservation::new(tavg, prcp))
            }
            _ => Err(FallbackReason::MissingField),
        }
    }

    /// Apply the lookup timeout and fold errors into a fallback reason
    async fn bounded<T>(
        &self,
        source: &str,
        call: impl Future<Output = WeatherResult<T>>,
    ) -> Result<T, FallbackReason> {
        match timeout(self.lookup_timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                warn!(source, error = %e, "weather lookup failed");
                Err(FallbackReason::ProviderError)
            }
            Err(_) => {
                warn!(source, timeout_ms = self.lookup_timeout.as_millis() as u64, "weather lookup timed out");
                Err(FallbackReason::Timeout)
            }
        }
    }
}
