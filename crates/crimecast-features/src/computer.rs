//! FeatureComputer: calendar + weather + encoders -> named feature record

use crimecast_core::{
    CalendarFeatures, Fallback, FeatureRecord, FeatureResult, FeatureValue, Query, ZipInput,
};
use crimecast_encoders::{EncoderBundle, TemperatureCategory};
use crimecast_weather::{WeatherReading, WeatherResolver};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::feature_vector;

/// Features for one query plus the substitutions made while computing them
#[derive(Debug, Clone, Serialize)]
pub struct ComputedFeatures {
    pub record: FeatureRecord,
    /// One entry per fallback path taken, in pipeline order
    pub fallbacks: Vec<Fallback>,
    pub weather: WeatherReading,
}

impl ComputedFeatures {
    pub fn vector(&self) -> FeatureResult<Vec<f64>> {
        feature_vector(&self.record)
    }

    pub fn is_degraded(&self) -> bool {
        !self.fallbacks.is_empty()
    }
}

/// Builds feature records from queries.
///
/// Holds the shared read-only encoder bundle and the weather resolver; both
/// are constructed at startup and handed in. Cheap to clone.
#[derive(Clone)]
pub struct FeatureComputer {
    encoders: Arc<EncoderBundle>,
    weather: Arc<WeatherResolver>,
}

impl FeatureComputer {
    pub fn new(encoders: Arc<EncoderBundle>, weather: Arc<WeatherResolver>) -> Self {
        Self { encoders, weather }
    }

    pub fn encoders(&self) -> &EncoderBundle {
        &self.encoders
    }

    pub fn weather(&self) -> &WeatherResolver {
        &self.weather
    }

    /// Validate the raw inputs and compute the feature record.
    ///
    /// Fails only with [`crimecast_core::FeatureError::InvalidInput`] when
    /// `date` + `time` is not a valid timestamp. Missing external signals
    /// degrade to fallbacks instead.
    pub async fn compute_features(
        &self,
        zip_code: impl Into<ZipInput>,
        date: &str,
        time: &str,
    ) -> FeatureResult<ComputedFeatures> {
        let query = Query::parse(zip_code, date, time)?;
        Ok(self.compute(&query).await)
    }

    #[instrument(skip(self, query), fields(zip = %query.zip_code(), date = %query.date(), time = %query.time()))]
    pub async fn compute(&self, query: &Query) -> ComputedFeatures {
        let timestamp = query.timestamp();
        let calendar = CalendarFeatures::from_timestamp(timestamp);
        let zip = query.zip_code();
        let mut fallbacks = Vec::new();

        let weather = self
            .weather
            .resolve(zip, calendar.month, Some(timestamp.date()))
            .await;
        if weather.is_fallback() {
            fallbacks.push(Fallback::Weather);
        }
        let observation = weather.observation;

        let zip_freq = self.encoders.zip_frequency(zip);
        let season = self.encoders.encode_season(calendar.season);
        let temp_category = TemperatureCategory::from_temperature(observation.avg_temperature);
        let temp = self.encoders.encode_temperature(temp_category);
        let cluster = self.encoders.location_cluster(zip);
        fallbacks.extend(
            [season.fallback, temp.fallback, cluster.fallback]
                .into_iter()
                .flatten(),
        );

        let entries: [(&str, FeatureValue); 14] = [
            ("tavg", observation.avg_temperature.into()),
            ("prcp", observation.precipitation.into()),
            ("hour", calendar.hour.into()),
            ("day_of_week", calendar.day_of_week.into()),
            ("month", calendar.month.into()),
            ("is_weekend", calendar.is_weekend.into()),
            ("is_night", calendar.is_night.into()),
            ("is_rush_hour", calendar.is_rush_hour.into()),
            ("is_business_hours", calendar.is_business_hours.into()),
            ("ZCTA5_freq_encoded", zip_freq.into()),
            ("season_encoded", season.code.into()),
            ("temp_category_encoded", temp.code.into()),
            ("is_rainy", observation.is_rainy().into()),
            ("loc_cluster", cluster.code.into()),
        ];
        let values: HashMap<String, FeatureValue> = entries
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect();

        debug!(
            temp_category = %temp_category,
            season = ?calendar.season,
            fallbacks = fallbacks.len(),
            "features computed"
        );

        ComputedFeatures {
            record: FeatureRecord::new(query.date(), query.time(), zip, values),
            fallbacks,
            weather,
        }
    }
}
