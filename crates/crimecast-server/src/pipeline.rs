//! Startup wiring of the feature and prediction stages

use std::sync::Arc;

use anyhow::{Context, Result};
use crimecast_config::AppConfig;
use crimecast_core::PredictionResult;
use crimecast_encoders::EncoderBundle;
use crimecast_features::FeatureComputer;
use crimecast_predict::{
    load_city_model, model_not_loaded, Aggregation, ConfidenceClassifier, EnsembleAggregator,
    PredictResult,
};
use crimecast_weather::{
    Coordinates, Geocoder, LayeredGeocoder, OpenMeteoArchive, StaticGeocoder, WeatherResolver,
    ZippopotamGeocoder,
};

/// Everything a request needs, built once at startup and never reloaded
pub struct Pipeline {
    features: FeatureComputer,
    aggregator: Option<EnsembleAggregator>,
    city: String,
}

/// Prediction plus the aggregation it came from, when one ran
pub struct PredictionOutcome {
    pub result: PredictionResult,
    pub aggregation: Option<PredictResult<Aggregation>>,
}

impl Pipeline {
    pub fn new(
        features: FeatureComputer,
        aggregator: Option<EnsembleAggregator>,
        city: impl Into<String>,
    ) -> Self {
        Self {
            features,
            aggregator,
            city: city.into(),
        }
    }

    pub fn from_config(cfg: &AppConfig) -> Result<Self> {
        let encoders = Arc::new(EncoderBundle::load(cfg.encoders_dir()));
        let weather = if cfg.weather_enabled() {
            live_resolver(cfg, &encoders)?
        } else {
            tracing::info!("live weather disabled, using monthly averages");
            WeatherResolver::offline()
        };

        let city = cfg.city();
        let aggregator = match load_city_model(cfg.models_dir(), &city) {
            Ok(model) => model.map(|m| EnsembleAggregator::new(Arc::new(m))),
            Err(e) => {
                tracing::error!(city = %city, error = %e, "failed to load city model");
                None
            }
        };

        Ok(Self::new(
            FeatureComputer::new(encoders, Arc::new(weather)),
            aggregator,
            city,
        ))
    }

    pub fn features(&self) -> &FeatureComputer {
        &self.features
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn has_model(&self) -> bool {
        self.aggregator.is_some()
    }

    pub fn predict(&self, vector: &[f64]) -> PredictionOutcome {
        let Some(aggregator) = &self.aggregator else {
            return PredictionOutcome {
                result: ConfidenceClassifier::failed(model_not_loaded(&self.city)),
                aggregation: None,
            };
        };
        let outcome = aggregator.aggregate(vector);
        if let Err(e) = &outcome {
            tracing::error!(city = %self.city, error = %e, "model prediction error");
        }
        PredictionOutcome {
            result: ConfidenceClassifier::from_outcome(&outcome),
            aggregation: Some(outcome),
        }
    }
}

/// Static coordinate table first, then Zippopotam; Open-Meteo archive for the rows
fn live_resolver(cfg: &AppConfig, encoders: &EncoderBundle) -> Result<WeatherResolver> {
    let timeout = cfg.weather_timeout();
    let table = encoders
        .zip_coordinates()
        .iter()
        .map(|(zip, &(lat, lon))| (zip.clone(), Coordinates::new(lat, lon)))
        .collect();

    let remote = ZippopotamGeocoder::new(cfg.geocoder_url(), timeout)
        .context("failed to build geocoder client")?;
    let layers: Vec<Arc<dyn Geocoder>> = vec![
        Arc::new(StaticGeocoder::new(table)),
        Arc::new(remote),
    ];
    let archive = OpenMeteoArchive::new(cfg.archive_url(), timeout)
        .context("failed to build weather archive client")?;

    tracing::info!(
        geocoder = %cfg.geocoder_url(),
        archive = %cfg.archive_url(),
        timeout_ms = timeout.as_millis() as u64,
        "live weather enabled"
    );
    Ok(WeatherResolver::new(Arc::new(LayeredGeocoder::new(layers)), Arc::new(archive))
        .with_timeout(timeout))
}
