use chrono::NaiveDate;
use crimecast_core::{Fallback, ZipInput, FEATURE_ORDER};
use crimecast_encoders::EncoderBundle;
use crimecast_features::{feature_vector, FeatureComputer};
use crimecast_weather::{
    Coordinates, DailyWeather, StaticGeocoder, WeatherProvider, WeatherResolver, WeatherResult,
    WeatherSource,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Deserialize)]
struct Golden {
    cases: Vec<GoldenCase>,
}

#[derive(Deserialize)]
struct GoldenCase {
    name: String,
    zip_code: ZipInput,
    date: String,
    time: String,
    expected_zip: String,
    vector: Vec<f64>,
}

fn offline_computer() -> FeatureComputer {
    FeatureComputer::new(
        Arc::new(EncoderBundle::empty()),
        Arc::new(WeatherResolver::offline()),
    )
}

#[tokio::test]
async fn test_golden_offline_vectors() {
    let golden: Golden =
        serde_json::from_str(include_str!("../../../tests/golden/queries.json")).unwrap();
    assert!(!golden.cases.is_empty());

    let computer = offline_computer();
    for case in golden.cases {
        let features = computer
            .compute_features(case.zip_code, &case.date, &case.time)
            .await
            .unwrap_or_else(|e| panic!("{}: {}", case.name, e));

        assert_eq!(features.record.zip_code(), case.expected_zip, "{}", case.name);
        assert_eq!(features.vector().unwrap(), case.vector, "{}", case.name);
    }
}

#[tokio::test]
async fn test_feature_vector_snapshot() {
    let features = offline_computer()
        .compute_features("60601", "2025-06-15", "14:30:00")
        .await
        .unwrap();
    let vector = feature_vector(&features.record).unwrap();

    let rendered = FEATURE_ORDER
        .iter()
        .zip(&vector)
        .map(|(name, value)| format!("{name} = {value}"))
        .collect::<Vec<_>>()
        .join("\n");

    insta::assert_snapshot!(rendered, @r"
    tavg = 80
    prcp = 1.4
    hour = 14
    day_of_week = 6
    month = 6
    is_weekend = 1
    is_night = 0
    is_rush_hour = 0
    is_business_hours = 0
    ZCTA5_freq_encoded = 0
    season_encoded = 2
    temp_category_encoded = 2
    is_rainy = 1
    loc_cluster = 1
    ");
}

#[tokio::test]
async fn test_record_serializes_with_echoed_inputs() {
    let features = offline_computer()
        .compute_features(2134i64, "2025-01-08", "08:15:00")
        .await
        .unwrap();

    let json = serde_json::to_value(&features.record).unwrap();
    assert_eq!(json["zip_code"], "02134");
    assert_eq!(json["date"], "2025-01-08");
    assert_eq!(json["time"], "08:15:00");
    assert_eq!(json["tavg"], 32.0);
    assert_eq!(json["is_rush_hour"], 1);
    assert_eq!(json.as_object().unwrap().len(), 17);
}

/// Provider with one dry, cold day and a call counter
struct OneDayProvider {
    calls: AtomicUsize,
}

#[async_trait::async_trait]
impl WeatherProvider for OneDayProvider {
    fn name(&self) -> &str {
        "one-day"
    }

    async fn daily(&self, _at: Coordinates, date: NaiveDate) -> WeatherResult<Option<DailyWeather>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if date == NaiveDate::from_ymd_opt(2025, 6, 15).unwrap() {
            Ok(Some(DailyWeather {
                avg_temperature: Some(38.0),
                precipitation: Some(0.0),
            }))
        } else {
            Ok(None)
        }
    }
}

#[tokio::test]
async fn test_live_weather_flows_into_features() {
    let mut table = HashMap::new();
    table.insert("60601".to_string(), Coordinates::new(41.8858, -87.6181));
    let provider = Arc::new(OneDayProvider {
        calls: AtomicUsize::new(0),
    });
    let resolver = WeatherResolver::new(Arc::new(StaticGeocoder::new(table)), provider.clone());
    let computer = FeatureComputer::new(Arc::new(EncoderBundle::empty()), Arc::new(resolver));

    let live = computer
        .compute_features("60601", "2025-06-15", "14:30:00")
        .await
        .unwrap();
    assert_eq!(live.weather.source, WeatherSource::Live);
    assert!(!live.fallbacks.contains(&Fallback::Weather));
    assert_eq!(live.record.get("tavg").unwrap().as_f64(), 38.0);
    assert_eq!(live.record.get("is_rainy").unwrap().as_f64(), 0.0);
    // 38°F is Cold
    assert_eq!(live.record.get("temp_category_encoded").unwrap().as_f64(), 0.0);

    // Same key again: served from the cache
    computer
        .compute_features("60601", "2025-06-15", "23:00:00")
        .await
        .unwrap();
    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);

    let missing = computer
        .compute_features("60601", "2025-06-16", "14:30:00")
        .await
        .unwrap();
    assert!(missing.weather.is_fallback());
    assert_eq!(missing.fallbacks[0], Fallback::Weather);
    assert_eq!(missing.record.get("tavg").unwrap().as_f64(), 80.0);
}
