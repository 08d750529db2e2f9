use std::fs;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use crimecast_config::AppConfig;
use crimecast_encoders::EncoderBundle;
use crimecast_features::FeatureComputer;
use crimecast_predict::{
    ConstantEstimator, EnsembleAggregator, ModelHandle, ModelMember, MODEL_FILE,
};
use crimecast_server::{build_app, Pipeline, MISSING_FIELDS};
use crimecast_weather::WeatherResolver;
use serde_json::{json, Value};
use tower::ServiceExt;

fn offline_features() -> FeatureComputer {
    FeatureComputer::new(
        Arc::new(EncoderBundle::empty()),
        Arc::new(WeatherResolver::offline()),
    )
}

fn app_with(model: Option<ModelHandle>) -> Router {
    let aggregator = model.map(|m| EnsembleAggregator::new(Arc::new(m)));
    let (app, _state) = build_app(Pipeline::new(offline_features(), aggregator, "seattle")).unwrap();
    app
}

async fn post_predict(app: &Router, body: Value) -> (StatusCode, Value) {
    let res = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/predict")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn predict_with_single_model() {
    let model = ModelHandle::single(Box::new(ConstantEstimator::new("prior", 0.9)));
    let app = app_with(Some(model));

    let (status, body) = post_predict(
        &app,
        json!({"date": "2025-06-15", "time": "14:30:00", "zip_code": "60601"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["input"]["zip_code"], "60601");
    assert_eq!(body["features"]["zip_code"], "60601");
    assert_eq!(body["features"]["tavg"], 80.0);
    assert_eq!(body["features"]["is_weekend"], 1);
    assert_eq!(body["feature_vector"].as_array().unwrap().len(), 14);

    let prediction = &body["prediction"];
    assert_eq!(prediction["raw_probability"], 0.9);
    assert_eq!(prediction["category"], "High");
    assert_eq!(prediction["is_reliable"], true);
    assert!(prediction["message"].as_str().unwrap().contains("higher risk"));
    assert!(prediction["error"].is_null());
}

#[tokio::test]
async fn predict_with_partial_ensemble() {
    let model = ModelHandle::ensemble([
        (
            "a".to_string(),
            ModelMember::Usable(Box::new(ConstantEstimator::new("a", 0.2))),
        ),
        (
            "b".to_string(),
            ModelMember::Unusable {
                reason: "not an estimator".to_string(),
            },
        ),
        (
            "c".to_string(),
            ModelMember::Usable(Box::new(ConstantEstimator::new("c", 0.6))),
        ),
    ]);
    let app = app_with(Some(model));

    let (status, body) = post_predict(
        &app,
        json!({"date": "2025-01-08", "time": "08:15", "zip_code": 2134}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["input"]["zip_code"], 2134);
    assert_eq!(body["features"]["zip_code"], "02134");
    let raw = body["prediction"]["raw_probability"].as_f64().unwrap();
    assert!((raw - 0.4).abs() < 1e-9);
    assert_eq!(body["prediction"]["category"], "Medium");
    assert_eq!(body["prediction"]["is_reliable"], false);
}

#[tokio::test]
async fn predict_without_model_still_returns_features() {
    let app = app_with(None);

    let (status, body) = post_predict(
        &app,
        json!({"date": "2025-06-15", "time": "14:30:00", "zip_code": 60601}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["feature_vector"][0], 80.0);
    assert!(body["prediction"]["raw_probability"].is_null());
    assert_eq!(
        body["prediction"]["error"],
        "Model for city 'seattle' not loaded"
    );
}

#[tokio::test]
async fn predict_exhausted_ensemble_reports_error() {
    let model = ModelHandle::ensemble([(
        "scaler".to_string(),
        ModelMember::Unusable {
            reason: "no kind".to_string(),
        },
    )]);
    let app = app_with(Some(model));

    let (status, body) = post_predict(
        &app,
        json!({"date": "2025-06-15", "time": "14:30:00", "zip_code": "60601"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["features"]["month"], 6);
    assert!(body["prediction"]["error"]
        .as_str()
        .unwrap()
        .contains("No estimator"));
}

#[tokio::test]
async fn predict_rejects_missing_fields() {
    let app = app_with(None);

    for request in [
        json!({"date": "2025-06-15", "time": "14:30:00"}),
        json!({"date": "", "time": "14:30:00", "zip_code": "60601"}),
        json!({}),
        json!(null),
    ] {
        let (status, body) = post_predict(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], MISSING_FIELDS);
    }
}

#[tokio::test]
async fn predict_rejects_invalid_datetime() {
    let app = app_with(None);

    let (status, body) = post_predict(
        &app,
        json!({"date": "2025-13-01", "time": "14:30:00", "zip_code": "60601"}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("Invalid datetime"));
}

#[tokio::test]
async fn pipeline_from_config_files() {
    let root = tempfile::tempdir().unwrap();
    let encoders = root.path().join("encoders");
    let models = root.path().join("cities");
    fs::create_dir_all(&encoders).unwrap();
    fs::create_dir_all(models.join("seattle")).unwrap();
    fs::write(encoders.join("freq_map.json"), r#"{"98101": 77}"#).unwrap();
    fs::write(
        models.join("seattle").join(MODEL_FILE),
        r#"{"kind": "constant", "probability": 0.1}"#,
    )
    .unwrap();

    let config_path = root.path().join("config.toml");
    fs::write(
        &config_path,
        format!(
            "[artifacts]\nencoders_dir = {:?}\nmodels_dir = {:?}\n\n[weather]\nenabled = false\n",
            encoders.display().to_string(),
            models.display().to_string()
        ),
    )
    .unwrap();

    let cfg = AppConfig::load_from(&config_path).unwrap();
    let pipeline = Pipeline::from_config(&cfg).unwrap();
    assert!(pipeline.has_model());
    assert!(!pipeline.features().weather().is_live());

    let (app, _state) = build_app(pipeline).unwrap();
    let (status, body) = post_predict(
        &app,
        json!({"date": "2025-10-03", "time": "22:05:00", "zip_code": "98101-1234"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["features"]["ZCTA5_freq_encoded"], 77);
    assert_eq!(body["prediction"]["category"], "Low");
    assert!(body["prediction"]["message"]
        .as_str()
        .unwrap()
        .contains("lower risk"));
}
