use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use crimecast_core::{FeatureError, ZipInput};
use opentelemetry::metrics::{Counter, MeterProvider};
use opentelemetry::KeyValue;
use opentelemetry_prometheus::exporter;
use opentelemetry_sdk::metrics::SdkMeterProvider;
use prometheus::{Encoder, Registry, TextEncoder};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod pipeline;

pub use pipeline::{Pipeline, PredictionOutcome};

pub const MISSING_FIELDS: &str = "Expected JSON with fields: date, time, zip_code";

pub struct AppState {
    ready: AtomicBool,
    registry: Registry,
    #[allow(dead_code)]
    provider: SdkMeterProvider,
    requests_total: Counter<u64>,
    fallbacks_total: Counter<u64>,
    estimator_skips_total: Counter<u64>,
    prediction_errors_total: Counter<u64>,
    pipeline: Pipeline,
}

impl AppState {
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }
}

pub fn build_app(pipeline: Pipeline) -> Result<(Router, Arc<AppState>)> {
    // Prometheus exporter via OpenTelemetry
    let registry = Registry::new();
    let reader = exporter()
        .with_registry(registry.clone())
        .build()
        .context("failed to build prometheus exporter")?;
    let provider = SdkMeterProvider::builder().with_reader(reader).build();
    let meter = provider.meter("crimecast-server");

    let requests_total = meter
        .u64_counter("crimecast_requests_total")
        .with_description("Total API requests served")
        .init();
    let fallbacks_total = meter
        .u64_counter("crimecast_fallbacks_total")
        .with_description("Fallback substitutions made while computing features, by kind")
        .init();
    let estimator_skips_total = meter
        .u64_counter("crimecast_estimator_skips_total")
        .with_description("Ensemble members skipped during aggregation")
        .init();
    let prediction_errors_total = meter
        .u64_counter("crimecast_prediction_errors_total")
        .with_description("Responses whose prediction carries an error")
        .init();

    let state = Arc::new(AppState {
        ready: AtomicBool::new(false),
        registry,
        provider,
        requests_total,
        fallbacks_total,
        estimator_skips_total,
        prediction_errors_total,
        pipeline,
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let router = Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .route("/api/health", get(api_health))
        .route("/api/predict", post(predict))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(Arc::clone(&state));

    Ok((router, state))
}

pub fn set_ready(state: &Arc<AppState>, is_ready: bool) {
    state.ready.store(is_ready, Ordering::Relaxed);
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

async fn readyz(State(state): State<Arc<AppState>>) -> StatusCode {
    if state.ready.load(Ordering::Relaxed) {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

async fn metrics(
    State(state): State<Arc<AppState>>,
) -> (
    [(axum::http::header::HeaderName, axum::http::HeaderValue); 1],
    String,
) {
    let encoder = TextEncoder::new();
    let metric_families = state.registry.gather();
    let mut buf = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buf) {
        tracing::warn!(error=?e, "failed to encode metrics");
    }
    let body = String::from_utf8(buf).unwrap_or_default();
    let header = (
        header::CONTENT_TYPE,
        axum::http::HeaderValue::from_static("text/plain; version=0.0.4; charset=utf-8"),
    );
    ([header], body)
}

fn now() -> String {
    chrono::Local::now().naive_local().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

async fn api_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state
        .requests_total
        .add(1, &[KeyValue::new("route", "/api/health")]);
    Json(json!({"status": "healthy", "timestamp": now()}))
}

#[derive(Deserialize, Default)]
struct PredictRequest {
    date: Option<String>,
    time: Option<String>,
    zip_code: Option<ZipInput>,
}

impl PredictRequest {
    /// All three fields present and non-empty
    fn fields(&self) -> Option<(&str, &str, &ZipInput)> {
        let date = self.date.as_deref().filter(|s| !s.trim().is_empty())?;
        let time = self.time.as_deref().filter(|s| !s.trim().is_empty())?;
        let zip = self.zip_code.as_ref().filter(|z| match z {
            ZipInput::Text(s) => !s.trim().is_empty(),
            ZipInput::Integer(v) => *v != 0,
            ZipInput::Float(v) => *v != 0.0,
        })?;
        Some((date, time, zip))
    }
}

fn failure(status: StatusCode, error: impl Into<String>) -> Response {
    let body = json!({"success": false, "error": error.into()});
    (status, Json(body)).into_response()
}

async fn predict(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    state
        .requests_total
        .add(1, &[KeyValue::new("route", "/api/predict")]);

    let request: PredictRequest = serde_json::from_slice(&body).unwrap_or_default();
    let Some((date, time, zip)) = request.fields() else {
        return failure(StatusCode::BAD_REQUEST, MISSING_FIELDS);
    };
    tracing::info!(date, time, zip = ?zip, "/api/predict");

    let pipeline = state.pipeline();
    let features = match pipeline
        .features()
        .compute_features(zip.clone(), date, time)
        .await
    {
        Ok(features) => features,
        Err(e @ FeatureError::InvalidInput(_)) => {
            tracing::warn!(error = %e, "rejected query");
            return failure(StatusCode::BAD_REQUEST, e.to_string());
        }
        Err(e) => {
            tracing::error!(error = %e, "feature computation failed");
            return failure(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
        }
    };
    for fallback in &features.fallbacks {
        state
            .fallbacks_total
            .add(1, &[KeyValue::new("kind", fallback.as_str())]);
    }

    let vector = match features.vector() {
        Ok(vector) => vector,
        Err(e) => {
            tracing::error!(error = %e, "feature vector incomplete");
            return failure(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
        }
    };

    let outcome = pipeline.predict(&vector);
    if let Some(Ok(agg)) = &outcome.aggregation {
        state
            .estimator_skips_total
            .add(agg.skipped.len() as u64, &[]);
    }
    if outcome.result.error.is_some() {
        state.prediction_errors_total.add(1, &[]);
    }
    tracing::info!(
        city = %pipeline.city(),
        raw = ?outcome.result.raw_probability,
        category = %outcome.result.category,
        confidence = outcome.result.confidence,
        reliable = outcome.result.is_reliable,
        "model output"
    );

    let input: Value = json!({"date": date, "time": time, "zip_code": zip});
    let body = json!({
        "success": true,
        "input": input,
        "features": features.record,
        "feature_vector": vector,
        "prediction": outcome.result,
        "timestamp": now(),
    });
    (StatusCode::OK, Json(body)).into_response()
}
