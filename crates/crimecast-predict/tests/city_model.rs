use crimecast_core::RiskCategory;
use crimecast_predict::{
    load_city_model, ConfidenceClassifier, EnsembleAggregator, PredictError, MODEL_FILE,
};
use std::fs;
use std::path::Path;
use std::sync::Arc;

fn write_model(root: &Path, city: &str, body: &str) {
    let dir = root.join(city);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(MODEL_FILE), body).unwrap();
}

#[test]
fn test_ensemble_artifact_end_to_end() {
    let root = tempfile::tempdir().unwrap();
    write_model(
        root.path(),
        "seattle",
        r#"{
            "models": {
                "prior": {"kind": "constant", "probability": 0.9},
                "lr": {"kind": "logistic", "coefficients": [0,0,0,0,0,0,0,0,0,0,0,0,0,0], "intercept": 0.0},
                "short": {"kind": "linear", "coefficients": [1.0, 2.0], "intercept": 0.0},
                "pipeline_step": {"kind": "standard_scaler"}
            }
        }"#,
    );

    let handle = load_city_model(root.path(), "seattle").unwrap().unwrap();
    let aggregator = EnsembleAggregator::new(Arc::new(handle));
    let outcome = aggregator.aggregate(&[1.0; 14]);

    let agg = outcome.as_ref().unwrap();
    // mean(0.9, 0.5); "short" has the wrong width, "pipeline_step" cannot predict
    assert!((agg.raw_probability - 0.7).abs() < 1e-12);
    assert_eq!(agg.skipped.len(), 2);

    let result = ConfidenceClassifier::from_outcome(&outcome);
    assert_eq!(result.category, RiskCategory::High);
    assert!(result.error.is_none());
}

#[test]
fn test_all_members_unusable() {
    let root = tempfile::tempdir().unwrap();
    write_model(
        root.path(),
        "seattle",
        r#"{"models": {"a": {"kind": "onehot"}, "b": {"note": "metadata"}}}"#,
    );

    let handle = load_city_model(root.path(), "seattle").unwrap().unwrap();
    let outcome = EnsembleAggregator::new(Arc::new(handle)).aggregate(&[0.0; 14]);
    assert_eq!(outcome, Err(PredictError::EnsembleExhausted { attempted: 2 }));

    let result = ConfidenceClassifier::from_outcome(&outcome);
    assert!(result.raw_probability.is_none());
    assert!(!result.is_reliable);
    assert!(result.error.is_some());
}

#[test]
fn test_other_city_not_loaded() {
    let root = tempfile::tempdir().unwrap();
    write_model(root.path(), "seattle", r#"{"kind": "constant", "probability": 0.1}"#);

    assert!(load_city_model(root.path(), "seattle").unwrap().is_some());
    assert!(load_city_model(root.path(), "chicago").unwrap().is_none());
}
