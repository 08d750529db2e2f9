use crimecast_core::{FeatureError, FeatureRecord, FeatureResult, FEATURE_ORDER};

/// Serialize a record into the estimator input vector, in training order.
///
/// Fails with [`FeatureError::MissingFeature`] naming the first absent field.
pub fn feature_vector(record: &FeatureRecord) -> FeatureResult<Vec<f64>> {
    FEATURE_ORDER
        .iter()
        .map(|name| {
            record
                .get(name)
                .map(|value| value.as_f64())
                .ok_or_else(|| FeatureError::MissingFeature(name.to_string()))
        })
        .collect()
}
