//! Location clustering (urban / suburban / rural)

use serde::{Deserialize, Serialize};

use crate::{EncoderError, EncoderResult};

/// Coarse location class. The discriminant is the training-time cluster id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationCluster {
    Urban = 0,
    Suburban = 1,
    Rural = 2,
}

impl LocationCluster {
    pub fn id(self) -> i64 {
        self as i64
    }
}

/// K-means model over (latitude, longitude); the cluster id is the index of
/// the nearest centroid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterModel {
    centroids: Vec<[f64; 2]>,
}

impl ClusterModel {
    pub fn new(centroids: Vec<[f64; 2]>) -> Self {
        Self { centroids }
    }

    pub fn predict(&self, latitude: f64, longitude: f64) -> EncoderResult<i64> {
        self.centroids
            .iter()
            .enumerate()
            .map(|(idx, c)| {
                let d_lat = c[0] - latitude;
                let d_lon = c[1] - longitude;
                (idx, d_lat * d_lat + d_lon * d_lon)
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(idx, _)| idx as i64)
            .ok_or(EncoderError::EmptyModel)
    }
}
