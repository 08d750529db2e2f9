//! In-process geocoders

use crimecast_core::normalize_zip;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::{Coordinates, Geocoder, WeatherResult};

/// Geocoder backed by a fixed ZIP -> coordinate table
#[derive(Debug, Clone, Default)]
pub struct StaticGeocoder {
    table: HashMap<String, Coordinates>,
}

impl StaticGeocoder {
    /// Keys are normalized on construction
    pub fn new(table: HashMap<String, Coordinates>) -> Self {
        let table = table
            .into_iter()
            .map(|(zip, coords)| (normalize_zip(zip), coords))
            .collect();
        Self { table }
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

#[async_trait::async_trait]
impl Geocoder for StaticGeocoder {
    fn name(&self) -> &str {
        "static"
    }

    async fn locate(&self, zip_code: &str) -> WeatherResult<Option<Coordinates>> {
        Ok(self.table.get(zip_code).copied())
    }
}

/// Tries each geocoder in order; the first known coordinate wins.
///
/// A failing layer is logged and skipped. The last error is returned only
/// when every layer failed.
pub struct LayeredGeocoder {
    layers: Vec<Arc<dyn Geocoder>>,
}

impl LayeredGeocoder {
    pub fn new(layers: Vec<Arc<dyn Geocoder>>) -> Self {
        Self { layers }
    }
}

#[async_trait::async_trait]
impl Geocoder for LayeredGeocoder {
    fn name(&self) -> &str {
        "layered"
    }

    async fn locate(&self, zip_code: &str) -> WeatherResult<Option<Coordinates>> {
        let mut last_err = None;
        let mut any_ok = false;
        for layer in &self.layers {
            match layer.locate(zip_code).await {
                Ok(Some(coords)) if coords.is_known() => return Ok(Some(coords)),
                Ok(_) => any_ok = true,
                Err(e) => {
                    debug!(layer = layer.name(), error = %e, "geocoder layer failed");
                    last_err = Some(e);
                }
            }
        }
        match last_err {
            Some(e) if !any_ok => Err(e),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WeatherError;

    struct Broken;

    #[async_trait::async_trait]
    impl Geocoder for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        async fn locate(&self, _zip_code: &str) -> WeatherResult<Option<Coordinates>> {
            Err(WeatherError::Timeout)
        }
    }

    fn table(zip: &str, lat: f64, lon: f64) -> Arc<StaticGeocoder> {
        let mut t = HashMap::new();
        t.insert(zip.to_string(), Coordinates::new(lat, lon));
        Arc::new(StaticGeocoder::new(t))
    }

    #[tokio::test]
    async fn test_static_keys_are_normalized() {
        let geo = table("2134", 42.35, -71.13);
        let hit = geo.locate("02134").await.unwrap();
        assert_eq!(hit, Some(Coordinates::new(42.35, -71.13)));
        assert_eq!(geo.locate("60601").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_layered_first_known_wins() {
        let layers: Vec<Arc<dyn Geocoder>> = vec![
            Arc::new(Broken),
            table("60601", f64::NAN, f64::NAN),
            table("60601", 41.88, -87.62),
        ];
        let geo = LayeredGeocoder::new(layers);
        let coords = geo.locate("60601").await.unwrap();
        assert_eq!(coords, Some(Coordinates::new(41.88, -87.62)));
    }

    #[tokio::test]
    async fn test_layered_all_failed() {
        let only_broken: Vec<Arc<dyn Geocoder>> = vec![Arc::new(Broken)];
        let geo = LayeredGeocoder::new(only_broken);
        assert!(geo.locate("60601").await.is_err());

        let layers: Vec<Arc<dyn Geocoder>> = vec![Arc::new(Broken), table("11111", 1.0, 1.0)];
        let geo = LayeredGeocoder::new(layers);
        assert_eq!(geo.locate("60601").await.unwrap(), None);
    }
}
