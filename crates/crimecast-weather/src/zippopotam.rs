//! Zippopotam.us ZIP geocoder

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

use crate::{Coordinates, Geocoder, WeatherError, WeatherResult};

pub const ZIPPOPOTAM_US_URL: &str = "https://api.zippopotam.us/us";

pub struct ZippopotamGeocoder {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct PostCodeResponse {
    #[serde(default)]
    places: Vec<Place>,
}

/// Coordinates arrive string-encoded
#[derive(Debug, Deserialize)]
struct Place {
    latitude: Option<String>,
    longitude: Option<String>,
}

impl ZippopotamGeocoder {
    pub fn new(base_url: impl Into<String>, request_timeout: Duration) -> WeatherResult<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(WeatherError::InvalidResponse("empty geocoder url".into()));
        }
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| WeatherError::Request(e.to_string()))?;
        Ok(Self { client, base_url })
    }
}

fn parse_place(place: &Place) -> Option<Coordinates> {
    let lat: f64 = place.latitude.as_deref()?.trim().parse().ok()?;
    let lon: f64 = place.longitude.as_deref()?.trim().parse().ok()?;
    // (0, 0) is how the service reports "unknown"
    if lat == 0.0 || lon == 0.0 {
        return None;
    }
    Some(Coordinates::new(lat, lon))
}

#[async_trait::async_trait]
impl Geocoder for ZippopotamGeocoder {
    fn name(&self) -> &str {
        "zippopotam"
    }

    async fn locate(&self, zip_code: &str) -> WeatherResult<Option<Coordinates>> {
        let url = format!("{}/{}", self.base_url, zip_code);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| WeatherError::Request(e.to_string()))?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(WeatherError::Status(resp.status().as_u16()));
        }
        let body: PostCodeResponse = resp
            .json()
            .await
            .map_err(|e| WeatherError::InvalidResponse(e.to_string()))?;
        Ok(body.places.first().and_then(parse_place))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_place() {
        let body: PostCodeResponse = serde_json::from_str(
            r#"{"post code":"60601","places":[{"place name":"Chicago","latitude":"41.8858","longitude":"-87.6181"}]}"#,
        )
        .unwrap();
        let coords = parse_place(&body.places[0]).unwrap();
        assert_eq!(coords, Coordinates::new(41.8858, -87.6181));
    }

    #[test]
    fn test_zero_or_garbage_is_unknown() {
        let zero = Place {
            latitude: Some("0".into()),
            longitude: Some("-87.6".into()),
        };
        assert!(parse_place(&zero).is_none());

        let garbage = Place {
            latitude: Some("north".into()),
            longitude: None,
        };
        assert!(parse_place(&garbage).is_none());
    }
}
