use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_BIND: &str = "0.0.0.0:5000";
pub const DEFAULT_ENCODERS_DIR: &str = "models/encoders";
pub const DEFAULT_MODELS_DIR: &str = "models/cities";
pub const DEFAULT_CITY: &str = "seattle";
pub const DEFAULT_ARCHIVE_URL: &str = "https://archive-api.open-meteo.com/v1/archive";
pub const DEFAULT_GEOCODER_URL: &str = "https://api.zippopotam.us/us";
pub const DEFAULT_WEATHER_TIMEOUT_MS: u64 = 3000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub bind: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactsConfig {
    pub encoders_dir: Option<String>,
    pub models_dir: Option<String>,
    pub city: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    pub enabled: Option<bool>,
    pub archive_url: Option<String>,
    pub geocoder_url: Option<String>,
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub service: Option<ServiceConfig>,
    pub artifacts: Option<ArtifactsConfig>,
    pub weather: Option<WeatherConfig>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppConfig {
    /// Load configuration from CRIMECAST_CONFIG path (TOML) if present, with
    /// reasonable defaults. ENCODERS_DIR overrides `[artifacts] encoders_dir`.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("CRIMECAST_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
        let cfg = Self::load_from(&path)?;
        Ok(cfg.with_env(|key| std::env::var(key).ok()))
    }

    /// Load from a TOML file; a missing file yields the defaults
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let cfg = if path.exists() {
            let s = fs::read_to_string(path)?;
            toml::from_str::<AppConfig>(&s)?
        } else {
            AppConfig::default()
        };
        Ok(cfg)
    }

    /// Apply environment overrides read through `lookup`
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(dir) = lookup("ENCODERS_DIR").filter(|d| !d.is_empty()) {
            let artifacts = self.artifacts.get_or_insert(ArtifactsConfig {
                encoders_dir: None,
                models_dir: None,
                city: None,
            });
            artifacts.encoders_dir = Some(dir);
        }
        self
    }

    /// HTTP bind address (default 0.0.0.0:5000)
    pub fn bind(&self) -> String {
        self.service
            .as_ref()
            .and_then(|s| s.bind.clone())
            .unwrap_or_else(|| DEFAULT_BIND.to_string())
    }

    pub fn encoders_dir(&self) -> PathBuf {
        self.artifacts
            .as_ref()
            .and_then(|a| a.encoders_dir.as_deref())
            .unwrap_or(DEFAULT_ENCODERS_DIR)
            .into()
    }

    pub fn models_dir(&self) -> PathBuf {
        self.artifacts
            .as_ref()
            .and_then(|a| a.models_dir.as_deref())
            .unwrap_or(DEFAULT_MODELS_DIR)
            .into()
    }

    pub fn city(&self) -> String {
        self.artifacts
            .as_ref()
            .and_then(|a| a.city.clone())
            .unwrap_or_else(|| DEFAULT_CITY.to_string())
    }

    /// Live weather lookups on (default true)
    pub fn weather_enabled(&self) -> bool {
        self.weather.as_ref().and_then(|w| w.enabled).unwrap_or(true)
    }

    pub fn archive_url(&self) -> String {
        self.weather
            .as_ref()
            .and_then(|w| w.archive_url.clone())
            .unwrap_or_else(|| DEFAULT_ARCHIVE_URL.to_string())
    }

    pub fn geocoder_url(&self) -> String {
        self.weather
            .as_ref()
            .and_then(|w| w.geocoder_url.clone())
            .unwrap_or_else(|| DEFAULT_GEOCODER_URL.to_string())
    }

    /// Bound on each geocoding / weather call (default 3s)
    pub fn weather_timeout(&self) -> Duration {
        let ms = self
            .weather
            .as_ref()
            .and_then(|w| w.timeout_ms)
            .unwrap_or(DEFAULT_WEATHER_TIMEOUT_MS);
        Duration::from_millis(ms)
    }
}
