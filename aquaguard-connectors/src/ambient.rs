//! Ambient temperature lookup
//!
//! The temperature tolerance of a run depends on the air temperature around
//! the network. A lookup that fails must never fail the run: the pipeline
//! falls back to 20 °C and the summary records that it did.

use thiserror::Error;

use aquaguard_core::constants::DEFAULT_AMBIENT_C;
use aquaguard_ml::Ambient;

#[cfg(feature = "http")]
use crate::http::{HttpClient, HttpConfig, HttpError};

/// Why a lookup produced no temperature
#[derive(Debug, Error)]
pub enum AmbientError {
    #[cfg(feature = "http")]
    #[error("Weather request failed: {0}")]
    Http(#[from] HttpError),

    #[error("Weather response has no {0}")]
    MissingField(&'static str),

    #[error("Weather service reported a non-finite temperature: {0}")]
    NonFinite(f64),

    #[error("Weather lookup not configured: {0}")]
    NotConfigured(String),
}

/// Anything that can report the current air temperature in °C
pub trait AmbientSource {
    fn current_temperature(&self) -> Result<f64, AmbientError>;
}

impl<A: AmbientSource + ?Sized> AmbientSource for &A {
    fn current_temperature(&self) -> Result<f64, AmbientError> {
        (**self).current_temperature()
    }
}

impl<A: AmbientSource + ?Sized> AmbientSource for Box<A> {
    fn current_temperature(&self) -> Result<f64, AmbientError> {
        (**self).current_temperature()
    }
}

/// Constant temperature, for tests and offline runs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedAmbient(pub f64);

impl AmbientSource for FixedAmbient {
    fn current_temperature(&self) -> Result<f64, AmbientError> {
        Ok(self.0)
    }
}

/// Source that always fails; runs fall back to the default
#[derive(Debug, Clone, Default)]
pub struct UnconfiguredAmbient {
    pub reason: String,
}

impl AmbientSource for UnconfiguredAmbient {
    fn current_temperature(&self) -> Result<f64, AmbientError> {
        Err(AmbientError::NotConfigured(self.reason.clone()))
    }
}

/// Look up the ambient temperature, substituting the default on failure
pub fn resolve_ambient<A: AmbientSource + ?Sized>(source: &A) -> Ambient {
    match source.current_temperature() {
        Ok(value) if value.is_finite() => Ambient::lookup(value),
        Ok(value) => {
            log::warn!(
                "{}; using default ambient {} °C",
                AmbientError::NonFinite(value),
                DEFAULT_AMBIENT_C
            );
            Ambient::default_value(DEFAULT_AMBIENT_C)
        }
        Err(err) => {
            log::warn!("Ambient lookup failed ({}); using default {} °C", err, DEFAULT_AMBIENT_C);
            Ambient::default_value(DEFAULT_AMBIENT_C)
        }
    }
}

/// OpenWeather current-weather settings
#[derive(Clone, Debug, PartialEq)]
pub struct OpenWeatherConfig {
    pub base_url: String,
    pub api_key: String,
    /// City name as OpenWeather knows it
    pub city: String,
    /// `metric` reports °C
    pub units: String,
}

impl OpenWeatherConfig {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.openweathermap.org";
    pub const DEFAULT_CITY: &'static str = "Muar";

    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            city: Self::DEFAULT_CITY.to_string(),
            units: "metric".to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = city.into();
        self
    }
}

/// Current temperature from `GET {base}/data/2.5/weather`
#[cfg(feature = "http")]
pub struct OpenWeatherSource {
    config: OpenWeatherConfig,
    client: HttpClient,
}

#[cfg(feature = "http")]
impl OpenWeatherSource {
    pub fn new(config: OpenWeatherConfig) -> Result<Self, AmbientError> {
        if config.api_key.is_empty() {
            return Err(AmbientError::NotConfigured("empty API key".to_string()));
        }
        // a weather lookup is not worth stalling a run for
        let http = HttpConfig::new(config.base_url.clone()).timeout_secs(10).max_retries(1);
        let client = HttpClient::new(http)?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &OpenWeatherConfig {
        &self.config
    }
}

#[cfg(feature = "http")]
impl AmbientSource for OpenWeatherSource {
    fn current_temperature(&self) -> Result<f64, AmbientError> {
        let body = self.client.get_json(
            "/data/2.5/weather",
            &[
                ("q", self.config.city.as_str()),
                ("appid", self.config.api_key.as_str()),
                ("units", self.config.units.as_str()),
            ],
        )?;

        let temp = body
            .get("main")
            .and_then(|main| main.get("temp"))
            .and_then(|t| t.as_f64())
            .ok_or(AmbientError::MissingField("main.temp"))?;

        if !temp.is_finite() {
            return Err(AmbientError::NonFinite(temp));
        }
        log::debug!("Ambient temperature in {}: {} °C", self.config.city, temp);
        Ok(temp)
    }
}
