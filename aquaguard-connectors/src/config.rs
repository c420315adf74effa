//! Environment configuration
//!
//! | Variable                     | Meaning                                      |
//! |------------------------------|----------------------------------------------|
//! | `AQUAGUARD_READINGS`         | store export path, `.avro` archive or URL    |
//! | `OPENWEATHER_API_KEY`        | enables the ambient lookup                   |
//! | `OPENWEATHER_URL`            | weather API base URL                         |
//! | `AMBIENT_CITY`               | city for the lookup (default `Muar`)         |
//! | `AQUAGUARD_TIME_STEP`        | window length                                |
//! | `AQUAGUARD_TRAIN_SIZE`       | training split size                          |
//! | `AQUAGUARD_HORIZON`          | forecast steps                               |
//! | `AQUAGUARD_EPOCHS`           | training epochs                              |
//! | `AQUAGUARD_SEED`             | training RNG seed                            |
//! | `AQUAGUARD_LAST_MAINTENANCE` | `%Y-%m-%d %H:%M:%S` of the last service      |
//!
//! A `.env` file in the working directory is loaded first. Values that do
//! not parse are logged and replaced by their defaults.

use std::str::FromStr;

use aquaguard_core::time::parse_store_timestamp;
use aquaguard_core::Timestamp;
use aquaguard_ml::{LstmTrainer, PipelineConfig};

use crate::ambient::{AmbientSource, OpenWeatherConfig, UnconfiguredAmbient};
use crate::service::AnalysisService;
use crate::source::{source_for, ReadingSource};
use crate::ConnectorError;

/// Service built from the environment
pub type EnvService = AnalysisService<Box<dyn ReadingSource>, Box<dyn AmbientSource>, LstmTrainer>;

/// Everything the CLI needs to build an [`AnalysisService`]
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    /// Where readings come from
    pub readings: Option<String>,
    /// Weather lookup, when an API key is configured
    pub openweather: Option<OpenWeatherConfig>,
    pub pipeline: PipelineConfig,
    pub last_maintenance: Option<Timestamp>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            readings: None,
            openweather: None,
            pipeline: PipelineConfig::default(),
            last_maintenance: None,
        }
    }
}

impl ServiceConfig {
    /// Load `.env` if present, then read the process environment
    pub fn from_env() -> Self {
        match dotenvy::dotenv() {
            Ok(path) => log::debug!("Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => log::warn!("Ignoring unreadable .env: {}", e),
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let mut pipeline = PipelineConfig::default();
        if let Some(time_step) = parsed(&get, "AQUAGUARD_TIME_STEP") {
            pipeline = pipeline.with_time_step(time_step);
        }
        if let Some(train_size) = parsed(&get, "AQUAGUARD_TRAIN_SIZE") {
            pipeline = pipeline.with_train_size(train_size);
        }
        if let Some(horizon) = parsed(&get, "AQUAGUARD_HORIZON") {
            pipeline = pipeline.with_horizon(horizon);
        }

        let mut training = pipeline.training.clone();
        if let Some(epochs) = parsed(&get, "AQUAGUARD_EPOCHS") {
            training = training.with_epochs(epochs);
        }
        if let Some(seed) = parsed(&get, "AQUAGUARD_SEED") {
            training = training.with_seed(seed);
        }
        pipeline = pipeline.with_training(training);

        let openweather = get("OPENWEATHER_API_KEY").map(|key| {
            let mut config = OpenWeatherConfig::new(key);
            if let Some(url) = get("OPENWEATHER_URL") {
                config = config.with_base_url(url);
            }
            if let Some(city) = get("AMBIENT_CITY") {
                config = config.with_city(city);
            }
            config
        });

        let last_maintenance = get("AQUAGUARD_LAST_MAINTENANCE").and_then(|text| {
            parse_store_timestamp(&text, 0)
                .map_err(|e| log::warn!("Ignoring AQUAGUARD_LAST_MAINTENANCE: {}", e))
                .ok()
        });

        Self {
            readings: get("AQUAGUARD_READINGS"),
            openweather,
            pipeline,
            last_maintenance,
        }
    }

    pub fn reading_source(&self) -> Result<Box<dyn ReadingSource>, ConnectorError> {
        match &self.readings {
            Some(location) => source_for(location),
            None => Err(ConnectorError::Config("AQUAGUARD_READINGS is not set".to_string())),
        }
    }

    /// Weather lookup, or a source that always falls back to the default
    pub fn ambient_source(&self) -> Box<dyn AmbientSource> {
        let Some(config) = &self.openweather else {
            return Box::new(UnconfiguredAmbient {
                reason: "OPENWEATHER_API_KEY is not set".to_string(),
            });
        };

        weather_source(config)
    }

    pub fn build_service(&self) -> Result<EnvService, ConnectorError> {
        let source = self.reading_source()?;
        Ok(AnalysisService::lstm(source, self.ambient_source(), self.pipeline.clone()))
    }
}

#[cfg(feature = "http")]
fn weather_source(config: &OpenWeatherConfig) -> Box<dyn AmbientSource> {
    match crate::ambient::OpenWeatherSource::new(config.clone()) {
        Ok(source) => Box::new(source),
        Err(e) => Box::new(UnconfiguredAmbient { reason: e.to_string() }),
    }
}

#[cfg(not(feature = "http"))]
fn weather_source(config: &OpenWeatherConfig) -> Box<dyn AmbientSource> {
    Box::new(UnconfiguredAmbient {
        reason: format!("http feature disabled, cannot query {}", config.base_url),
    })
}

fn parsed<T: FromStr>(get: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let text = get(key)?;
    match text.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("Ignoring {}={:?}: not a valid value", key, text);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> ServiceConfig {
        let env: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        ServiceConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = config_from(&[]);
        assert_eq!(config, ServiceConfig::default());
        assert!(config.reading_source().is_err());
    }

    #[test]
    fn overrides_are_applied() {
        let config = config_from(&[
            ("AQUAGUARD_READINGS", "/data/export.json"),
            ("AQUAGUARD_TIME_STEP", "10"),
            ("AQUAGUARD_TRAIN_SIZE", "200"),
            ("AQUAGUARD_HORIZON", "48"),
            ("AQUAGUARD_EPOCHS", "5"),
            ("AQUAGUARD_SEED", "7"),
            ("AQUAGUARD_LAST_MAINTENANCE", "2024-03-01 08:00:00"),
            ("OPENWEATHER_API_KEY", "abc"),
            ("AMBIENT_CITY", "Johor Bahru"),
        ]);

        assert_eq!(config.readings.as_deref(), Some("/data/export.json"));
        assert_eq!(config.pipeline.time_step, 10);
        assert_eq!(config.pipeline.train_size, 200);
        assert_eq!(config.pipeline.horizon, 48);
        assert_eq!(config.pipeline.training.epochs, 5);
        assert_eq!(config.pipeline.training.seed, 7);
        assert_eq!(config.last_maintenance, Some(1_709_280_000_000));

        let weather = config.openweather.unwrap();
        assert_eq!(weather.city, "Johor Bahru");
        assert_eq!(weather.api_key, "abc");
    }

    #[test]
    fn unparsable_values_fall_back() {
        let config = config_from(&[
            ("AQUAGUARD_HORIZON", "soon"),
            ("AQUAGUARD_LAST_MAINTENANCE", "last tuesday"),
        ]);
        assert_eq!(config.pipeline.horizon, 120);
        assert_eq!(config.last_maintenance, None);
    }

    #[test]
    fn missing_key_means_default_ambient() {
        let source = config_from(&[]).ambient_source();
        assert!(source.current_temperature().is_err());
    }
}
