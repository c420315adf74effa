//! Connectors Around the AquaGuard Pipeline
//!
//! ## Overview
//!
//! The forecasting crates are pure: readings and an ambient temperature go
//! in, a summary comes out. This crate supplies everything on the outside of
//! that boundary:
//!
//! - [`source`]: where readings come from (store export file, Avro archive,
//!   HTTP export, memory)
//! - [`ambient`]: the current air temperature, from OpenWeather or a fixed
//!   value, with a logged fallback when the lookup fails
//! - [`service`]: a request/response surface mapping pipeline outcomes to
//!   status codes
//! - [`config`]: environment configuration for the `aquaguard-analyze` CLI
//! - [`http`]: the blocking JSON client behind the HTTP pieces
//!
//! ## Failure Mapping
//!
//! | Outcome                                   | Status |
//! |-------------------------------------------|--------|
//! | Summary produced                          | 200    |
//! | Too few readings, invalid overrides       | 400    |
//! | Malformed readings, degenerate features   | 422    |
//! | Reading source unreachable or unreadable  | 502    |
//! | Run cancelled                             | 503    |
//! | Anything else                             | 500    |
//!
//! An ambient lookup failure is not in the table. It never fails a run.
//!
//! ## Example Usage
//!
//! ```rust
//! use aquaguard_connectors::ambient::FixedAmbient;
//! use aquaguard_connectors::service::{AnalysisService, AnalyzeRequest};
//! use aquaguard_connectors::source::MemorySource;
//! use aquaguard_ml::{NaiveTrainer, PipelineConfig};
//!
//! let service = AnalysisService::new(
//!     MemorySource::new(Vec::new()),
//!     FixedAmbient(25.0),
//!     NaiveTrainer,
//!     PipelineConfig::default(),
//! );
//! let response = service.analyze(&AnalyzeRequest::default());
//! assert_eq!(response.status, 400);
//! assert_eq!(response.body, "Warning: less than 500 records available.");
//! ```

#![deny(unsafe_code)]

use std::path::PathBuf;

use thiserror::Error;

use aquaguard_core::ForecastError;
use aquaguard_schemas::SchemaError;

pub mod ambient;
pub mod config;
#[cfg(feature = "http")]
pub mod http;
pub mod service;
pub mod source;

pub use ambient::{resolve_ambient, AmbientError, AmbientSource, FixedAmbient, OpenWeatherConfig};
#[cfg(feature = "http")]
pub use ambient::OpenWeatherSource;
pub use config::ServiceConfig;
pub use service::{AnalysisService, AnalyzeRequest, AnalyzeResponse, MaintenanceRequest, ResponseFormat};
pub use source::{JsonFileSource, MemorySource, ReadingSource};

/// Common connector errors
#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "http")]
    #[error(transparent)]
    Http(#[from] http::HttpError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Readings arrived but cannot be used
    #[error(transparent)]
    Forecast(#[from] ForecastError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ConnectorError {
    /// The pipeline error inside, if the readings themselves are at fault
    pub fn as_forecast_error(&self) -> Option<&ForecastError> {
        match self {
            ConnectorError::Forecast(err) | ConnectorError::Schema(SchemaError::Reading(err)) => Some(err),
            _ => None,
        }
    }
}

/// Request statistics for an HTTP client
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ConnectionStats {
    /// Requests attempted, retries included
    pub requests_sent: u64,
    /// Requests that ultimately failed
    pub requests_failed: u64,
    pub retries: u64,
    pub bytes_received: u64,
    /// Last error message
    pub last_error: Option<String>,
}
