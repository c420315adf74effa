//! Avro Schemas and Store Document Decoding for Water Readings
//!
//! ## Overview
//!
//! Readings arrive from two places: the document store that the field
//! stations write to, and Avro archives exported from earlier runs. This
//! crate turns both into [`aquaguard_core::Reading`]s and nothing else. It
//! never reorders, fills gaps or drops records silently; a batch is either
//! decoded completely or rejected with the index of the first bad record.
//!
//! ## Store Documents
//!
//! The store holds one JSON document per tick:
//!
//! ```json
//! {
//!   "_id": "652f...",
//!   "Timestamp": "2024-01-01 00:00:00",
//!   "Pressure": 101.3,
//!   "Flow_rate": 49.8,
//!   "Water_quality": 96.1,
//!   "Temperature": 20.4
//! }
//! ```
//!
//! Keys other than the five above are ignored. Integer values are accepted
//! as numbers. See [`store`].
//!
//! ## Avro
//!
//! `water_reading_v1` carries the same data with a millisecond timestamp:
//!
//! ```json
//! {
//!   "namespace": "io.aquaguard.sensors.v1",
//!   "type": "record",
//!   "name": "WaterReading",
//!   "fields": [
//!     {"name": "timestamp", "type": {"type": "long", "logicalType": "timestamp-millis"}},
//!     {"name": "pressure", "type": "double"},
//!     {"name": "flow_rate", "type": "double"},
//!     {"name": "water_quality", "type": "double"},
//!     {"name": "temperature", "type": "double"}
//!   ]
//! }
//! ```
//!
//! Batches round-trip through Avro object container bytes with
//! [`avro::encode_readings`] and [`avro::decode_readings`].
//!
//! ## Range Checks
//!
//! [`physics::FeatureLimits`] knows the operating range of each sensor. A
//! value outside it becomes a *warning* in a [`ValidationReport`]. Rejecting
//! it would hide exactly the pressure collapse the forecaster is meant to
//! report.
//!
//! ## Usage Example
//!
//! ```rust
//! use aquaguard_schemas::{avro, SchemaRegistry, WATER_READING_V1};
//! use aquaguard_core::Reading;
//!
//! let mut registry = SchemaRegistry::new();
//! registry.load_defaults()?;
//! let schema = registry.get(WATER_READING_V1)?;
//!
//! let readings = vec![Reading::new(0, [100.0, 50.0, 96.0, 20.0])];
//! let bytes = avro::encode_readings(&schema, &readings)?;
//! assert_eq!(avro::decode_readings(&schema, &bytes)?, readings);
//! # Ok::<(), aquaguard_schemas::SchemaError>(())
//! ```

#![deny(unsafe_code)]

use aquaguard_core::ForecastError;

pub mod avro;
pub mod physics;
pub mod registry;
pub mod schemas;
pub mod store;
pub mod validation;

pub use physics::FeatureLimits;
pub use registry::{SchemaMetadata, SchemaRegistry};
pub use schemas::WATER_READING_V1;
pub use store::{decode_documents, decode_export};
pub use validation::{IssueType, SchemaValidator, Severity, ValidationIssue, ValidationReport};

/// Schema-related errors
#[derive(Debug, thiserror_no_std::Error)]
pub enum SchemaError {
    #[error("Failed to parse schema: {0}")]
    ParseError(String),

    #[error("Schema not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("Avro encoding failed: {0}")]
    Encoding(String),

    /// A record decoded but does not make a valid reading
    #[error(transparent)]
    Reading(#[from] ForecastError),
}

impl From<apache_avro::Error> for SchemaError {
    fn from(err: apache_avro::Error) -> Self {
        SchemaError::Encoding(err.to_string())
    }
}
