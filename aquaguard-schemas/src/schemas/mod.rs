//! AquaGuard Avro schemas
//!
//! Field names follow the feature order of `aquaguard_core::Feature`.
//! Schemas are versioned by name; a new version never removes a field.

use apache_avro::Schema;
use serde_json::json;

use crate::SchemaError;

/// Registry name of the reading schema
pub const WATER_READING_V1: &str = "water_reading_v1";

/// Namespace shared by the v1 schemas
pub const NAMESPACE_V1: &str = "io.aquaguard.sensors.v1";

/// Field names of [`water_reading_v1`] in record order
pub const WATER_READING_FIELDS: [&str; 5] =
    ["timestamp", "pressure", "flow_rate", "water_quality", "temperature"];

/// Water network reading schema v1.0.0
pub fn water_reading_v1() -> Result<Schema, SchemaError> {
    let schema_json = json!({
        "namespace": NAMESPACE_V1,
        "type": "record",
        "name": "WaterReading",
        "doc": "One tick of a water network sensor station",
        "fields": [
            {
                "name": "timestamp",
                "type": {"type": "long", "logicalType": "timestamp-millis"},
                "doc": "Reading timestamp in milliseconds since epoch (UTC)"
            },
            {
                "name": "pressure",
                "type": "double",
                "doc": "Line pressure"
            },
            {
                "name": "flow_rate",
                "type": "double",
                "doc": "Volumetric flow rate"
            },
            {
                "name": "water_quality",
                "type": "double",
                "doc": "Water quality index, 100 is ideal"
            },
            {
                "name": "temperature",
                "type": "double",
                "doc": "Water temperature in degrees Celsius"
            }
        ]
    });

    Schema::parse(&schema_json).map_err(|e| SchemaError::ParseError(e.to_string()))
}
