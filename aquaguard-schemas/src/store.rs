//! Store document decoding
//!
//! The document store keeps one JSON object per station tick, keyed
//! `Timestamp`, `Pressure`, `Flow_rate`, `Water_quality` and `Temperature`.
//! Other keys (`_id` and friends) are ignored.
//!
//! A batch is all or nothing. A missing key, a non-numeric or non-finite
//! value, or an unparsable timestamp rejects the whole batch with
//! [`ForecastError::MalformedReading`] naming the offending document.

use serde_json::{Map, Value};

use aquaguard_core::time::parse_store_timestamp;
use aquaguard_core::{Feature, ForecastError, ForecastResult, Reading, FEATURE_COUNT};

use crate::physics::FeatureLimits;
use crate::validation::ValidationReport;

/// Store key holding the timestamp string
pub const TIMESTAMP_KEY: &str = "Timestamp";

/// Decode one store document
pub fn decode_document(doc: &Value, index: usize) -> ForecastResult<Reading> {
    let object = doc.as_object().ok_or_else(|| ForecastError::MalformedReading {
        index,
        reason: "document is not a JSON object".to_string(),
    })?;

    let timestamp = match object.get(TIMESTAMP_KEY) {
        Some(Value::String(text)) => parse_store_timestamp(text, index)?,
        Some(other) => {
            return Err(ForecastError::MalformedReading {
                index,
                reason: format!("{} is not a string: {}", TIMESTAMP_KEY, other),
            })
        }
        None => {
            return Err(ForecastError::MalformedReading {
                index,
                reason: format!("missing {}", TIMESTAMP_KEY),
            })
        }
    };

    let mut features = [0.0; FEATURE_COUNT];
    for feature in Feature::ALL {
        features[feature.index()] = feature_value(object, feature, index)?;
    }

    let reading = Reading::new(timestamp, features);
    reading.check_finite(index)?;
    Ok(reading)
}

fn feature_value(object: &Map<String, Value>, feature: Feature, index: usize) -> ForecastResult<f64> {
    let key = feature.store_key();
    match object.get(key) {
        Some(Value::Number(number)) => number.as_f64().ok_or_else(|| ForecastError::MalformedReading {
            index,
            reason: format!("{} is not representable as f64", key),
        }),
        Some(other) => Err(ForecastError::MalformedReading {
            index,
            reason: format!("{} is not numeric: {}", key, other),
        }),
        None => Err(ForecastError::MalformedReading {
            index,
            reason: format!("missing {}", key),
        }),
    }
}

/// Decode a batch of store documents in their stored order
pub fn decode_documents(docs: &[Value]) -> ForecastResult<Vec<Reading>> {
    docs.iter()
        .enumerate()
        .map(|(index, doc)| decode_document(doc, index))
        .collect::<ForecastResult<Vec<_>>>()
        .map_err(|err| {
            log::warn!("Rejected batch of {} store documents: {}", docs.len(), err);
            err
        })
}

/// Decode a store export: a JSON array of documents
pub fn decode_export(text: &str) -> ForecastResult<Vec<Reading>> {
    let value: Value = serde_json::from_str(text).map_err(|e| ForecastError::MalformedReading {
        index: 0,
        reason: format!("export is not valid JSON: {}", e),
    })?;

    match value {
        Value::Array(docs) => decode_documents(&docs),
        _ => Err(ForecastError::MalformedReading {
            index: 0,
            reason: "export is not a JSON array".to_string(),
        }),
    }
}

/// Decode a batch and collect operating-range warnings for it
pub fn decode_and_check(
    docs: &[Value],
    limits: &FeatureLimits,
) -> ForecastResult<(Vec<Reading>, ValidationReport)> {
    let readings = decode_documents(docs)?;
    let report = limits.check_all(&readings);
    Ok((readings, report))
}
