//! Avro encoding of reading batches
//!
//! Batches are written as Avro object container files, so the schema
//! travels with the bytes. Decoding is strict: the first record that does
//! not make a finite reading fails the whole batch.

use apache_avro::{types::Value, Reader, Schema, Writer};

use aquaguard_core::{Feature, ForecastError, Reading, FEATURE_COUNT};

use crate::SchemaError;

/// Avro record for one reading
pub fn reading_to_value(reading: &Reading) -> Value {
    let mut fields = Vec::with_capacity(FEATURE_COUNT + 1);
    fields.push(("timestamp".to_string(), Value::TimestampMillis(reading.timestamp)));
    for feature in Feature::ALL {
        fields.push((feature.name().to_string(), Value::Double(reading.get(feature))));
    }
    Value::Record(fields)
}

/// Reading from an Avro record
///
/// `index` is the record's position in its batch, for error messages.
pub fn reading_from_value(value: &Value, index: usize) -> Result<Reading, SchemaError> {
    let fields = match value {
        Value::Record(fields) => fields,
        _ => return Err(malformed(index, "record expected".to_string())),
    };
    let field = |name: &str| fields.iter().find(|(key, _)| key == name).map(|(_, v)| v);

    let timestamp = match field("timestamp") {
        Some(Value::TimestampMillis(ms)) | Some(Value::Long(ms)) => *ms,
        Some(other) => return Err(malformed(index, format!("timestamp has type {:?}", other))),
        None => return Err(malformed(index, "missing timestamp".to_string())),
    };

    let mut features = [0.0; FEATURE_COUNT];
    for feature in Feature::ALL {
        features[feature.index()] = field(feature.name())
            .and_then(numeric)
            .ok_or_else(|| malformed(index, format!("missing or non-numeric {}", feature.name())))?;
    }

    let reading = Reading::new(timestamp, features);
    reading.check_finite(index)?;
    Ok(reading)
}

/// Encode a batch as Avro object container bytes
pub fn encode_readings(schema: &Schema, readings: &[Reading]) -> Result<Vec<u8>, SchemaError> {
    let mut writer = Writer::new(schema, Vec::new());
    for reading in readings {
        writer.append(reading_to_value(reading))?;
    }
    let bytes = writer.into_inner()?;
    log::debug!("Encoded {} readings into {} bytes", readings.len(), bytes.len());
    Ok(bytes)
}

/// Decode Avro object container bytes written with [`encode_readings`]
///
/// `schema` is the reader schema; the writer schema comes from the
/// container header.
pub fn decode_readings(schema: &Schema, bytes: &[u8]) -> Result<Vec<Reading>, SchemaError> {
    // A writer that never saw a record emits no header
    if bytes.is_empty() {
        return Ok(Vec::new());
    }
    let reader = Reader::with_schema(schema, bytes)?;
    let mut readings = Vec::new();
    for (index, value) in reader.enumerate() {
        readings.push(reading_from_value(&value?, index)?);
    }
    Ok(readings)
}

/// Numeric Avro scalar as `f64`
pub(crate) fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Double(d) => Some(*d),
        Value::Float(f) => Some(*f as f64),
        Value::Int(i) => Some(*i as f64),
        Value::Long(l) => Some(*l as f64),
        _ => None,
    }
}

fn malformed(index: usize, reason: String) -> SchemaError {
    SchemaError::Reading(ForecastError::MalformedReading { index, reason })
}
