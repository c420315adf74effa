//! Store export to Avro archive, end to end

mod common;

use std::fs;

use aquaguard_core::{ForecastError, ReadingSequence};
use aquaguard_schemas::store::decode_and_check;
use aquaguard_schemas::{avro, decode_export, FeatureLimits, SchemaRegistry, WATER_READING_V1};
use common::*;
use proptest::prelude::*;
use serde_json::json;

#[test]
fn export_decodes_into_sequence() {
    let docs = store_documents(48);
    let readings = decode_export(&export_text(&docs)).unwrap();
    let sequence = ReadingSequence::from_readings(readings).unwrap();

    assert_eq!(sequence.len(), 48);
    assert_eq!(sequence.first().unwrap().timestamp, START_MS);
}

#[test]
fn out_of_order_export_is_sorted_by_sequence() {
    let mut docs = store_documents(10);
    docs.reverse();
    let readings = decode_export(&export_text(&docs)).unwrap();
    let sequence = ReadingSequence::from_readings(readings).unwrap();

    let stamps: Vec<_> = sequence.readings().iter().map(|r| r.timestamp).collect();
    assert!(stamps.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn one_bad_document_rejects_batch() {
    let mut docs = store_documents(20);
    docs[13]["Temperature"] = json!(null);

    match decode_export(&export_text(&docs)) {
        Err(ForecastError::MalformedReading { index, .. }) => assert_eq!(index, 13),
        other => panic!("expected malformed reading, got {:?}", other),
    }
}

#[test]
fn range_warnings_keep_readings() {
    let mut docs = store_documents(5);
    docs[2]["Pressure"] = json!(140);

    let (readings, report) = decode_and_check(&docs, &FeatureLimits::default()).unwrap();
    assert_eq!(readings.len(), 5);
    assert!(report.is_valid());
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].index, Some(2));
}

#[test]
fn avro_archive_on_disk() {
    let mut registry = SchemaRegistry::new();
    registry.load_defaults().unwrap();
    let schema = registry.get(WATER_READING_V1).unwrap();

    let readings = decode_export(&export_text(&store_documents(24))).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("readings.avro");
    fs::write(&path, avro::encode_readings(&schema, &readings).unwrap()).unwrap();

    let bytes = fs::read(&path).unwrap();
    assert_eq!(avro::decode_readings(&schema, &bytes).unwrap(), readings);
}

proptest! {
    #[test]
    fn avro_preserves_values(
        rows in prop::collection::vec([-1e6f64..1e6, -1e6f64..1e6, -1e6f64..1e6, -1e6f64..1e6], 1..40)
    ) {
        let schema = aquaguard_schemas::schemas::water_reading_v1().unwrap();
        let readings: Vec<_> = rows
            .iter()
            .enumerate()
            .map(|(i, f)| aquaguard_core::Reading::new(START_MS + i as i64, *f))
            .collect();

        let bytes = avro::encode_readings(&schema, &readings).unwrap();
        prop_assert_eq!(avro::decode_readings(&schema, &bytes).unwrap(), readings);
    }
}
