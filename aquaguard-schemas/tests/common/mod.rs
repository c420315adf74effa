//! Shared fixtures for schema tests

#![allow(dead_code)]

use aquaguard_core::time::{format_store_timestamp, MS_PER_HOUR};
use aquaguard_core::Timestamp;
use serde_json::{json, Value};

/// 2024-01-01 00:00:00 UTC
pub const START_MS: Timestamp = 1_704_067_200_000;

/// Hourly store documents the way the station gateway writes them
pub fn store_documents(count: usize) -> Vec<Value> {
    (0..count)
        .map(|i| {
            let t = i as f64;
            json!({
                "_id": format!("doc-{:04}", i),
                "Timestamp": format_store_timestamp(START_MS + i as i64 * MS_PER_HOUR),
                "Pressure": 100.0 + (t * 0.3).sin() * 2.0,
                "Flow_rate": 50.0 + (t * 0.2).cos() * 1.5,
                "Water_quality": 97.0 + (t * 0.1).sin(),
                "Temperature": 20.0 + (t * 0.26).sin() * 3.0,
            })
        })
        .collect()
}

/// Documents serialised as a store export
pub fn export_text(docs: &[Value]) -> String {
    Value::Array(docs.to_vec()).to_string()
}
