//! Test data generators for water network readings
//!
//! Produces sequences that look like a steady distribution line:
//! - pressure around 100, flow around 50
//! - water quality hovering just under 100
//! - temperature following a slow daily swing

use aquaguard_core::{time::MS_PER_HOUR, FeatureVector, Reading, Timestamp};
use proptest::prelude::*;

/// First timestamp used by generated sequences (2024-01-01 00:00:00 UTC)
pub const START_MS: Timestamp = 1_704_067_200_000;

/// One hourly reading with small deterministic wobble
pub fn steady_vector(step: usize) -> FeatureVector {
    let t = step as f64;
    [
        100.0 + (t * 0.3).sin() * 2.0,
        50.0 + (t * 0.2).cos() * 1.5,
        97.0 + (t * 0.1).sin(),
        20.0 + (t * std::f64::consts::TAU / 24.0).sin() * 3.0,
    ]
}

/// `count` hourly readings starting at [`START_MS`]
pub fn steady_readings(count: usize) -> Vec<Reading> {
    (0..count)
        .map(|i| Reading::new(START_MS + i as i64 * MS_PER_HOUR, steady_vector(i)))
        .collect()
}

/// Finite feature value within a generous physical envelope
pub fn feature_value() -> impl Strategy<Value = f64> {
    -50.0f64..500.0
}

/// Feature vector with finite entries
pub fn feature_vector() -> impl Strategy<Value = FeatureVector> {
    [feature_value(), feature_value(), feature_value(), feature_value()]
}

/// Non-empty training split whose features all vary
pub fn varied_training(max_len: usize) -> impl Strategy<Value = Vec<FeatureVector>> {
    prop::collection::vec(feature_vector(), 2..max_len).prop_filter(
        "every feature needs a non-zero span",
        |rows| {
            (0..4).all(|i| {
                let first = rows[0][i];
                rows.iter().any(|r| (r[i] - first).abs() > 1e-3)
            })
        },
    )
}
