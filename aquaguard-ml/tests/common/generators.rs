//! Synthetic water line readings
//!
//! - `constant_line`: every feature flat, zero noise
//! - `steady_line`: smooth periodic wobble around nominal values
//! - `shift_tail`: add an offset to the final readings of a series

use aquaguard_core::time::MS_PER_HOUR;
use aquaguard_core::{Feature, FeatureVector, Reading, ReadingSequence, Timestamp};

/// 2024-01-01 00:00:00 UTC
pub const START_MS: Timestamp = 1_704_067_200_000;

/// Nominal operating point: pressure, flow, quality, temperature
pub const NOMINAL: FeatureVector = [100.0, 50.0, 95.0, 20.0];

pub fn hourly(rows: impl IntoIterator<Item = FeatureVector>) -> Vec<Reading> {
    rows.into_iter()
        .enumerate()
        .map(|(i, row)| Reading::new(START_MS + i as i64 * MS_PER_HOUR, row))
        .collect()
}

pub fn constant_line(count: usize) -> Vec<Reading> {
    hourly(std::iter::repeat(NOMINAL).take(count))
}

pub fn steady_line(count: usize) -> Vec<Reading> {
    hourly((0..count).map(|i| {
        let t = i as f64;
        [
            100.0 + 2.0 * (t * 0.25).sin(),
            50.0 + 1.5 * (t * 0.25).cos(),
            96.0 + 0.8 * (t * 0.1).sin(),
            20.0 + 1.0 * (t * std::f64::consts::TAU / 24.0).sin(),
        ]
    }))
}

/// Add `offset` to `feature` in the last `tail` readings
pub fn shift_tail(readings: &mut [Reading], tail: usize, feature: Feature, offset: f64) {
    let start = readings.len().saturating_sub(tail);
    for reading in &mut readings[start..] {
        match feature {
            Feature::Pressure => reading.pressure += offset,
            Feature::FlowRate => reading.flow_rate += offset,
            Feature::WaterQuality => reading.water_quality += offset,
            Feature::Temperature => reading.temperature += offset,
        }
    }
}

pub fn sequence(readings: Vec<Reading>) -> ReadingSequence {
    ReadingSequence::from_readings(readings).expect("generated readings are valid")
}
