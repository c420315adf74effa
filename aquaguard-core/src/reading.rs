//! Water Network Readings and Ordered Reading Sequences
//!
//! ## Overview
//!
//! Every sensor station in the network reports the same four measurements on
//! each tick. A [`Reading`] is one such tick; a [`ReadingSequence`] is the
//! ordered, gap-free series a forecasting run works on.
//!
//! ## Feature Layout
//!
//! Downstream numerical code (scaler, windows, forecaster) works on plain
//! `[f64; 4]` vectors. The order of the four entries is fixed everywhere:
//!
//! ```text
//! index 0: pressure        (kPa-like arbitrary units, nominal ~100)
//! index 1: flow_rate       (L/min-like arbitrary units, nominal ~50)
//! index 2: water_quality   (quality index, 100 = ideal)
//! index 3: temperature     (degrees Celsius)
//! ```
//!
//! [`Feature`] is the named handle for an index so nobody writes `vector[2]`
//! and hopes it means water quality.
//!
//! ## Sequence Invariants
//!
//! A [`ReadingSequence`] guarantees:
//! - every feature of every reading is finite
//! - timestamps are strictly increasing
//!
//! The model treats index position as the step unit, so these are the only
//! structural guarantees the pipeline needs. A sequence is built once per run
//! and never mutated afterwards.

use serde::{Deserialize, Serialize};

use crate::errors::{ForecastError, ForecastResult};
use crate::time::Timestamp;

/// Number of features carried by every reading
pub const FEATURE_COUNT: usize = 4;

/// One observation in feature order (see [`Feature`])
pub type FeatureVector = [f64; FEATURE_COUNT];

/// Named index into a [`FeatureVector`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    /// Line pressure
    Pressure,
    /// Volumetric flow rate
    FlowRate,
    /// Water quality index
    WaterQuality,
    /// Water temperature in °C
    Temperature,
}

impl Feature {
    /// All features in vector order
    pub const ALL: [Feature; FEATURE_COUNT] = [
        Feature::Pressure,
        Feature::FlowRate,
        Feature::WaterQuality,
        Feature::Temperature,
    ];

    /// Position of this feature inside a [`FeatureVector`]
    pub const fn index(self) -> usize {
        match self {
            Feature::Pressure => 0,
            Feature::FlowRate => 1,
            Feature::WaterQuality => 2,
            Feature::Temperature => 3,
        }
    }

    /// Short snake_case name used in logs and structured output
    pub const fn name(self) -> &'static str {
        match self {
            Feature::Pressure => "pressure",
            Feature::FlowRate => "flow_rate",
            Feature::WaterQuality => "water_quality",
            Feature::Temperature => "temperature",
        }
    }

    /// Key used for this feature by the sensor store documents
    pub const fn store_key(self) -> &'static str {
        match self {
            Feature::Pressure => "Pressure",
            Feature::FlowRate => "Flow_rate",
            Feature::WaterQuality => "Water_quality",
            Feature::Temperature => "Temperature",
        }
    }
}

impl core::fmt::Display for Feature {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// A single timestamped observation of all four features
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Milliseconds since the Unix epoch
    pub timestamp: Timestamp,
    pub pressure: f64,
    pub flow_rate: f64,
    pub water_quality: f64,
    pub temperature: f64,
}

impl Reading {
    /// Build a reading from a feature vector in [`Feature`] order
    pub fn new(timestamp: Timestamp, features: FeatureVector) -> Self {
        Self {
            timestamp,
            pressure: features[0],
            flow_rate: features[1],
            water_quality: features[2],
            temperature: features[3],
        }
    }

    /// Features in vector order
    pub fn features(&self) -> FeatureVector {
        [self.pressure, self.flow_rate, self.water_quality, self.temperature]
    }

    /// Value of a single feature
    pub fn get(&self, feature: Feature) -> f64 {
        self.features()[feature.index()]
    }

    /// Reject NaN and infinite features
    ///
    /// `index` is the position of the reading in the caller's input and is
    /// only used for the error message.
    pub fn check_finite(&self, index: usize) -> ForecastResult<()> {
        for feature in Feature::ALL {
            let value = self.get(feature);
            if !value.is_finite() {
                return Err(ForecastError::MalformedReading {
                    index,
                    reason: format!("{} is not a finite number ({})", feature, value),
                });
            }
        }
        Ok(())
    }
}

/// Time-ordered, validated readings owned by a single pipeline run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadingSequence {
    readings: Vec<Reading>,
}

impl ReadingSequence {
    /// Validate and order raw readings
    ///
    /// Readings are stably sorted by timestamp. When several readings share a
    /// timestamp, the one that appears last in the input is kept (stores
    /// append, so the later record is the newer write). Any non-finite
    /// feature rejects the whole input: a partial sequence would shift every
    /// window after the hole.
    pub fn from_readings(mut readings: Vec<Reading>) -> ForecastResult<Self> {
        for (index, reading) in readings.iter().enumerate() {
            reading.check_finite(index)?;
        }

        readings.sort_by_key(|r| r.timestamp);

        let before = readings.len();
        let mut ordered: Vec<Reading> = Vec::with_capacity(before);
        for reading in readings {
            match ordered.last_mut() {
                Some(last) if last.timestamp == reading.timestamp => *last = reading,
                _ => ordered.push(reading),
            }
        }

        let dropped = before - ordered.len();
        if dropped > 0 {
            log::debug!("dropped {} readings with duplicate timestamps", dropped);
        }

        Ok(Self { readings: ordered })
    }

    /// Number of readings
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    /// True when the sequence holds no readings
    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Readings oldest first
    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    /// Oldest reading
    pub fn first(&self) -> Option<&Reading> {
        self.readings.first()
    }

    /// Newest reading
    pub fn last(&self) -> Option<&Reading> {
        self.readings.last()
    }

    /// The most recent `count` readings (all of them if fewer exist)
    pub fn latest(&self, count: usize) -> &[Reading] {
        let start = self.readings.len().saturating_sub(count);
        &self.readings[start..]
    }

    /// Readings at or after `since`
    pub fn since(&self, since: Timestamp) -> &[Reading] {
        let start = self.readings.partition_point(|r| r.timestamp < since);
        &self.readings[start..]
    }

    /// Feature vectors of every reading, oldest first
    pub fn feature_vectors(&self) -> Vec<FeatureVector> {
        self.readings.iter().map(Reading::features).collect()
    }
}

/// Extract feature vectors from a reading slice
pub fn to_feature_vectors(readings: &[Reading]) -> Vec<FeatureVector> {
    readings.iter().map(Reading::features).collect()
}
