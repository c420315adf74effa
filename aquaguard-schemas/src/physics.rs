//! Operating Ranges of the Water Network Sensors
//!
//! Each feature has the range its station hardware reports within. A value
//! outside it is physically implausible for this network, but it is still
//! data: range checks produce warnings and never reject a reading.

use serde::{Deserialize, Serialize};

use aquaguard_core::constants::sensors::{
    FLOW_RATE_MAX, FLOW_RATE_MIN, PRESSURE_MAX, PRESSURE_MIN, TEMPERATURE_MAX_C,
    TEMPERATURE_MIN_C, WATER_QUALITY_MAX, WATER_QUALITY_MIN,
};
use aquaguard_core::{Feature, Reading, FEATURE_COUNT};

use crate::validation::{IssueType, Severity, ValidationIssue, ValidationReport};

/// Inclusive operating range of one sensor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRange {
    pub min: f64,
    pub max: f64,
}

impl FeatureRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Operating ranges for all four features
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureLimits {
    ranges: [FeatureRange; FEATURE_COUNT],
}

impl Default for FeatureLimits {
    fn default() -> Self {
        Self {
            ranges: [
                FeatureRange::new(PRESSURE_MIN, PRESSURE_MAX),
                FeatureRange::new(FLOW_RATE_MIN, FLOW_RATE_MAX),
                FeatureRange::new(WATER_QUALITY_MIN, WATER_QUALITY_MAX),
                FeatureRange::new(TEMPERATURE_MIN_C, TEMPERATURE_MAX_C),
            ],
        }
    }
}

impl FeatureLimits {
    pub fn range(&self, feature: Feature) -> FeatureRange {
        self.ranges[feature.index()]
    }

    /// Replace the range of one feature
    pub fn with_range(mut self, feature: Feature, min: f64, max: f64) -> Self {
        self.ranges[feature.index()] = FeatureRange::new(min, max);
        self
    }

    /// Warnings for every feature of `reading` outside its range
    ///
    /// `index` is the reading's position in the caller's batch.
    pub fn check(&self, reading: &Reading, index: usize) -> Vec<ValidationIssue> {
        Feature::ALL
            .iter()
            .filter_map(|&feature| {
                let value = reading.get(feature);
                let range = self.range(feature);
                if range.contains(value) {
                    return None;
                }
                Some(ValidationIssue {
                    issue_type: IssueType::OutOfRange,
                    field: Some(feature.name().to_string()),
                    index: Some(index),
                    message: format!(
                        "{} {} outside operating range [{}, {}]",
                        feature.name(),
                        value,
                        range.min,
                        range.max
                    ),
                    severity: Severity::Warning,
                })
            })
            .collect()
    }

    /// Range warnings for a whole batch
    pub fn check_all(&self, readings: &[Reading]) -> ValidationReport {
        let mut report = ValidationReport::new();
        for (index, reading) in readings.iter().enumerate() {
            for issue in self.check(reading, index) {
                report.add_warning(issue);
            }
        }
        if !report.warnings.is_empty() {
            log::warn!(
                "{} out-of-range values across {} readings",
                report.warnings.len(),
                readings.len()
            );
        }
        report
    }
}
