//! Threshold Anomaly Classifier
//!
//! ## Overview
//!
//! Compares the inverse-scaled forecast against the held-out observations,
//! index by index, in physical units:
//!
//! ```text
//! flag[f][i] = |actual[i][f] - forecast[i][f]| > threshold[f]
//! ```
//!
//! Only the first `min(len(forecast), len(actual))` indices are compared.
//!
//! ## Coupling Rule
//!
//! Water quality and temperature are reported from their own flags. Leakage
//! is reported only where pressure *and* flow deviate at the same index:
//!
//! ```text
//! leak[i] = pressure[i] && flow_rate[i]
//! ```
//!
//! A pressure spike with normal flow, however large, is not a leak.
//!
//! ## Temperature Threshold
//!
//! The temperature tolerance depends on the ambient temperature supplied by
//! the caller. [`TemperatureThresholdPolicy::resolve`] picks the wide value
//! when ambient is at or beyond either extreme (both bounds inclusive) and
//! the narrow one otherwise.

use aquaguard_core::constants::thresholds::{
    EXTREME_AMBIENT_HIGH_C, EXTREME_AMBIENT_LOW_C, FLOW_RATE_THRESHOLD, PRESSURE_THRESHOLD,
    TEMPERATURE_THRESHOLD_NARROW_C, TEMPERATURE_THRESHOLD_WIDE_C, WATER_QUALITY_THRESHOLD,
};
use aquaguard_core::{Feature, FeatureVector, ForecastError, ForecastResult, FEATURE_COUNT};
use serde::{Deserialize, Serialize};

/// Fixed per-feature tolerances (physical units)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureThresholds {
    pub pressure: f64,
    pub flow_rate: f64,
    pub water_quality: f64,
}

impl Default for FeatureThresholds {
    fn default() -> Self {
        Self {
            pressure: PRESSURE_THRESHOLD,
            flow_rate: FLOW_RATE_THRESHOLD,
            water_quality: WATER_QUALITY_THRESHOLD,
        }
    }
}

impl FeatureThresholds {
    /// All tolerances must be finite and positive
    pub fn validate(&self) -> ForecastResult<()> {
        for (name, value) in [
            ("pressure", self.pressure),
            ("flow_rate", self.flow_rate),
            ("water_quality", self.water_quality),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ForecastError::config(format!("{} threshold must be positive, got {}", name, value)));
            }
        }
        Ok(())
    }
}

/// Ambient-dependent choice between two temperature tolerances
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureThresholdPolicy {
    /// Tolerance under moderate ambient conditions
    pub narrow: f64,
    /// Tolerance under extreme ambient conditions
    pub wide: f64,
    /// Ambient at or above this is extreme
    pub extreme_high: f64,
    /// Ambient at or below this is extreme
    pub extreme_low: f64,
}

impl Default for TemperatureThresholdPolicy {
    fn default() -> Self {
        Self {
            narrow: TEMPERATURE_THRESHOLD_NARROW_C,
            wide: TEMPERATURE_THRESHOLD_WIDE_C,
            extreme_high: EXTREME_AMBIENT_HIGH_C,
            extreme_low: EXTREME_AMBIENT_LOW_C,
        }
    }
}

impl TemperatureThresholdPolicy {
    /// Temperature tolerance for the given ambient temperature
    pub fn resolve(&self, ambient: f64) -> f64 {
        if self.is_extreme(ambient) {
            self.wide
        } else {
            self.narrow
        }
    }

    /// True when `ambient` lies on or beyond either extreme
    pub fn is_extreme(&self, ambient: f64) -> bool {
        ambient >= self.extreme_high || ambient <= self.extreme_low
    }

    pub fn validate(&self) -> ForecastResult<()> {
        if !(self.narrow.is_finite() && self.narrow > 0.0 && self.wide.is_finite() && self.wide > 0.0) {
            return Err(ForecastError::config("temperature thresholds must be positive"));
        }
        if self.extreme_low.is_nan() || self.extreme_high.is_nan() || self.extreme_low >= self.extreme_high {
            return Err(ForecastError::config(format!(
                "extreme ambient band is inverted: low {} high {}",
                self.extreme_low, self.extreme_high
            )));
        }
        Ok(())
    }
}

/// Per-index flags over the compared region
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnomalyFlags {
    pub pressure: Vec<bool>,
    pub flow_rate: Vec<bool>,
    pub water_quality: Vec<bool>,
    pub temperature: Vec<bool>,
    /// `pressure[i] && flow_rate[i]`
    pub leak: Vec<bool>,
}

impl AnomalyFlags {
    /// Number of compared indices
    pub fn len(&self) -> usize {
        self.leak.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leak.is_empty()
    }

    /// Flags of a single feature
    pub fn feature(&self, feature: Feature) -> &[bool] {
        match feature {
            Feature::Pressure => &self.pressure,
            Feature::FlowRate => &self.flow_rate,
            Feature::WaterQuality => &self.water_quality,
            Feature::Temperature => &self.temperature,
        }
    }

    /// Percentages for the three reported conditions
    pub fn percentages(&self) -> FlagPercentages {
        FlagPercentages {
            leak: percent(&self.leak),
            water_quality: percent(&self.water_quality),
            temperature: percent(&self.temperature),
        }
    }
}

/// Reported anomaly rates, each in `[0, 100]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FlagPercentages {
    pub leak: f64,
    pub water_quality: f64,
    pub temperature: f64,
}

/// Share of `true` entries ×100; an empty slice is 0%
pub fn percent(flags: &[bool]) -> f64 {
    if flags.is_empty() {
        return 0.0;
    }
    let hits = flags.iter().filter(|&&f| f).count();
    hits as f64 * 100.0 / flags.len() as f64
}

/// Flags deviations beyond per-feature tolerances
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnomalyClassifier {
    thresholds: FeatureVector,
}

impl AnomalyClassifier {
    /// Classifier using the fixed tolerances and an already resolved
    /// temperature tolerance
    pub fn new(fixed: &FeatureThresholds, temperature: f64) -> Self {
        Self {
            thresholds: [fixed.pressure, fixed.flow_rate, fixed.water_quality, temperature],
        }
    }

    /// Tolerances in feature order
    pub fn thresholds(&self) -> FeatureVector {
        self.thresholds
    }

    /// Flag every aligned index of `forecast` against `actual`
    pub fn classify(&self, forecast: &[FeatureVector], actual: &[FeatureVector]) -> AnomalyFlags {
        let n = forecast.len().min(actual.len());
        let mut flags = AnomalyFlags {
            pressure: Vec::with_capacity(n),
            flow_rate: Vec::with_capacity(n),
            water_quality: Vec::with_capacity(n),
            temperature: Vec::with_capacity(n),
            leak: Vec::with_capacity(n),
        };

        for (predicted, observed) in forecast.iter().zip(actual) {
            let mut hit = [false; FEATURE_COUNT];
            for i in 0..FEATURE_COUNT {
                hit[i] = (observed[i] - predicted[i]).abs() > self.thresholds[i];
            }

            flags.pressure.push(hit[Feature::Pressure.index()]);
            flags.flow_rate.push(hit[Feature::FlowRate.index()]);
            flags.water_quality.push(hit[Feature::WaterQuality.index()]);
            flags.temperature.push(hit[Feature::Temperature.index()]);
            flags
                .leak
                .push(hit[Feature::Pressure.index()] && hit[Feature::FlowRate.index()]);
        }

        flags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> AnomalyClassifier {
        AnomalyClassifier::new(&FeatureThresholds::default(), 2.0)
    }

    fn base(n: usize) -> Vec<FeatureVector> {
        vec![[100.0, 50.0, 95.0, 20.0]; n]
    }

    #[test]
    fn temperature_threshold_selection() {
        let policy = TemperatureThresholdPolicy::default();
        assert_eq!(policy.resolve(35.0), 5.0);
        assert_eq!(policy.resolve(30.0), 5.0);
        assert_eq!(policy.resolve(20.0), 2.0);
        assert_eq!(policy.resolve(10.0), 5.0);
        assert_eq!(policy.resolve(-3.0), 5.0);
        assert_eq!(policy.resolve(10.5), 2.0);
    }

    #[test]
    fn pressure_alone_is_not_a_leak() {
        let forecast = base(10);
        let mut actual = base(10);
        for row in actual.iter_mut() {
            row[0] += 50.0;
        }

        let flags = classifier().classify(&forecast, &actual);
        assert_eq!(percent(&flags.pressure), 100.0);
        assert_eq!(flags.percentages().leak, 0.0);
    }

    #[test]
    fn leak_needs_matching_indices() {
        let forecast = base(4);
        let mut actual = base(4);
        actual[0][0] += 10.0;
        actual[1][1] += 10.0;
        actual[2][0] += 10.0;
        actual[2][1] += 10.0;

        let flags = classifier().classify(&forecast, &actual);
        assert_eq!(flags.leak, vec![false, false, true, false]);
        assert_eq!(flags.percentages().leak, 25.0);
        assert!(flags.percentages().leak <= percent(&flags.pressure).min(percent(&flags.flow_rate)));
    }

    #[test]
    fn threshold_is_strict() {
        let forecast = base(1);
        let mut actual = base(1);
        actual[0][2] -= 5.0;
        actual[0][3] += 2.0;

        let flags = classifier().classify(&forecast, &actual);
        assert_eq!(flags.water_quality, vec![false]);
        assert_eq!(flags.temperature, vec![false]);
    }

    #[test]
    fn compares_only_the_overlap() {
        let flags = classifier().classify(&base(5), &base(3));
        assert_eq!(flags.len(), 3);

        let empty = classifier().classify(&base(5), &[]);
        assert!(empty.is_empty());
        let pct = empty.percentages();
        assert_eq!((pct.leak, pct.water_quality, pct.temperature), (0.0, 0.0, 0.0));
    }

    #[test]
    fn feature_accessor_matches_fields() {
        let mut actual = base(2);
        actual[1][3] = 40.0;
        let flags = classifier().classify(&base(2), &actual);
        assert_eq!(flags.feature(Feature::Temperature), &[false, true]);
        assert_eq!(flags.feature(Feature::Pressure), &[false, false]);
    }

    #[test]
    fn invalid_thresholds_rejected() {
        let bad = FeatureThresholds { pressure: 0.0, ..FeatureThresholds::default() };
        assert!(bad.validate().is_err());

        let inverted = TemperatureThresholdPolicy {
            extreme_low: 35.0,
            ..TemperatureThresholdPolicy::default()
        };
        assert!(inverted.validate().is_err());
        assert!(TemperatureThresholdPolicy::default().validate().is_ok());
    }
}
