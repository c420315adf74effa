//! Min-Max Feature Scaling
//!
//! ## Overview
//!
//! The forecaster trains on values in `[0, 1]`. [`MinMaxScaler`] learns a
//! per-feature `(min, range)` pair from the training split and maps every
//! feature independently:
//!
//! ```text
//! transform(x)         = (x - min) / range
//! inverse_transform(y) = y * range + min
//! ```
//!
//! ## Rules
//!
//! 1. **Fit on training data only.** Held-out observations never influence
//!    the parameters; otherwise the test split leaks into the model.
//! 2. **Exact inverse.** `inverse_transform(transform(x)) == x` up to
//!    floating-point rounding.
//! 3. **No clipping.** Values outside the fitted range extrapolate linearly
//!    (a pressure drop below the training minimum maps below 0). Clipping
//!    would hide exactly the deviations the classifier looks for.
//! 4. **Immutable after fit.** The parameters live for one run and are
//!    never refitted mid-run.
//!
//! ## Degenerate Features
//!
//! A feature that never changes has `range == 0`. The default
//! [`DegeneratePolicy::Reject`] fails the fit with
//! [`ForecastError::DegenerateInput`]. [`DegeneratePolicy::UnitRange`]
//! substitutes a range of 1 instead, so a constant feature maps to 0 and
//! still inverts exactly; this is useful for perfectly steady lines and
//! synthetic data.

use serde::{Deserialize, Serialize};

use crate::errors::{ForecastError, ForecastResult};
use crate::reading::{Feature, FeatureVector, FEATURE_COUNT};

/// What to do with a zero-variance feature during [`MinMaxScaler::fit`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegeneratePolicy {
    /// Fail with [`ForecastError::DegenerateInput`]
    #[default]
    Reject,
    /// Use a range of 1 for the constant feature
    UnitRange,
}

/// Per-feature min-max scaler
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinMaxScaler {
    min: FeatureVector,
    range: FeatureVector,
}

impl MinMaxScaler {
    /// Fit scaling parameters from the training split
    pub fn fit(training: &[FeatureVector], policy: DegeneratePolicy) -> ForecastResult<Self> {
        if training.is_empty() {
            return Err(ForecastError::DegenerateInput {
                feature: None,
                reason: "training split is empty",
            });
        }

        let mut min = [f64::INFINITY; FEATURE_COUNT];
        let mut max = [f64::NEG_INFINITY; FEATURE_COUNT];
        for row in training {
            for i in 0..FEATURE_COUNT {
                min[i] = min[i].min(row[i]);
                max[i] = max[i].max(row[i]);
            }
        }

        let mut range = [0.0; FEATURE_COUNT];
        for feature in Feature::ALL {
            let i = feature.index();
            let span = max[i] - min[i];

            range[i] = if span > 0.0 {
                span
            } else {
                match policy {
                    DegeneratePolicy::Reject => {
                        return Err(ForecastError::DegenerateInput {
                            feature: Some(feature),
                            reason: "feature has zero variance in the training split",
                        });
                    }
                    DegeneratePolicy::UnitRange => {
                        log::debug!("{} is constant at {}; using unit range", feature, min[i]);
                        1.0
                    }
                }
            };

            log::debug!("scaler fit {}: min={} max={}", feature, min[i], max[i]);
        }

        Ok(Self { min, range })
    }

    /// Scale one observation into the fitted range
    pub fn transform_one(&self, row: &FeatureVector) -> FeatureVector {
        let mut out = [0.0; FEATURE_COUNT];
        for i in 0..FEATURE_COUNT {
            out[i] = (row[i] - self.min[i]) / self.range[i];
        }
        out
    }

    /// Undo [`MinMaxScaler::transform_one`]
    pub fn inverse_one(&self, row: &FeatureVector) -> FeatureVector {
        let mut out = [0.0; FEATURE_COUNT];
        for i in 0..FEATURE_COUNT {
            out[i] = row[i] * self.range[i] + self.min[i];
        }
        out
    }

    /// Scale a sequence, preserving order
    pub fn transform(&self, data: &[FeatureVector]) -> Vec<FeatureVector> {
        data.iter().map(|row| self.transform_one(row)).collect()
    }

    /// Restore physical units for a sequence, preserving order
    pub fn inverse_transform(&self, data: &[FeatureVector]) -> Vec<FeatureVector> {
        data.iter().map(|row| self.inverse_one(row)).collect()
    }

    /// Fitted per-feature minimum
    pub fn data_min(&self) -> FeatureVector {
        self.min
    }

    /// Fitted per-feature maximum
    pub fn data_max(&self) -> FeatureVector {
        let mut max = [0.0; FEATURE_COUNT];
        for i in 0..FEATURE_COUNT {
            max[i] = self.min[i] + self.range[i];
        }
        max
    }

    /// Per-feature divisor used by the transform
    pub fn data_range(&self) -> FeatureVector {
        self.range
    }
}
