//! Error Types for the Forecasting and Anomaly Pipeline
//!
//! ## Error Categories
//!
//! ### Input problems (caller must supply different data)
//! - `MalformedReading`: a record is missing a feature, has a non-numeric or
//!   non-finite value, or an unparsable timestamp. The whole run is rejected;
//!   window alignment needs a complete, gap-free feature set.
//! - `InsufficientData`: fewer readings than `train_size + horizon`, or a
//!   training split too short to produce a single window.
//! - `DegenerateInput`: the training split is empty or a feature never
//!   changes, so min-max scaling would divide by zero.
//!
//! ### Caller mistakes
//! - `WindowShape`: `predict` received a window of the wrong length.
//! - `InvalidConfig`: a configuration value cannot produce a meaningful run.
//!
//! ### Run-time outcomes
//! - `Training`: the optimiser diverged.
//! - `Cancelled`: the caller's cancellation token fired between epochs or
//!   forecast steps.
//!
//! Zero-length comparison regions are *not* errors. They degrade to 0% and
//! are reported as [`ForecastWarning::InsufficientOverlap`] inside the run's
//! summary.
//!
//! ## Error Handling Strategy
//!
//! ```rust
//! use aquaguard_core::ForecastError;
//!
//! fn status_for(err: &ForecastError) -> u16 {
//!     match err {
//!         ForecastError::InsufficientData { .. } => 400,
//!         ForecastError::MalformedReading { .. }
//!         | ForecastError::DegenerateInput { .. } => 422,
//!         ForecastError::Cancelled { .. } => 503,
//!         _ => 500,
//!     }
//! }
//! # assert_eq!(status_for(&ForecastError::InsufficientData { required: 500, available: 400 }), 400);
//! ```

use serde::Serialize;
use thiserror_no_std::Error;

use crate::reading::Feature;

/// Result type for pipeline operations
pub type ForecastResult<T> = Result<T, ForecastError>;

/// Everything that can stop a pipeline run
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    /// Scaling parameters cannot be fitted
    #[error("Degenerate input for {feature:?}: {reason}")]
    DegenerateInput {
        /// Offending feature, `None` when the whole split is empty
        feature: Option<Feature>,
        reason: &'static str,
    },

    /// Not enough readings for the configured split
    #[error("Insufficient data: need {required}, have {available}")]
    InsufficientData {
        /// Minimum number of readings needed
        required: usize,
        /// Number of readings actually supplied
        available: usize,
    },

    /// A reading is incomplete or not numeric
    #[error("Malformed reading at index {index}: {reason}")]
    MalformedReading {
        /// Position of the offending record in the caller's input
        index: usize,
        reason: String,
    },

    /// A forecast window does not match the model's `time_step`
    #[error("Window has {actual} steps, model expects {expected}")]
    WindowShape {
        expected: usize,
        actual: usize,
    },

    /// Configuration cannot produce a meaningful run
    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        reason: String,
    },

    /// Training failed to converge to finite parameters
    #[error("Training failed: {reason}")]
    Training {
        reason: String,
    },

    /// Cooperative cancellation observed
    #[error("Cancelled during {stage}")]
    Cancelled {
        stage: &'static str,
    },
}

impl ForecastError {
    /// Shorthand for [`ForecastError::InvalidConfig`]
    pub fn config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig { reason: reason.into() }
    }
}

/// Non-fatal conditions carried alongside a successful result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastWarning {
    /// Forecast and held-out data did not overlap; percentages reported as 0
    InsufficientOverlap,
}

impl core::fmt::Display for ForecastWarning {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InsufficientOverlap => {
                f.write_str("forecast and observed data do not overlap; percentages reported as 0")
            }
        }
    }
}
