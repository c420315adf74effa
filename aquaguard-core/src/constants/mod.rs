//! Constants for AquaGuard Core
//!
//! Every number the forecasting pipeline relies on lives here with a note on
//! where it comes from. Configuration structs take their defaults from these
//! constants, so changing a default is a one-line edit.
//!
//! ## Organization
//!
//! - **Pipeline**: split sizes, window length, model and training defaults
//! - **Thresholds**: anomaly tolerances and the ambient-driven temperature rule
//! - **Sensors**: physical operating ranges of the field sensors
//! - **Maintenance**: trend limits for the maintenance planner

/// Split sizes, window length and training hyper-parameters.
pub mod pipeline;

/// Anomaly thresholds and ambient temperature bands.
pub mod thresholds;

/// Physical operating ranges of the water network sensors.
pub mod sensors;

/// Limits used to project the next maintenance date.
pub mod maintenance;

pub use pipeline::{DEFAULT_HORIZON, DEFAULT_TIME_STEP, DEFAULT_TRAIN_SIZE};

pub use thresholds::{
    DEFAULT_AMBIENT_C, EXTREME_AMBIENT_HIGH_C, EXTREME_AMBIENT_LOW_C,
    FLOW_RATE_THRESHOLD, PRESSURE_THRESHOLD, TEMPERATURE_THRESHOLD_NARROW_C,
    TEMPERATURE_THRESHOLD_WIDE_C, WATER_QUALITY_THRESHOLD,
};
