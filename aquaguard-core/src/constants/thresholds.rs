//! Anomaly Thresholds
//!
//! A feature is flagged at a step when `|observed - forecast|` exceeds its
//! threshold, in physical units.

// ===== FIXED THRESHOLDS =====

/// Pressure deviation tolerated before flagging.
pub const PRESSURE_THRESHOLD: f64 = 5.0;

/// Flow rate deviation tolerated before flagging.
pub const FLOW_RATE_THRESHOLD: f64 = 5.0;

/// Water quality index deviation tolerated before flagging.
pub const WATER_QUALITY_THRESHOLD: f64 = 5.0;

// ===== AMBIENT-DEPENDENT TEMPERATURE THRESHOLD =====

/// Temperature tolerance under moderate ambient conditions (°C).
pub const TEMPERATURE_THRESHOLD_NARROW_C: f64 = 2.0;

/// Temperature tolerance under extreme ambient conditions (°C).
///
/// Pipe water follows the air more closely in heat waves and cold snaps,
/// so forecast error naturally grows.
pub const TEMPERATURE_THRESHOLD_WIDE_C: f64 = 5.0;

/// Ambient at or above this is extreme (°C, inclusive).
pub const EXTREME_AMBIENT_HIGH_C: f64 = 30.0;

/// Ambient at or below this is extreme (°C, inclusive).
pub const EXTREME_AMBIENT_LOW_C: f64 = 10.0;

/// Ambient substituted when the weather lookup fails (°C).
pub const DEFAULT_AMBIENT_C: f64 = 20.0;
