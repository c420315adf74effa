//! Sensor Operating Ranges
//!
//! Ranges the field station hardware reports within. Values outside them
//! are physically implausible for this network and are surfaced as
//! validation warnings; they are not rejected, because the forecaster is
//! exactly what should notice a pressure collapse.
//!
//! Source: clamp limits of the station firmware simulator.

/// Minimum line pressure.
pub const PRESSURE_MIN: f64 = 0.0;

/// Maximum line pressure.
pub const PRESSURE_MAX: f64 = 120.0;

/// Minimum flow rate.
pub const FLOW_RATE_MIN: f64 = 0.0;

/// Maximum flow rate.
pub const FLOW_RATE_MAX: f64 = 100.0;

/// Minimum water quality index.
pub const WATER_QUALITY_MIN: f64 = 0.0;

/// Maximum water quality index (100 = ideal).
pub const WATER_QUALITY_MAX: f64 = 100.0;

/// Minimum water temperature (°C).
pub const TEMPERATURE_MIN_C: f64 = -10.0;

/// Maximum water temperature (°C).
pub const TEMPERATURE_MAX_C: f64 = 40.0;
