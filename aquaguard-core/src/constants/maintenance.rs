//! Maintenance Trend Limits
//!
//! The maintenance planner extrapolates linear trends since the last service
//! and reports when they cross these limits.

/// Water quality index below which corrosion inspection is due.
pub const WATER_QUALITY_FLOOR: f64 = 95.0;

/// Water temperature above which regulation maintenance is due (°C).
pub const TEMPERATURE_CEILING_C: f64 = 22.0;

/// Water temperature below which regulation maintenance is due (°C).
pub const TEMPERATURE_FLOOR_C: f64 = 18.0;
