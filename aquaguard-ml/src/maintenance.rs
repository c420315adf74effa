//! Predictive Maintenance Planner
//!
//! Projects when the network will next need service by extrapolating the
//! trends since the last maintenance:
//!
//! 1. Take readings at or after the last maintenance (or all readings when
//!    no maintenance is on record)
//! 2. Fit least-squares lines of water quality and temperature against hours
//!    elapsed since that point
//! 3. Solve each line for the hour it crosses its limit; lines with zero
//!    slope never cross
//! 4. Keep crossings strictly in the future and report the earliest
//!
//! | Limit                | Default | Recommendation                   |
//! |----------------------|---------|----------------------------------|
//! | water quality floor  | 95      | corrosion inspection             |
//! | temperature ceiling  | 22 °C   | temperature regulation (high)    |
//! | temperature floor    | 18 °C   | temperature regulation (low)     |

use std::fmt;

use aquaguard_core::constants::maintenance::{TEMPERATURE_CEILING_C, TEMPERATURE_FLOOR_C, WATER_QUALITY_FLOOR};
use aquaguard_core::time::{add_hours, format_store_timestamp, hours_between};
use aquaguard_core::{Feature, ForecastError, ForecastResult, ReadingSequence, Timestamp};
use serde::{Deserialize, Serialize};

/// Trend limits that trigger maintenance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceLimits {
    pub water_quality_floor: f64,
    pub temperature_ceiling: f64,
    pub temperature_floor: f64,
}

impl Default for MaintenanceLimits {
    fn default() -> Self {
        Self {
            water_quality_floor: WATER_QUALITY_FLOOR,
            temperature_ceiling: TEMPERATURE_CEILING_C,
            temperature_floor: TEMPERATURE_FLOOR_C,
        }
    }
}

/// Which projected crossing triggers maintenance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceTrigger {
    WaterQualityDrop,
    TemperatureHigh,
    TemperatureLow,
}

impl MaintenanceTrigger {
    /// Operator-facing recommendation
    pub fn recommendation(self) -> &'static str {
        match self {
            Self::WaterQualityDrop => "Inspection for corrosion due to significant water quality drop.",
            Self::TemperatureHigh => {
                "Maintenance for temperature regulation to prevent pipe break (temperature too high)."
            }
            Self::TemperatureLow => {
                "Maintenance for temperature regulation to prevent pipe break (temperature too low)."
            }
        }
    }
}

/// Text reported when no trend crosses a limit
pub const NO_MAINTENANCE_NEEDED: &str = "No maintenance needed based on current trends.";

/// Least-squares line `y = slope * x + intercept`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearTrend {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearTrend {
    /// Fit a line through `(xs[i], ys[i])`
    ///
    /// With a single distinct `x` the slope is 0 and the line is the mean.
    /// Returns `None` for empty input.
    pub fn fit(xs: &[f64], ys: &[f64]) -> Option<Self> {
        let n = xs.len().min(ys.len());
        if n == 0 {
            return None;
        }

        let mean_x = xs[..n].iter().sum::<f64>() / n as f64;
        let mean_y = ys[..n].iter().sum::<f64>() / n as f64;

        let mut sxx = 0.0;
        let mut sxy = 0.0;
        for (x, y) in xs[..n].iter().zip(&ys[..n]) {
            sxx += (x - mean_x) * (x - mean_x);
            sxy += (x - mean_x) * (y - mean_y);
        }

        let slope = if sxx > 0.0 { sxy / sxx } else { 0.0 };
        Some(Self {
            slope,
            intercept: mean_y - slope * mean_x,
        })
    }

    /// Value of the line at `x`
    pub fn at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    /// `x` where the line reaches `level`, `None` for a flat line
    pub fn crossing(&self, level: f64) -> Option<f64> {
        if self.slope == 0.0 {
            return None;
        }
        Some((level - self.intercept) / self.slope)
    }
}

/// Projected maintenance point
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MaintenanceDue {
    pub trigger: MaintenanceTrigger,
    /// Hours after the last maintenance
    pub hours_after: f64,
    /// Projected date
    pub at: Timestamp,
}

/// Outcome of [`plan_maintenance`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaintenancePlan {
    /// Reference point of the trend fit
    pub last_maintenance: Timestamp,
    /// Readings used for the fit
    pub readings_used: usize,
    pub water_quality_trend: LinearTrend,
    pub temperature_trend: LinearTrend,
    /// Earliest future crossing, if any
    pub due: Option<MaintenanceDue>,
    /// When the plan was produced
    pub generated_at: Timestamp,
}

impl MaintenancePlan {
    /// Recommendation text for the earliest crossing
    pub fn recommendation(&self) -> &'static str {
        match self.due {
            Some(due) => due.trigger.recommendation(),
            None => NO_MAINTENANCE_NEEDED,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for MaintenancePlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Last maintenance timestamp: {}", format_store_timestamp(self.last_maintenance))?;
        match self.due {
            None => writeln!(f, "{}", NO_MAINTENANCE_NEEDED)?,
            Some(due) => {
                writeln!(f, "Predicted next maintenance date: {}", format_store_timestamp(due.at))?;
                writeln!(f, "Maintenance Recommendation: {}", due.trigger.recommendation())?;
            }
        }
        write!(f, "Time (current local time): {}", format_store_timestamp(self.generated_at))
    }
}

/// Project the next maintenance from trends since `last_maintenance`
///
/// `now` only stamps the plan. Fails with `InsufficientData` when fewer than
/// two readings fall at or after the reference point.
pub fn plan_maintenance(
    readings: &ReadingSequence,
    last_maintenance: Option<Timestamp>,
    limits: &MaintenanceLimits,
    now: Timestamp,
) -> ForecastResult<MaintenancePlan> {
    let reference = match last_maintenance.or_else(|| readings.first().map(|r| r.timestamp)) {
        Some(ts) => ts,
        None => return Err(ForecastError::InsufficientData { required: 2, available: 0 }),
    };

    let window = readings.since(reference);
    if window.len() < 2 {
        return Err(ForecastError::InsufficientData {
            required: 2,
            available: window.len(),
        });
    }

    let hours: Vec<f64> = window.iter().map(|r| hours_between(reference, r.timestamp)).collect();
    let quality: Vec<f64> = window.iter().map(|r| r.get(Feature::WaterQuality)).collect();
    let temperature: Vec<f64> = window.iter().map(|r| r.get(Feature::Temperature)).collect();

    let flat = LinearTrend { slope: 0.0, intercept: 0.0 };
    let water_quality_trend = LinearTrend::fit(&hours, &quality).unwrap_or(flat);
    let temperature_trend = LinearTrend::fit(&hours, &temperature).unwrap_or(flat);

    let candidates = [
        (MaintenanceTrigger::WaterQualityDrop, water_quality_trend.crossing(limits.water_quality_floor)),
        (MaintenanceTrigger::TemperatureHigh, temperature_trend.crossing(limits.temperature_ceiling)),
        (MaintenanceTrigger::TemperatureLow, temperature_trend.crossing(limits.temperature_floor)),
    ];

    // strict comparison keeps the first listed trigger on ties
    let mut due: Option<MaintenanceDue> = None;
    for (trigger, crossing) in candidates {
        let Some(hours_after) = crossing.filter(|h| h.is_finite() && *h > 0.0) else {
            continue;
        };
        // a crossing past any calendar date counts as never
        let Some(at) = add_hours(reference, hours_after) else {
            log::debug!("{:?} crossing {:.3e} h out is beyond the calendar", trigger, hours_after);
            continue;
        };
        if due.map_or(true, |d| hours_after < d.hours_after) {
            due = Some(MaintenanceDue {
                trigger,
                hours_after,
                at,
            });
        }
    }

    match due {
        Some(d) => log::info!("maintenance due {:.1} h after last service: {:?}", d.hours_after, d.trigger),
        None => log::info!("no maintenance trend crosses its limit"),
    }

    Ok(MaintenancePlan {
        last_maintenance: reference,
        readings_used: window.len(),
        water_quality_trend,
        temperature_trend,
        due,
        generated_at: now,
    })
}
