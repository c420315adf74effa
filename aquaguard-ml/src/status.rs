//! Alert status as a plain value
//!
//! A run's summary maps to one [`SystemStatus`]. Deciding whether to notify
//! anyone needs the previous status too; the caller stores it wherever it
//! likes and asks [`StatusTransition::between`] what changed. Nothing here
//! remembers anything between calls.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::pipeline::AnomalySummary;

/// Percentage at which a condition becomes the reported status
pub const DEFAULT_ALERT_PERCENT: f64 = 50.0;

/// Network condition derived from one summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemStatus {
    Normal,
    PipeLeak,
    WaterQualityIssue,
    TemperatureIssue,
}

impl SystemStatus {
    /// Highest percentage at or above `alert_percent` wins; ties go to leak,
    /// then water quality, then temperature
    pub fn from_summary(summary: &AnomalySummary, alert_percent: f64) -> Self {
        let ranked = [
            (Self::PipeLeak, summary.leak_percent),
            (Self::WaterQualityIssue, summary.water_quality_percent),
            (Self::TemperatureIssue, summary.temperature_percent),
        ];

        let mut status = Self::Normal;
        let mut best = f64::NEG_INFINITY;
        for (candidate, pct) in ranked {
            if pct >= alert_percent && pct > best {
                status = candidate;
                best = pct;
            }
        }
        status
    }

    /// Human-readable condition name
    pub fn label(self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::PipeLeak => "Pipe Leak",
            Self::WaterQualityIssue => "Water Quality Issue",
            Self::TemperatureIssue => "Temperature Issue",
        }
    }

    pub fn is_normal(self) -> bool {
        self == Self::Normal
    }

    /// Notification text for an issue
    pub fn alert_message(self) -> String {
        format!(
            "Alert, {} detected, please check the dashboard for further information",
            self.label()
        )
    }
}

impl fmt::Display for SystemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Change between two consecutive statuses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusTransition {
    /// Normal to an issue
    Alert(SystemStatus),
    /// An issue back to Normal
    Recovered,
    Unchanged,
}

impl StatusTransition {
    pub fn between(previous: SystemStatus, current: SystemStatus) -> Self {
        match (previous.is_normal(), current.is_normal()) {
            (true, false) => Self::Alert(current),
            (false, true) => Self::Recovered,
            _ => Self::Unchanged,
        }
    }

    /// Message to send, if this transition warrants one
    pub fn notification(&self) -> Option<String> {
        match self {
            Self::Alert(status) => Some(status.alert_message()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::AmbientOrigin;

    fn summary(leak: f64, wq: f64, temp: f64) -> AnomalySummary {
        AnomalySummary {
            ambient: 20.0,
            ambient_source: AmbientOrigin::Fixed,
            temperature_threshold: 2.0,
            leak_percent: leak,
            water_quality_percent: wq,
            temperature_percent: temp,
            compared: 120,
            warnings: vec![],
        }
    }

    #[test]
    fn below_alert_level_is_normal() {
        assert_eq!(SystemStatus::from_summary(&summary(49.9, 10.0, 0.0), 50.0), SystemStatus::Normal);
    }

    #[test]
    fn highest_percentage_wins() {
        let status = SystemStatus::from_summary(&summary(60.0, 80.0, 70.0), DEFAULT_ALERT_PERCENT);
        assert_eq!(status, SystemStatus::WaterQualityIssue);
    }

    #[test]
    fn ties_prefer_leak() {
        let status = SystemStatus::from_summary(&summary(75.0, 75.0, 75.0), DEFAULT_ALERT_PERCENT);
        assert_eq!(status, SystemStatus::PipeLeak);

        let status = SystemStatus::from_summary(&summary(0.0, 50.0, 50.0), DEFAULT_ALERT_PERCENT);
        assert_eq!(status, SystemStatus::WaterQualityIssue);
    }

    #[test]
    fn transitions() {
        use SystemStatus::*;

        assert_eq!(StatusTransition::between(Normal, PipeLeak), StatusTransition::Alert(PipeLeak));
        assert_eq!(StatusTransition::between(PipeLeak, Normal), StatusTransition::Recovered);
        assert_eq!(StatusTransition::between(PipeLeak, TemperatureIssue), StatusTransition::Unchanged);
        assert_eq!(StatusTransition::between(Normal, Normal), StatusTransition::Unchanged);
    }

    #[test]
    fn alert_message_names_the_condition() {
        let transition = StatusTransition::between(SystemStatus::Normal, SystemStatus::PipeLeak);
        assert_eq!(
            transition.notification().unwrap(),
            "Alert, Pipe Leak detected, please check the dashboard for further information"
        );
        assert!(StatusTransition::Recovered.notification().is_none());
    }
}
