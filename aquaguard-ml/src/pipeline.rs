//! Forecast-and-Compare Pipeline
//!
//! ## Overview
//!
//! One run turns a reading sequence and an ambient temperature into an
//! [`AnomalySummary`]:
//!
//! ```text
//! readings ──latest(train + horizon)──▶ raw vectors
//!     │
//!     ├─ train split ─▶ scaler.fit ─▶ transform ─▶ build_windows ─▶ trainer.train
//!     │                                   │                               │
//!     │                                   └── last time_step ─▶ forecast_recursive
//!     │                                                                   │
//!     │                                               inverse_transform ◀─┘
//!     │                                                       │
//!     └─ held-out split (physical units) ───────────▶ classifier.classify
//!                                                             │
//!                                                    AnomalySummary
//! ```
//!
//! ## Run Isolation
//!
//! [`ForecastPipeline::run`] takes `&self`, builds its scaler, windows and
//! model from scratch on every call and returns them inside [`PipelineRun`].
//! Two runs never share a model, so concurrent callers can share one
//! pipeline value.
//!
//! ## Held-Out Data
//!
//! The held-out split is compared in physical units as read. Scaling it and
//! inverting again is the identity up to rounding, so the pipeline skips the
//! round trip.

use std::fmt;

use aquaguard_core::constants::pipeline::{DEFAULT_HORIZON, DEFAULT_TIME_STEP, DEFAULT_TRAIN_SIZE};
use aquaguard_core::reading::to_feature_vectors;
use aquaguard_core::{
    build_windows, CancelToken, DegeneratePolicy, FeatureVector, ForecastError, ForecastResult, ForecastWarning,
    MinMaxScaler, ReadingSequence,
};
use serde::{Deserialize, Serialize};

use crate::classifier::{AnomalyClassifier, AnomalyFlags, FeatureThresholds, TemperatureThresholdPolicy};
use crate::forecaster::{Trainer, TrainingReport};
use crate::recursive::forecast_recursive;
use crate::training::{LstmTrainer, TrainingConfig};

/// Configuration for one pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Observations per model input window
    pub time_step: usize,
    /// Readings in the training split
    pub train_size: usize,
    /// Forecast steps, also the held-out split length
    pub horizon: usize,
    /// Handling of constant features during scaling
    pub degenerate_policy: DegeneratePolicy,
    /// Fixed tolerances for pressure, flow and water quality
    pub thresholds: FeatureThresholds,
    /// Ambient-driven temperature tolerance
    pub temperature_policy: TemperatureThresholdPolicy,
    /// LSTM hyper-parameters used by [`ForecastPipeline::lstm`]
    pub training: TrainingConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            time_step: DEFAULT_TIME_STEP,
            train_size: DEFAULT_TRAIN_SIZE,
            horizon: DEFAULT_HORIZON,
            degenerate_policy: DegeneratePolicy::default(),
            thresholds: FeatureThresholds::default(),
            temperature_policy: TemperatureThresholdPolicy::default(),
            training: TrainingConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn with_time_step(mut self, time_step: usize) -> Self {
        self.time_step = time_step;
        self
    }

    pub fn with_train_size(mut self, train_size: usize) -> Self {
        self.train_size = train_size;
        self
    }

    pub fn with_horizon(mut self, horizon: usize) -> Self {
        self.horizon = horizon;
        self
    }

    pub fn with_degenerate_policy(mut self, policy: DegeneratePolicy) -> Self {
        self.degenerate_policy = policy;
        self
    }

    pub fn with_thresholds(mut self, thresholds: FeatureThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_temperature_policy(mut self, policy: TemperatureThresholdPolicy) -> Self {
        self.temperature_policy = policy;
        self
    }

    pub fn with_training(mut self, training: TrainingConfig) -> Self {
        self.training = training;
        self
    }

    /// Readings a run needs: `train_size + horizon`
    pub fn required_readings(&self) -> usize {
        self.train_size.saturating_add(self.horizon)
    }

    /// Check split sizes and thresholds
    ///
    /// Training hyper-parameters are checked by the trainer that uses them.
    pub fn validate(&self) -> ForecastResult<()> {
        if self.time_step == 0 {
            return Err(ForecastError::config("time_step must be at least 1"));
        }
        if self.train_size <= self.time_step {
            return Err(ForecastError::config(format!(
                "train_size ({}) must exceed time_step ({})",
                self.train_size, self.time_step
            )));
        }
        self.thresholds.validate()?;
        self.temperature_policy.validate()
    }
}

/// Where the ambient temperature of a run came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmbientOrigin {
    /// Returned by the weather lookup
    Lookup,
    /// Substituted after a failed lookup
    Default,
    /// Supplied directly by the caller
    Fixed,
}

/// Ambient temperature plus its provenance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ambient {
    /// Degrees Celsius
    pub value: f64,
    pub origin: AmbientOrigin,
}

impl Ambient {
    pub fn lookup(value: f64) -> Self {
        Self { value, origin: AmbientOrigin::Lookup }
    }

    pub fn default_value(value: f64) -> Self {
        Self { value, origin: AmbientOrigin::Default }
    }

    pub fn fixed(value: f64) -> Self {
        Self { value, origin: AmbientOrigin::Fixed }
    }
}

/// Result of one run, ready for rendering
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnomalySummary {
    /// Ambient temperature used (°C)
    pub ambient: f64,
    pub ambient_source: AmbientOrigin,
    /// Temperature tolerance resolved from `ambient` (°C)
    pub temperature_threshold: f64,
    pub leak_percent: f64,
    pub water_quality_percent: f64,
    pub temperature_percent: f64,
    /// Indices compared between forecast and held-out data
    pub compared: usize,
    pub warnings: Vec<ForecastWarning>,
}

impl AnomalySummary {
    /// Summarize `flags`, warning when nothing could be compared
    pub fn from_flags(ambient: Ambient, temperature_threshold: f64, flags: &AnomalyFlags) -> Self {
        let mut warnings = Vec::new();
        if flags.is_empty() {
            log::warn!("forecast and held-out data do not overlap; reporting 0%");
            warnings.push(ForecastWarning::InsufficientOverlap);
        }

        let pct = flags.percentages();
        Self {
            ambient: ambient.value,
            ambient_source: ambient.origin,
            temperature_threshold,
            leak_percent: pct.leak,
            water_quality_percent: pct.water_quality,
            temperature_percent: pct.temperature,
            compared: flags.len(),
            warnings,
        }
    }

    /// Plain-text report
    pub fn render_text(&self) -> String {
        self.to_string()
    }

    /// Pretty-printed JSON payload
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for AnomalySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Ambient Temperature (from API): {} °C", self.ambient)?;
        // tolerance always renders with a fractional part, e.g. `5.0`
        writeln!(f, "Dynamic Temperature Anomaly Threshold: {:?} °C", self.temperature_threshold)?;
        writeln!(f)?;
        writeln!(f, "Anomaly Summary:")?;
        writeln!(
            f,
            "Leakage (Pressure & Flow): {:.2}% of readings flagged as potential leakage",
            self.leak_percent
        )?;
        writeln!(f, "Water Quality Drop: {:.2}% of readings flagged", self.water_quality_percent)?;
        write!(
            f,
            "Temperature Anomaly (with ambient adjustment): {:.2}% of readings flagged",
            self.temperature_percent
        )
    }
}

/// Everything one run produced
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineRun {
    pub summary: AnomalySummary,
    /// Forecast in physical units, `horizon` entries
    pub forecast: Vec<FeatureVector>,
    /// Held-out observations the forecast was compared against
    pub actual: Vec<FeatureVector>,
    pub flags: AnomalyFlags,
    pub scaler: MinMaxScaler,
    pub training: TrainingReport,
}

/// Forecast-and-compare pipeline over an injectable trainer
#[derive(Debug, Clone)]
pub struct ForecastPipeline<T> {
    config: PipelineConfig,
    trainer: T,
}

impl ForecastPipeline<LstmTrainer> {
    /// Pipeline training an LSTM with `config.training`
    pub fn lstm(config: PipelineConfig) -> Self {
        let trainer = LstmTrainer::new(config.training.clone());
        Self { config, trainer }
    }
}

impl<T: Trainer> ForecastPipeline<T> {
    pub fn new(config: PipelineConfig, trainer: T) -> Self {
        Self { config, trainer }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn trainer(&self) -> &T {
        &self.trainer
    }

    /// Run once over `readings`
    ///
    /// Uses the most recent `train_size + horizon` readings. Fails with
    /// `InsufficientData` before any work when fewer exist.
    pub fn run(&self, readings: &ReadingSequence, ambient: Ambient, cancel: &CancelToken) -> ForecastResult<PipelineRun> {
        let config = &self.config;
        config.validate()?;

        let required = config.required_readings();
        if readings.len() < required {
            return Err(ForecastError::InsufficientData {
                required,
                available: readings.len(),
            });
        }

        let raw = to_feature_vectors(readings.latest(required));
        let (train_raw, held_out) = raw.split_at(config.train_size);

        let scaler = MinMaxScaler::fit(train_raw, config.degenerate_policy)?;
        let train_scaled = scaler.transform(train_raw);

        let windows = build_windows(&train_scaled, config.time_step);
        if windows.is_empty() {
            return Err(ForecastError::InsufficientData {
                required: config.time_step + 1,
                available: train_scaled.len(),
            });
        }

        let (model, training) = self.trainer.train(&windows, config.time_step, cancel)?;
        let forecast_scaled = forecast_recursive(&model, &train_scaled, config.horizon, cancel)?;
        let forecast = scaler.inverse_transform(&forecast_scaled);
        let actual = held_out.to_vec();

        let temperature_threshold = config.temperature_policy.resolve(ambient.value);
        log::info!(
            "ambient {:.1} °C ({:?}) -> temperature threshold {} °C",
            ambient.value,
            ambient.origin,
            temperature_threshold
        );

        let classifier = AnomalyClassifier::new(&config.thresholds, temperature_threshold);
        let flags = classifier.classify(&forecast, &actual);
        let summary = AnomalySummary::from_flags(ambient, temperature_threshold, &flags);

        log::info!(
            "anomaly summary over {} steps: leak {:.2}%, water quality {:.2}%, temperature {:.2}%",
            summary.compared,
            summary.leak_percent,
            summary.water_quality_percent,
            summary.temperature_percent
        );

        Ok(PipelineRun {
            summary,
            forecast,
            actual,
            flags,
            scaler,
            training,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecaster::NaiveTrainer;
    use aquaguard_core::time::MS_PER_HOUR;
    use aquaguard_core::Reading;

    fn readings(n: usize) -> ReadingSequence {
        let rows = (0..n)
            .map(|i| {
                let t = i as f64;
                Reading::new(
                    i as i64 * MS_PER_HOUR,
                    [100.0 + (t * 0.5).sin(), 50.0 + (t * 0.3).cos(), 96.0 + (t * 0.2).sin(), 20.0 + (t * 0.1).sin()],
                )
            })
            .collect();
        ReadingSequence::from_readings(rows).unwrap()
    }

    fn small() -> PipelineConfig {
        PipelineConfig::default().with_time_step(5).with_train_size(40).with_horizon(10)
    }

    #[test]
    fn default_config_matches_field_deployment() {
        let config = PipelineConfig::default();
        assert_eq!(config.time_step, 20);
        assert_eq!(config.train_size, 380);
        assert_eq!(config.horizon, 120);
        assert_eq!(config.required_readings(), 500);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_unusable_split() {
        let zero = PipelineConfig::default().with_time_step(0);
        assert!(matches!(zero.validate(), Err(ForecastError::InvalidConfig { .. })));

        let short = PipelineConfig::default().with_time_step(20).with_train_size(20);
        assert!(matches!(short.validate(), Err(ForecastError::InvalidConfig { .. })));
    }

    #[test]
    fn insufficient_readings_fail_before_training() {
        let pipeline = ForecastPipeline::new(small(), NaiveTrainer);
        let err = pipeline.run(&readings(49), Ambient::fixed(20.0), &CancelToken::new()).unwrap_err();
        assert_eq!(err, ForecastError::InsufficientData { required: 50, available: 49 });
    }

    #[test]
    fn uses_latest_readings() {
        let pipeline = ForecastPipeline::new(small(), NaiveTrainer);
        let seq = readings(80);
        let run = pipeline.run(&seq, Ambient::fixed(20.0), &CancelToken::new()).unwrap();

        assert_eq!(run.forecast.len(), 10);
        assert_eq!(run.actual.len(), 10);
        assert_eq!(run.actual[9], seq.last().unwrap().features());
        assert_eq!(run.summary.compared, 10);
    }

    #[test]
    fn zero_horizon_warns_instead_of_dividing() {
        let pipeline = ForecastPipeline::new(small().with_horizon(0), NaiveTrainer);
        let run = pipeline.run(&readings(40), Ambient::fixed(20.0), &CancelToken::new()).unwrap();

        assert_eq!(run.summary.compared, 0);
        assert_eq!(run.summary.leak_percent, 0.0);
        assert_eq!(run.summary.warnings, vec![ForecastWarning::InsufficientOverlap]);
    }

    #[test]
    fn text_report_layout() {
        let summary = AnomalySummary {
            ambient: 31.5,
            ambient_source: AmbientOrigin::Lookup,
            temperature_threshold: 5.0,
            leak_percent: 12.5,
            water_quality_percent: 0.0,
            temperature_percent: 100.0 / 3.0,
            compared: 120,
            warnings: vec![],
        };

        let expected = "Ambient Temperature (from API): 31.5 °C\n\
                        Dynamic Temperature Anomaly Threshold: 5.0 °C\n\
                        \n\
                        Anomaly Summary:\n\
                        Leakage (Pressure & Flow): 12.50% of readings flagged as potential leakage\n\
                        Water Quality Drop: 0.00% of readings flagged\n\
                        Temperature Anomaly (with ambient adjustment): 33.33% of readings flagged";
        assert_eq!(summary.render_text(), expected);

        let mild = AnomalySummary {
            ambient: 20.0,
            temperature_threshold: 2.0,
            ..summary
        };
        assert!(mild
            .render_text()
            .starts_with("Ambient Temperature (from API): 20 °C\nDynamic Temperature Anomaly Threshold: 2.0 °C\n"));
    }

    #[test]
    fn json_report_fields() {
        let pipeline = ForecastPipeline::new(small(), NaiveTrainer);
        let run = pipeline
            .run(&readings(50), Ambient::default_value(20.0), &CancelToken::new())
            .unwrap();

        let value: serde_json::Value = serde_json::from_str(&run.summary.to_json().unwrap()).unwrap();
        assert_eq!(value["ambient"], 20.0);
        assert_eq!(value["ambient_source"], "default");
        assert_eq!(value["temperature_threshold"], 2.0);
        assert_eq!(value["compared"], 10);
        for key in ["leak_percent", "water_quality_percent", "temperature_percent", "warnings"] {
            assert!(value.get(key).is_some(), "missing {}", key);
        }
    }
}
