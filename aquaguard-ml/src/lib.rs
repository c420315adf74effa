//! Forecasting and Anomaly Classification for Water Networks
//!
//! ## Overview
//!
//! This crate turns a reading sequence into an anomaly report by forecasting
//! what the network *should* have done and comparing it with what it did:
//!
//! 1. **Train**: fit a sequence model on the training split, one fresh model
//!    per run
//! 2. **Forecast**: roll the model forward over the horizon, feeding it its
//!    own predictions
//! 3. **Compare**: flag every step where a feature strays past its tolerance
//! 4. **Summarize**: report leak, water quality and temperature percentages
//!
//! ## Why Recursive Forecasting?
//!
//! A one-step-ahead model repeated on true history only ever sees one step
//! of its own error. Production has no true future to lean on, so the
//! forecast window is fed predictions instead. Errors compound across the
//! horizon, and the report reflects that honestly.
//!
//! ## Model
//!
//! ```text
//! window (time_step × 4) ─▶ LSTM(50) ─▶ LSTM(50) ─▶ Dense(4) ─▶ next vector
//! ```
//!
//! Trained with Adam on mean squared error in mini-batches, gradients clipped
//! by global norm. The [`Trainer`] trait lets a run use any model; the
//! persistence baseline [`NaiveTrainer`] is handy as a stand-in.
//!
//! ## Leak Detection
//!
//! Pressure and flow are flagged independently, but a *leak* is only
//! reported where both deviate at the same step. Water quality and
//! temperature are reported on their own. The temperature tolerance widens
//! when the ambient temperature is extreme.
//!
//! ## Example
//!
//! ```rust
//! use aquaguard_core::{CancelToken, Reading, ReadingSequence};
//! use aquaguard_ml::{Ambient, ForecastPipeline, NaiveTrainer, PipelineConfig};
//!
//! let readings: Vec<Reading> = (0..60)
//!     .map(|i| {
//!         let t = i as f64;
//!         Reading::new(i * 3_600_000, [100.0 + t.sin(), 50.0 + t.cos(), 96.0 + (t * 0.5).sin(), 20.0 + (t * 0.2).sin()])
//!     })
//!     .collect();
//! let sequence = ReadingSequence::from_readings(readings)?;
//!
//! let config = PipelineConfig::default().with_time_step(5).with_train_size(40).with_horizon(20);
//! let pipeline = ForecastPipeline::new(config, NaiveTrainer);
//! let run = pipeline.run(&sequence, Ambient::fixed(20.0), &CancelToken::new())?;
//!
//! assert_eq!(run.forecast.len(), 20);
//! println!("{}", run.summary);
//! # Ok::<(), aquaguard_core::ForecastError>(())
//! ```
//!
//! ## Beyond the Anomaly Report
//!
//! - [`maintenance`]: linear trend projection of the next service date
//! - [`status`]: map a summary to an alert status and decide whether it
//!   changed since the caller's last run

#![deny(unsafe_code)]

pub mod classifier;
pub mod forecaster;
pub mod lstm;
pub mod maintenance;
pub mod optimizer;
pub mod pipeline;
pub mod recursive;
pub mod status;
pub mod training;

pub use classifier::{AnomalyClassifier, AnomalyFlags, FeatureThresholds, FlagPercentages, TemperatureThresholdPolicy};
pub use forecaster::{Forecaster, LastValueForecaster, NaiveTrainer, Trainer, TrainingReport};
pub use lstm::LstmNetwork;
pub use maintenance::{plan_maintenance, MaintenanceLimits, MaintenancePlan, MaintenanceTrigger};
pub use optimizer::Adam;
pub use pipeline::{Ambient, AmbientOrigin, AnomalySummary, ForecastPipeline, PipelineConfig, PipelineRun};
pub use recursive::forecast_recursive;
pub use status::{StatusTransition, SystemStatus};
pub use training::{LstmForecaster, LstmTrainer, TrainingConfig};
