//! Sequence Forecaster Contracts
//!
//! ## Overview
//!
//! A forecaster maps a window of `time_step` normalized observations to the
//! next normalized observation. Forecasters are built fresh for every
//! pipeline run by a [`Trainer`]; nothing carries over between runs, which is
//! what makes a stub trainer a drop-in replacement in tests.
//!
//! ```text
//! Trainer::train(windows) ─▶ (Forecaster, TrainingReport)
//!                                  │
//!                                  ▼
//!               Forecaster::predict(window) ─▶ next vector
//! ```
//!
//! ## Provided Implementations
//!
//! | Trainer        | Model                  | Notes                            |
//! |----------------|------------------------|----------------------------------|
//! | `LstmTrainer`  | `LstmForecaster`       | Stacked LSTM, Adam, MSE          |
//! | `NaiveTrainer` | `LastValueForecaster`  | Persistence baseline, no fitting |
//!
//! ## Window Preconditions
//!
//! `predict` must never change input length or feature order. A window
//! whose length differs from the model's `time_step` is rejected with
//! [`ForecastError::WindowShape`]; feature count is fixed by the type.

use aquaguard_core::{CancelToken, FeatureVector, ForecastError, ForecastResult, Window, FEATURE_COUNT};
use serde::Serialize;

/// A trained one-step-ahead model
pub trait Forecaster {
    /// Window length the model was trained on
    fn time_step(&self) -> usize;

    /// Predict the observation that follows `window`
    fn predict(&self, window: &[FeatureVector]) -> ForecastResult<FeatureVector>;
}

impl<F: Forecaster + ?Sized> Forecaster for &F {
    fn time_step(&self) -> usize {
        (**self).time_step()
    }

    fn predict(&self, window: &[FeatureVector]) -> ForecastResult<FeatureVector> {
        (**self).predict(window)
    }
}

impl<F: Forecaster + ?Sized> Forecaster for Box<F> {
    fn time_step(&self) -> usize {
        (**self).time_step()
    }

    fn predict(&self, window: &[FeatureVector]) -> ForecastResult<FeatureVector> {
        (**self).predict(window)
    }
}

/// Builds a [`Forecaster`] from training windows
pub trait Trainer {
    /// Model produced by this trainer
    type Model: Forecaster;

    /// Fit a fresh model on `windows`, each of length `time_step`
    ///
    /// Implementations that iterate must poll `cancel` between iterations.
    fn train(
        &self,
        windows: &[Window<'_>],
        time_step: usize,
        cancel: &CancelToken,
    ) -> ForecastResult<(Self::Model, TrainingReport)>;
}

/// What happened during training
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingReport {
    /// Windows available before the validation split
    pub windows: usize,
    /// Windows the model was fitted on
    pub training_windows: usize,
    /// Windows held out for validation
    pub validation_windows: usize,
    /// Completed epochs
    pub epochs_run: usize,
    /// Mean squared error over the training windows after the last epoch
    pub final_loss: f64,
    /// Mean squared error over the validation windows, if any were held out
    pub validation_loss: Option<f64>,
    /// Trainable scalars in the model
    pub parameters: usize,
}

/// Reject a window whose length differs from `time_step`
pub fn check_window(window: &[FeatureVector], time_step: usize) -> ForecastResult<()> {
    if window.len() != time_step {
        return Err(ForecastError::WindowShape {
            expected: time_step,
            actual: window.len(),
        });
    }
    Ok(())
}

/// Mean squared error between two equally long vector sequences
pub fn mean_squared_error(predicted: &[FeatureVector], actual: &[FeatureVector]) -> f64 {
    let n = predicted.len().min(actual.len());
    if n == 0 {
        return 0.0;
    }

    let total: f64 = predicted
        .iter()
        .zip(actual)
        .map(|(p, a)| (0..FEATURE_COUNT).map(|i| (p[i] - a[i]).powi(2)).sum::<f64>())
        .sum();
    total / (n * FEATURE_COUNT) as f64
}

/// Persistence model: the next observation equals the last one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LastValueForecaster {
    time_step: usize,
}

impl LastValueForecaster {
    pub fn new(time_step: usize) -> Self {
        Self { time_step }
    }
}

impl Forecaster for LastValueForecaster {
    fn time_step(&self) -> usize {
        self.time_step
    }

    fn predict(&self, window: &[FeatureVector]) -> ForecastResult<FeatureVector> {
        check_window(window, self.time_step)?;
        window.last().copied().ok_or(ForecastError::WindowShape {
            expected: self.time_step,
            actual: 0,
        })
    }
}

/// Trainer for [`LastValueForecaster`]; fits nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NaiveTrainer;

impl Trainer for NaiveTrainer {
    type Model = LastValueForecaster;

    fn train(
        &self,
        windows: &[Window<'_>],
        time_step: usize,
        cancel: &CancelToken,
    ) -> ForecastResult<(Self::Model, TrainingReport)> {
        cancel.check("training")?;
        let model = LastValueForecaster::new(time_step);

        let mut predicted = Vec::with_capacity(windows.len());
        let mut targets = Vec::with_capacity(windows.len());
        for window in windows {
            predicted.push(model.predict(window.inputs)?);
            targets.push(*window.target);
        }

        let report = TrainingReport {
            windows: windows.len(),
            training_windows: windows.len(),
            validation_windows: 0,
            epochs_run: 0,
            final_loss: mean_squared_error(&predicted, &targets),
            validation_loss: None,
            parameters: 0,
        };
        log::debug!("persistence baseline loss {:.6} over {} windows", report.final_loss, report.windows);
        Ok((model, report))
    }
}
