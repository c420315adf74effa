//! Stub trainers for injecting known forecasters into the pipeline

use aquaguard_core::{CancelToken, FeatureVector, ForecastResult, Window};
use aquaguard_ml::forecaster::check_window;
use aquaguard_ml::{Forecaster, Trainer, TrainingReport};

/// Predicts the newest observation plus a fixed step, in scaled units
#[derive(Debug, Clone, Copy)]
pub struct DriftForecaster {
    pub time_step: usize,
    pub step: f64,
}

impl Forecaster for DriftForecaster {
    fn time_step(&self) -> usize {
        self.time_step
    }

    fn predict(&self, window: &[FeatureVector]) -> ForecastResult<FeatureVector> {
        check_window(window, self.time_step)?;
        let last = window[window.len() - 1];
        Ok([last[0] + self.step, last[1] + self.step, last[2] + self.step, last[3] + self.step])
    }
}

/// Trainer that skips fitting and hands out a [`DriftForecaster`]
#[derive(Debug, Clone, Copy)]
pub struct DriftTrainer {
    pub step: f64,
}

impl Trainer for DriftTrainer {
    type Model = DriftForecaster;

    fn train(
        &self,
        windows: &[Window<'_>],
        time_step: usize,
        cancel: &CancelToken,
    ) -> ForecastResult<(Self::Model, TrainingReport)> {
        cancel.check("training")?;
        let report = TrainingReport {
            windows: windows.len(),
            training_windows: windows.len(),
            validation_windows: 0,
            epochs_run: 0,
            final_loss: 0.0,
            validation_loss: None,
            parameters: 0,
        };
        Ok((DriftForecaster { time_step, step: self.step }, report))
    }
}
