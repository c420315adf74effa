//! LSTM training loop
//!
//! ## Procedure
//!
//! 1. Validate the configuration and every window's length
//! 2. Hold out the last `validation_split` fraction of windows
//! 3. For each epoch: poll the cancel token, shuffle the training windows
//!    with the seeded RNG, then run mini-batch forward, backward, clip and
//!    Adam update
//! 4. Report the final training loss and the validation loss
//!
//! Windows are not shuffled before the validation split; the held-out
//! windows are the most recent ones, which is the honest choice for time
//! series.
//!
//! ## Determinism
//!
//! Weight initialization and per-epoch shuffling both draw from a single
//! `StdRng` seeded with [`TrainingConfig::seed`]. Identical windows and an
//! identical config give a bit-identical model.

use aquaguard_core::constants::pipeline::{
    DEFAULT_BATCH_SIZE, DEFAULT_CLIP_NORM, DEFAULT_EPOCHS, DEFAULT_HIDDEN_SIZE, DEFAULT_LEARNING_RATE,
    DEFAULT_NUM_LAYERS, DEFAULT_SEED, DEFAULT_VALIDATION_SPLIT,
};
use aquaguard_core::{CancelToken, FeatureVector, ForecastError, ForecastResult, Window, FEATURE_COUNT};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::forecaster::{check_window, Forecaster, Trainer, TrainingReport};
use crate::lstm::{mse_loss, LstmNetwork};
use crate::optimizer::{clip_by_global_norm, Adam};

/// Hyper-parameters for [`LstmTrainer`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Units per LSTM layer
    pub hidden_size: usize,
    /// Stacked LSTM layers
    pub num_layers: usize,
    /// Epoch budget; the only knob bounding training time
    pub epochs: usize,
    /// Windows per gradient step
    pub batch_size: usize,
    /// Adam step size
    pub learning_rate: f64,
    /// Fraction of windows (taken from the end) held out for validation
    pub validation_split: f64,
    /// Maximum global gradient norm
    pub clip_norm: f64,
    /// RNG seed for initialization and shuffling
    pub seed: u64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            hidden_size: DEFAULT_HIDDEN_SIZE,
            num_layers: DEFAULT_NUM_LAYERS,
            epochs: DEFAULT_EPOCHS,
            batch_size: DEFAULT_BATCH_SIZE,
            learning_rate: DEFAULT_LEARNING_RATE,
            validation_split: DEFAULT_VALIDATION_SPLIT,
            clip_norm: DEFAULT_CLIP_NORM,
            seed: DEFAULT_SEED,
        }
    }
}

impl TrainingConfig {
    pub fn with_hidden_size(mut self, hidden_size: usize) -> Self {
        self.hidden_size = hidden_size;
        self
    }

    pub fn with_num_layers(mut self, num_layers: usize) -> Self {
        self.num_layers = num_layers;
        self
    }

    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_validation_split(mut self, validation_split: f64) -> Self {
        self.validation_split = validation_split;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Reject values that cannot train anything
    pub fn validate(&self) -> ForecastResult<()> {
        if self.hidden_size == 0 || self.num_layers == 0 {
            return Err(ForecastError::config("network needs at least one layer of one unit"));
        }
        if self.epochs == 0 {
            return Err(ForecastError::config("epochs must be at least 1"));
        }
        if self.batch_size == 0 {
            return Err(ForecastError::config("batch_size must be at least 1"));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(ForecastError::config(format!("learning_rate must be positive, got {}", self.learning_rate)));
        }
        if !(0.0..1.0).contains(&self.validation_split) {
            return Err(ForecastError::config(format!(
                "validation_split must be in [0, 1), got {}",
                self.validation_split
            )));
        }
        if self.clip_norm.is_nan() || self.clip_norm <= 0.0 {
            return Err(ForecastError::config(format!("clip_norm must be positive, got {}", self.clip_norm)));
        }
        Ok(())
    }
}

/// Trained stacked LSTM
#[derive(Debug, Clone)]
pub struct LstmForecaster {
    network: LstmNetwork,
    time_step: usize,
}

impl LstmForecaster {
    /// Underlying network
    pub fn network(&self) -> &LstmNetwork {
        &self.network
    }
}

impl Forecaster for LstmForecaster {
    fn time_step(&self) -> usize {
        self.time_step
    }

    fn predict(&self, window: &[FeatureVector]) -> ForecastResult<FeatureVector> {
        check_window(window, self.time_step)?;

        let inputs: Vec<Array2<f64>> = window
            .iter()
            .map(|row| Array2::from_shape_fn((1, FEATURE_COUNT), |(_, f)| row[f]))
            .collect();
        let output = self.network.forward(&inputs);

        let mut next = [0.0; FEATURE_COUNT];
        for (slot, value) in next.iter_mut().zip(output.row(0).iter()) {
            *slot = *value;
        }
        Ok(next)
    }
}

/// Fits an [`LstmForecaster`] with Adam on mean squared error
#[derive(Debug, Clone, Default)]
pub struct LstmTrainer {
    config: TrainingConfig,
}

impl LstmTrainer {
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }
}

/// Stack the selected windows into per-step batch matrices and a target matrix
fn batch_tensors(windows: &[Window<'_>], indices: &[usize], time_step: usize) -> (Vec<Array2<f64>>, Array2<f64>) {
    let rows = indices.len();
    let inputs = (0..time_step)
        .map(|t| Array2::from_shape_fn((rows, FEATURE_COUNT), |(b, f)| windows[indices[b]].inputs[t][f]))
        .collect();
    let targets = Array2::from_shape_fn((rows, FEATURE_COUNT), |(b, f)| windows[indices[b]].target[f]);
    (inputs, targets)
}

fn evaluate(network: &LstmNetwork, windows: &[Window<'_>], time_step: usize) -> f64 {
    let indices: Vec<usize> = (0..windows.len()).collect();
    let (inputs, targets) = batch_tensors(windows, &indices, time_step);
    mse_loss(&network.forward(&inputs), &targets).0
}

impl Trainer for LstmTrainer {
    type Model = LstmForecaster;

    fn train(
        &self,
        windows: &[Window<'_>],
        time_step: usize,
        cancel: &CancelToken,
    ) -> ForecastResult<(Self::Model, TrainingReport)> {
        let config = &self.config;
        config.validate()?;
        if time_step == 0 {
            return Err(ForecastError::config("time_step must be at least 1"));
        }
        // readings behind the windows are unknown here; no window means none usable
        if windows.is_empty() {
            return Err(ForecastError::InsufficientData {
                required: time_step + 1,
                available: 0,
            });
        }
        for window in windows {
            check_window(window.inputs, time_step)?;
        }

        let held_out = ((windows.len() as f64) * config.validation_split).floor() as usize;
        let held_out = if held_out >= windows.len() { 0 } else { held_out };
        let (training, validation) = windows.split_at(windows.len() - held_out);

        let mut rng = StdRng::seed_from_u64(config.seed);
        let mut network = LstmNetwork::new(
            FEATURE_COUNT,
            config.hidden_size,
            config.num_layers,
            FEATURE_COUNT,
            &mut rng,
        );
        let mut adam = Adam::new(config.learning_rate);

        log::info!(
            "training LSTM ({}x{}, {} parameters) on {} windows, {} held out",
            config.num_layers,
            config.hidden_size,
            network.parameter_count(),
            training.len(),
            validation.len()
        );

        let mut order: Vec<usize> = (0..training.len()).collect();
        let mut final_loss = f64::NAN;
        let mut epochs_run = 0;

        for epoch in 1..=config.epochs {
            cancel.check("training")?;
            order.shuffle(&mut rng);

            let mut total = 0.0;
            for batch in order.chunks(config.batch_size) {
                let (inputs, targets) = batch_tensors(training, batch, time_step);
                let (output, cache) = network.forward_train(&inputs);
                let (loss, d_output) = mse_loss(&output, &targets);

                let mut grads = network.backward(&cache, &d_output);
                clip_by_global_norm(&mut grads, config.clip_norm);
                adam.update(network.parameters_mut(), grads.tensors())?;

                total += loss * batch.len() as f64;
            }

            final_loss = total / training.len() as f64;
            if !final_loss.is_finite() {
                return Err(ForecastError::Training {
                    reason: format!("loss diverged at epoch {}", epoch),
                });
            }
            epochs_run = epoch;
            log::debug!("epoch {}/{}: loss={:.6}", epoch, config.epochs, final_loss);
        }

        let validation_loss = if validation.is_empty() {
            None
        } else {
            Some(evaluate(&network, validation, time_step))
        };

        log::info!(
            "training finished after {} epochs: loss={:.6} validation={:?}",
            epochs_run,
            final_loss,
            validation_loss
        );

        let report = TrainingReport {
            windows: windows.len(),
            training_windows: training.len(),
            validation_windows: validation.len(),
            epochs_run,
            final_loss,
            validation_loss,
            parameters: network.parameter_count(),
        };
        Ok((LstmForecaster { network, time_step }, report))
    }
}
