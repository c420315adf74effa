//! Pipeline Defaults
//!
//! The defaults reproduce the field deployment: the latest 500 readings are
//! analysed, the first 380 train the model and the final 120 are held out and
//! compared against a 120-step recursive forecast.

// ===== SPLIT AND WINDOW =====

/// Number of past observations fed to the forecaster per prediction.
pub const DEFAULT_TIME_STEP: usize = 20;

/// Readings used to fit the scaler and train the forecaster.
pub const DEFAULT_TRAIN_SIZE: usize = 380;

/// Steps forecast recursively past the end of the training split.
///
/// Also the length of the held-out comparison split.
pub const DEFAULT_HORIZON: usize = 120;

// ===== MODEL =====

/// Hidden units per LSTM layer.
pub const DEFAULT_HIDDEN_SIZE: usize = 50;

/// Stacked LSTM layers before the dense output layer.
pub const DEFAULT_NUM_LAYERS: usize = 2;

// ===== TRAINING =====

/// Full passes over the training windows.
pub const DEFAULT_EPOCHS: usize = 50;

/// Windows per optimiser step.
pub const DEFAULT_BATCH_SIZE: usize = 32;

/// Adam step size.
pub const DEFAULT_LEARNING_RATE: f64 = 0.001;

/// Fraction of windows (taken from the end) held out for validation loss.
pub const DEFAULT_VALIDATION_SPLIT: f64 = 0.1;

/// Global gradient norm ceiling.
///
/// Recurrent nets on short windows occasionally spike; clipping keeps a
/// single bad batch from blowing up the weights.
pub const DEFAULT_CLIP_NORM: f64 = 1.0;

/// Seed for weight initialisation and batch shuffling.
pub const DEFAULT_SEED: u64 = 42;
