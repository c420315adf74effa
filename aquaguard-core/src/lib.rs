//! Core data model for AquaGuard
//!
//! Holds everything the forecasting pipeline needs before a model gets
//! involved: validated reading sequences, min-max scaling, sliding training
//! windows, the fixed-capacity window used by recursive forecasting, and the
//! error taxonomy shared by every AquaGuard crate.
//!
//! Key constraints:
//! - Feature order is fixed: pressure, flow rate, water quality, temperature
//! - Scaling is fitted on the training split only and inverts exactly
//! - Nothing here keeps state between runs
//!
//! ```
//! use aquaguard_core::{build_windows, DegeneratePolicy, MinMaxScaler};
//!
//! let raw: Vec<[f64; 4]> = (0..30)
//!     .map(|i| [100.0 + i as f64, 50.0 - i as f64, 90.0 + (i % 5) as f64, 20.0 + (i % 3) as f64])
//!     .collect();
//!
//! let scaler = MinMaxScaler::fit(&raw, DegeneratePolicy::Reject)?;
//! let scaled = scaler.transform(&raw);
//! let windows = build_windows(&scaled, 20);
//! assert_eq!(windows.len(), 10);
//! # Ok::<(), aquaguard_core::ForecastError>(())
//! ```

#![deny(unsafe_code)]

pub mod buffer;
pub mod cancel;
pub mod constants;
pub mod errors;
pub mod reading;
pub mod scaler;
pub mod time;
pub mod window;

// Public API
pub use buffer::WindowBuffer;
pub use cancel::CancelToken;
pub use errors::{ForecastError, ForecastResult, ForecastWarning};
pub use reading::{Feature, FeatureVector, Reading, ReadingSequence, FEATURE_COUNT};
pub use scaler::{DegeneratePolicy, MinMaxScaler};
pub use time::Timestamp;
pub use window::{build_windows, window_count, Window};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
