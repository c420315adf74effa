//! Recursive Multi-Step Forecasting
//!
//! ## Algorithm
//!
//! ```text
//! window = last time_step observations of the training split
//! repeat horizon times:
//!     next = model.predict(window)
//!     forecast.push(next)
//!     window.drop_oldest(); window.push(next)
//! ```
//!
//! The window is fed the model's own predictions, never the true values,
//! even when those are known. Errors compound over the horizon; that is the
//! behaviour being measured, not a defect.
//!
//! The loop is bounded by `horizon` and runs over a fixed-capacity
//! [`WindowBuffer`], so memory stays constant however far it forecasts.

use aquaguard_core::{CancelToken, FeatureVector, ForecastError, ForecastResult, WindowBuffer};

use crate::forecaster::Forecaster;

/// Produce exactly `horizon` predictions following `history`
///
/// `history` must hold at least `model.time_step()` observations; only the
/// newest `time_step` of them seed the window. `cancel` is polled before
/// every step.
pub fn forecast_recursive<F: Forecaster + ?Sized>(
    model: &F,
    history: &[FeatureVector],
    horizon: usize,
    cancel: &CancelToken,
) -> ForecastResult<Vec<FeatureVector>> {
    let time_step = model.time_step();
    if history.len() < time_step {
        return Err(ForecastError::WindowShape {
            expected: time_step,
            actual: history.len(),
        });
    }

    let mut window = WindowBuffer::from_slice(time_step, history);
    let mut forecast = Vec::with_capacity(horizon);
    let mut inputs = Vec::with_capacity(time_step);

    for _ in 0..horizon {
        cancel.check("forecast")?;

        inputs.clear();
        inputs.extend(window.iter().copied());
        let next = model.predict(&inputs)?;

        forecast.push(next);
        window.push(next);
    }

    log::debug!("recursive forecast produced {} steps", forecast.len());
    Ok(forecast)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecaster::LastValueForecaster;
    use std::cell::RefCell;

    /// Adds one to the newest observation
    struct Increment {
        time_step: usize,
    }

    impl Forecaster for Increment {
        fn time_step(&self) -> usize {
            self.time_step
        }

        fn predict(&self, window: &[FeatureVector]) -> ForecastResult<FeatureVector> {
            let last = window[window.len() - 1];
            Ok([last[0] + 1.0, last[1] + 1.0, last[2] + 1.0, last[3] + 1.0])
        }
    }

    /// Records every window it is asked about
    struct Recorder {
        seen: RefCell<Vec<Vec<FeatureVector>>>,
    }

    impl Forecaster for Recorder {
        fn time_step(&self) -> usize {
            3
        }

        fn predict(&self, window: &[FeatureVector]) -> ForecastResult<FeatureVector> {
            self.seen.borrow_mut().push(window.to_vec());
            Ok([100.0; 4])
        }
    }

    fn history(n: usize) -> Vec<FeatureVector> {
        (0..n).map(|i| [i as f64; 4]).collect()
    }

    #[test]
    fn produces_exactly_horizon_steps() {
        let model = LastValueForecaster::new(4);
        for horizon in [0, 1, 7, 120] {
            let out = forecast_recursive(&model, &history(10), horizon, &CancelToken::new()).unwrap();
            assert_eq!(out.len(), horizon);
        }
    }

    #[test]
    fn feeds_predictions_back() {
        let model = Increment { time_step: 2 };
        let out = forecast_recursive(&model, &history(5), 3, &CancelToken::new()).unwrap();

        let firsts: Vec<f64> = out.iter().map(|v| v[0]).collect();
        assert_eq!(firsts, vec![5.0, 6.0, 7.0]);
    }

    #[test]
    fn window_drops_oldest_and_appends_prediction() {
        let model = Recorder { seen: RefCell::new(Vec::new()) };
        forecast_recursive(&model, &history(5), 3, &CancelToken::new()).unwrap();

        let seen = model.seen.into_inner();
        let firsts: Vec<Vec<f64>> = seen.iter().map(|w| w.iter().map(|v| v[0]).collect()).collect();
        assert_eq!(
            firsts,
            vec![
                vec![2.0, 3.0, 4.0],
                vec![3.0, 4.0, 100.0],
                vec![4.0, 100.0, 100.0],
            ]
        );
    }

    #[test]
    fn short_history_is_rejected() {
        let model = LastValueForecaster::new(4);
        let err = forecast_recursive(&model, &history(3), 5, &CancelToken::new()).unwrap_err();
        assert_eq!(err, ForecastError::WindowShape { expected: 4, actual: 3 });
    }

    #[test]
    fn cancellation_stops_the_loop() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let model = LastValueForecaster::new(2);
        let err = forecast_recursive(&model, &history(4), 5, &cancel).unwrap_err();
        assert_eq!(err, ForecastError::Cancelled { stage: "forecast" });
    }
}
