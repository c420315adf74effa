//! Adam optimizer and gradient clipping

use aquaguard_core::{ForecastError, ForecastResult};
use ndarray::{ArrayD, ArrayViewD, ArrayViewMutD, Zip};

use crate::lstm::Gradients;

/// Adam with bias-corrected step size
#[derive(Debug, Clone)]
pub struct Adam {
    learning_rate: f64,
    beta1: f64,
    beta2: f64,
    epsilon: f64,
    step: i32,
    first_moment: Vec<ArrayD<f64>>,
    second_moment: Vec<ArrayD<f64>>,
}

impl Adam {
    /// Optimizer with the usual decay rates (0.9, 0.999)
    pub fn new(learning_rate: f64) -> Self {
        Self {
            learning_rate,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-7,
            step: 0,
            first_moment: Vec::new(),
            second_moment: Vec::new(),
        }
    }

    /// Number of updates applied so far
    pub fn steps(&self) -> i32 {
        self.step
    }

    /// Apply one update; `params` and `grads` must pair up by position
    ///
    /// Moment buffers are allocated on the first call and keyed by
    /// position from then on.
    pub fn update(&mut self, params: Vec<ArrayViewMutD<'_, f64>>, grads: Vec<ArrayViewD<'_, f64>>) -> ForecastResult<()> {
        if params.len() != grads.len() {
            return Err(ForecastError::Training {
                reason: format!("{} parameters but {} gradients", params.len(), grads.len()),
            });
        }

        if self.first_moment.is_empty() {
            self.first_moment = grads.iter().map(|g| ArrayD::zeros(g.raw_dim())).collect();
            self.second_moment = grads.iter().map(|g| ArrayD::zeros(g.raw_dim())).collect();
        }

        for (i, (param, grad)) in params.iter().zip(&grads).enumerate() {
            if param.shape() != grad.shape() || self.first_moment[i].shape() != grad.shape() {
                return Err(ForecastError::Training {
                    reason: format!("shape mismatch for parameter {}", i),
                });
            }
        }

        self.step += 1;
        let (b1, b2) = (self.beta1, self.beta2);
        let step_size = self.learning_rate * (1.0 - b2.powi(self.step)).sqrt() / (1.0 - b1.powi(self.step));
        let eps = self.epsilon;

        for ((param, grad), (m, v)) in params
            .into_iter()
            .zip(grads)
            .zip(self.first_moment.iter_mut().zip(self.second_moment.iter_mut()))
        {
            Zip::from(param).and(m).and(v).and(grad).for_each(|p, m, v, &g| {
                *m = b1 * *m + (1.0 - b1) * g;
                *v = b2 * *v + (1.0 - b2) * g * g;
                *p -= step_size * *m / (v.sqrt() + eps);
            });
        }

        Ok(())
    }
}

/// Rescale `grads` so their global norm is at most `max_norm`
///
/// Returns the norm before clipping.
pub fn clip_by_global_norm(grads: &mut Gradients, max_norm: f64) -> f64 {
    let norm = grads.global_norm();
    if norm > max_norm && norm > 0.0 {
        grads.scale(max_norm / norm);
    }
    norm
}
