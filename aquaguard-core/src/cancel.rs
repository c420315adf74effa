//! Cooperative cancellation
//!
//! Training and recursive forecasting are the only long-running stages.
//! Both poll a [`CancelToken`] between epochs and between forecast steps, so
//! a caller enforcing a wall-clock budget can stop a run promptly. A token is
//! cheap to clone; all clones observe the same flag.
//!
//! A flag never resets. Long-lived owners hand out [`CancelToken::child`]
//! tokens per run: cancelling a child stops that run only, cancelling the
//! parent stops every child.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::errors::{ForecastError, ForecastResult};

/// Shared cancellation flag
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    /// Flags of every ancestor, nearest last
    ancestors: Vec<Arc<AtomicBool>>,
}

impl CancelToken {
    /// Token that has not been cancelled
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh token that is also cancelled when `self` is
    pub fn child(&self) -> Self {
        let mut ancestors = self.ancestors.clone();
        ancestors.push(Arc::clone(&self.flag));
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            ancestors,
        }
    }

    /// Request cancellation; every clone and child observes it
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// True once this token or any ancestor was cancelled
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed) || self.ancestors.iter().any(|flag| flag.load(Ordering::Relaxed))
    }

    /// `Err(Cancelled { stage })` if cancellation was requested
    pub fn check(&self, stage: &'static str) -> ForecastResult<()> {
        if self.is_cancelled() {
            log::info!("cancellation observed during {}", stage);
            return Err(ForecastError::Cancelled { stage });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_flag() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(token.check("training").is_ok());

        clone.cancel();
        assert!(token.is_cancelled());
        assert_eq!(
            token.check("training"),
            Err(ForecastError::Cancelled { stage: "training" })
        );
    }

    #[test]
    fn child_cancellation_stays_local() {
        let parent = CancelToken::new();
        let first = parent.child();
        let second = parent.child();

        first.cancel();
        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
        assert!(!parent.is_cancelled());
    }

    #[test]
    fn parent_cancellation_reaches_descendants() {
        let root = CancelToken::new();
        let grandchild = root.child().child();
        assert!(grandchild.check("forecast").is_ok());

        root.cancel();
        assert_eq!(
            grandchild.check("forecast"),
            Err(ForecastError::Cancelled { stage: "forecast" })
        );
    }
}
