//! Sliding training windows
//!
//! Turns a normalized sequence into supervised `(window, target)` pairs:
//!
//! ```text
//! sequence:  s0 s1 s2 s3 s4 s5        time_step = 3
//!
//! pair 0:   [s0 s1 s2] -> s3
//! pair 1:      [s1 s2 s3] -> s4
//! pair 2:         [s2 s3 s4] -> s5
//! ```
//!
//! A sequence of length `L` yields `max(0, L - time_step)` pairs. Windows
//! overlap with stride 1; neighbouring examples are correlated, which is the
//! accepted price for using every available step. Windows borrow from the
//! sequence, so building them never copies feature data.

use crate::reading::FeatureVector;

/// One supervised training example
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window<'a> {
    /// `time_step` consecutive observations, oldest first
    pub inputs: &'a [FeatureVector],
    /// The observation immediately after `inputs`
    pub target: &'a FeatureVector,
}

impl<'a> Window<'a> {
    /// Number of steps in the input slice
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    /// True for a zero-length window
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }
}

/// Slice `sequence` into every `(window, target)` pair, in order
///
/// Returns an empty vector when `sequence.len() <= time_step`; callers treat
/// that as a training precondition failure.
pub fn build_windows(sequence: &[FeatureVector], time_step: usize) -> Vec<Window<'_>> {
    if sequence.len() <= time_step {
        return Vec::new();
    }

    (0..sequence.len() - time_step)
        .map(|i| Window {
            inputs: &sequence[i..i + time_step],
            target: &sequence[i + time_step],
        })
        .collect()
}

/// Number of pairs [`build_windows`] yields for a sequence of `len`
pub fn window_count(len: usize, time_step: usize) -> usize {
    len.saturating_sub(time_step)
}
