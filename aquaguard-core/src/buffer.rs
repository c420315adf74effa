//! Fixed-Capacity Window Buffer for Recursive Forecasting
//!
//! ## Overview
//!
//! The recursive forecast loop keeps exactly `time_step` observations as the
//! model's input. Each step drops the oldest entry and appends the newest
//! prediction. [`WindowBuffer`] is a ring buffer with that contract: capacity
//! is fixed at construction, pushes never grow memory, and iteration is
//! always oldest to newest.
//!
//! ## Memory Layout
//!
//! ```text
//! WindowBuffer, capacity 5, after 7 pushes (values 0..=6):
//!
//! Physical slots:  [5, 6, 2, 3, 4]   write_pos = 2
//!                   0  1  2  3  4
//!
//! Logical view:    [2, 3, 4, 5, 6]   oldest at write_pos
//! ```
//!
//! ## Usage Example
//!
//! ```rust
//! use aquaguard_core::buffer::WindowBuffer;
//!
//! let mut window = WindowBuffer::from_slice(3, &[[1.0; 4], [2.0; 4], [3.0; 4]]);
//! window.push([4.0; 4]);
//!
//! let firsts: Vec<f64> = window.iter().map(|v| v[0]).collect();
//! assert_eq!(firsts, vec![2.0, 3.0, 4.0]);
//! ```

use crate::reading::FeatureVector;

/// Ring buffer of feature vectors with drop-oldest semantics
///
/// ## Internal Invariants
///
/// - `slots.len() <= capacity`
/// - once `slots.len() == capacity`, `write_pos` indexes the oldest entry
/// - iteration yields entries in insertion order
#[derive(Debug, Clone)]
pub struct WindowBuffer {
    slots: Vec<FeatureVector>,
    capacity: usize,
    write_pos: usize,
}

impl WindowBuffer {
    /// Empty buffer holding at most `capacity` vectors
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            capacity,
            write_pos: 0,
        }
    }

    /// Buffer seeded with the last `capacity` entries of `seed`
    pub fn from_slice(capacity: usize, seed: &[FeatureVector]) -> Self {
        let mut buffer = Self::new(capacity);
        let start = seed.len().saturating_sub(capacity);
        for row in &seed[start..] {
            buffer.push(*row);
        }
        buffer
    }

    /// Append `row`, discarding the oldest entry when full
    pub fn push(&mut self, row: FeatureVector) {
        if self.capacity == 0 {
            return;
        }

        if self.slots.len() < self.capacity {
            self.slots.push(row);
        } else {
            self.slots[self.write_pos] = row;
        }
        self.write_pos = (self.write_pos + 1) % self.capacity;
    }

    /// Number of stored vectors
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True when nothing has been pushed
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// True once `capacity` vectors are held
    pub fn is_full(&self) -> bool {
        self.slots.len() == self.capacity
    }

    /// Maximum number of stored vectors
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recently pushed vector
    pub fn last(&self) -> Option<&FeatureVector> {
        if self.slots.is_empty() {
            return None;
        }
        let idx = if self.write_pos == 0 { self.slots.len() - 1 } else { self.write_pos - 1 };
        self.slots.get(idx)
    }

    /// Iterate oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &FeatureVector> + '_ {
        let start = if self.is_full() { self.write_pos } else { 0 };
        let (tail, head) = self.slots.split_at(start);
        head.iter().chain(tail.iter())
    }

    /// Contents oldest to newest as a contiguous vector
    pub fn to_vec(&self) -> Vec<FeatureVector> {
        self.iter().copied().collect()
    }
}
