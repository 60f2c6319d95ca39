//! Fixed-capacity sliding window of recent angle samples.

use std::collections::VecDeque;

/// The last `capacity` samples seen by one detector, oldest first.
///
/// A `None` entry is a "no reading" sample. It is stored like any other but
/// contributes no delta to the movement classifier.
#[derive(Debug, Clone)]
pub struct HistoryWindow {
    buf: VecDeque<Option<f32>>,
    cap: usize,
}

impl HistoryWindow {
    pub fn new(capacity: usize) -> Self {
        let cap = capacity.max(1);
        Self {
            buf: VecDeque::with_capacity(cap),
            cap,
        }
    }

    /// Append a sample, evicting the oldest once full.
    pub fn push(&mut self, sample: Option<f32>) {
        if self.buf.len() == self.cap {
            self.buf.pop_front();
        }
        self.buf.push_back(sample);
    }

    /// Ordered copy of the window, oldest first.
    pub fn snapshot(&self) -> Vec<Option<f32>> {
        self.buf.iter().copied().collect()
    }

    /// Sample `back` positions before the newest (0 = newest).
    #[inline]
    pub fn back(&self, back: usize) -> Option<Option<f32>> {
        let len = self.buf.len();
        if back >= len {
            return None;
        }
        self.buf.get(len - 1 - back).copied()
    }

    #[inline]
    pub fn get(&self, idx: usize) -> Option<Option<f32>> {
        self.buf.get(idx).copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.cap
    }

    pub fn clear(&mut self) {
        self.buf.clear();
    }
}
