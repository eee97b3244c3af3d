//! Fixed-width, non-overlapping analysis windows over a conditioned buffer.
//!
//! Windows are index ranges into the caller's buffers; nothing is copied.
//!
//! Edge policy: window starts are `0, W, 2W, …` strictly below `len - W`.
//! The trailing block is therefore never emitted, even when it is a complete
//! window (a 100-sample signal with `W = 50` yields one window, not two).
//! This reproduces the behaviour the feature tables were originally built
//! with; whether the last full window should be kept is still undecided.

use std::ops::Range;

use crate::error::{FeatureError, Result};

/// `round(sample_rate_hz * window_seconds)`, rejected when it rounds to zero.
pub fn samples_per_window(sample_rate_hz: f64, window_seconds: f64) -> Result<usize> {
    let samples = (sample_rate_hz * window_seconds).round();
    if !samples.is_finite() || samples < 1.0 {
        return Err(FeatureError::Config(format!(
            "window of {} s at {} Hz contains no samples",
            window_seconds, sample_rate_hz
        )));
    }
    Ok(samples as usize)
}

/// Number of windows emitted for a signal of `len` samples.
pub fn window_count(len: usize, size: usize) -> usize {
    if size == 0 || len <= size {
        return 0;
    }
    (len - size).div_ceil(size)
}

/// Restartable description of the windows over a signal of known length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Windower {
    len: usize,
    size: usize,
}

impl Windower {
    pub fn new(len: usize, size: usize) -> Self {
        Self { len, size }
    }

    pub fn count(&self) -> usize {
        window_count(self.len, self.size)
    }

    pub fn iter(&self) -> Windows {
        Windows {
            next: 0,
            remaining: self.count(),
            size: self.size,
        }
    }
}

impl IntoIterator for Windower {
    type Item = Range<usize>;
    type IntoIter = Windows;

    fn into_iter(self) -> Windows {
        self.iter()
    }
}

impl IntoIterator for &Windower {
    type Item = Range<usize>;
    type IntoIter = Windows;

    fn into_iter(self) -> Windows {
        self.iter()
    }
}

#[derive(Debug, Clone)]
pub struct Windows {
    next: usize,
    remaining: usize,
    size: usize,
}

impl Iterator for Windows {
    type Item = Range<usize>;

    fn next(&mut self) -> Option<Range<usize>> {
        if self.remaining == 0 {
            return None;
        }
        let start = self.next;
        self.next += self.size;
        self.remaining -= 1;
        Some(start..start + self.size)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Windows {}
