//! Window function implementations

use std::f64::consts::PI;

/// Periodic Hann window of `size` samples
pub fn hann_window(size: usize) -> Vec<f64> {
    let n = size as f64;
    (0..size)
        .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f64 / n).cos()))
        .collect()
}

/// Multiply a frame by a window of the same length into a new buffer.
pub fn apply_window(frame: &[f64], window: &[f64]) -> Vec<f64> {
    frame.iter().zip(window).map(|(&s, &w)| s * w).collect()
}
