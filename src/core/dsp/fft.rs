//! FFT-based cross-correlation

use rustfft::{num_complex::Complex, FftPlanner};

/// FFT length for a correlation of two length-`n` signals: the power of two
/// whose exponent is the binary exponent of `2n - 1` in `frexp` terms.
fn fft_points(n: usize) -> usize {
    let span = (2 * n).saturating_sub(1).max(1);
    1usize << (usize::BITS - span.leading_zeros())
}

/// Circular cross-correlation `IFFT(FFT(a) · conj(FFT(b)))` after zero-padding
/// both inputs to a common FFT length. Index `k` holds lag `k`; negative lags
/// wrap to the end of the buffer. The result is scaled by `1 / fft_len`.
pub fn cross_correlation(a: &[f64], b: &[f64]) -> Vec<f64> {
    let n = a.len().max(b.len());
    let points = fft_points(n);

    let mut planner = FftPlanner::<f64>::new();
    let forward = planner.plan_fft_forward(points);
    let inverse = planner.plan_fft_inverse(points);

    let to_buffer = |signal: &[f64]| -> Vec<Complex<f64>> {
        let mut buffer: Vec<Complex<f64>> =
            signal.iter().map(|&s| Complex::new(s, 0.0)).collect();
        buffer.resize(points, Complex::new(0.0, 0.0));
        buffer
    };

    let mut spec_a = to_buffer(a);
    let mut spec_b = to_buffer(b);
    forward.process(&mut spec_a);
    forward.process(&mut spec_b);

    let mut product: Vec<Complex<f64>> = spec_a
        .iter()
        .zip(&spec_b)
        .map(|(x, y)| x * y.conj())
        .collect();
    inverse.process(&mut product);

    let scale = 1.0 / points as f64;
    product.iter().map(|c| c.re * scale).collect()
}

/// Lag (in samples) that best aligns `b` to `a`.
///
/// A positive lag means `b` leads `a` (`b[n] ≈ a[n + lag]`); a negative lag
/// means `b` is delayed. Lags are scanned from `-(n-1)` to `n-1` and the first
/// maximum wins.
pub fn calc_best_lag(a: &[f64], b: &[f64]) -> i64 {
    let n = a.len().max(b.len());
    if n == 0 {
        return 0;
    }
    let max_lag = n - 1;
    let corr = cross_correlation(a, b);
    let len = corr.len();

    let negatives = corr[len - max_lag..].iter();
    let positives = corr[..=max_lag].iter();

    let mut best_idx = 0usize;
    let mut best_val = f64::NEG_INFINITY;
    for (idx, &v) in negatives.chain(positives).enumerate() {
        if v > best_val {
            best_val = v;
            best_idx = idx;
        }
    }
    best_idx as i64 - max_lag as i64
}
