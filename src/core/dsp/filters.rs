//! Gammatone filterbank on the ERB scale
//!
//! Each band is a fourth-order gammatone approximation built from four
//! cascaded second-order sections, after Slaney's auditory toolbox
//! (`MakeERBFilters` / `ERBFilterBank`).

use num_complex::Complex;
use std::f64::consts::PI;

use super::stats::rms;

/// Glasberg & Moore ERB parameters
const EAR_Q: f64 = 9.26449;
const MIN_BW: f64 = 24.7;

/// Second-order IIR section in transposed direct form II.
/// `a0` is assumed normalised to 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Biquad {
    pub b: [f64; 3],
    pub a: [f64; 2],
}

impl Biquad {
    /// Filter `samples` in place starting from a zero state.
    pub fn process(&self, samples: &mut [f64]) {
        let (mut z1, mut z2) = (0.0, 0.0);
        for s in samples.iter_mut() {
            let x = *s;
            let y = self.b[0] * x + z1;
            z1 = self.b[1] * x - self.a[0] * y + z2;
            z2 = self.b[2] * x - self.a[1] * y;
            *s = y;
        }
    }
}

/// One gammatone band: four cascaded sections sharing the same poles.
#[derive(Debug, Clone, PartialEq)]
pub struct GammatoneFilter {
    pub center_freq: f64,
    sections: [Biquad; 4],
}

impl GammatoneFilter {
    pub fn new(sample_rate: f64, center_freq: f64) -> Self {
        let t = 1.0 / sample_rate;
        let erb = center_freq / EAR_Q + MIN_BW;
        let b = 1.019 * 2.0 * PI * erb;
        let arg = 2.0 * PI * center_freq * t;
        let decay = (b * t).exp();

        let a0 = t;
        let a2 = 0.0;
        let b1 = -2.0 * arg.cos() / decay;
        let b2 = (-2.0 * b * t).exp();

        let plus = (3.0 + 2.0f64.powf(1.5)).sqrt();
        let minus = (3.0 - 2.0f64.powf(1.5)).sqrt();
        let cos_term = 2.0 * t * arg.cos() / decay;
        let sin_term = 2.0 * t * arg.sin() / decay;
        let a11 = -(cos_term + plus * sin_term) / 2.0;
        let a12 = -(cos_term - plus * sin_term) / 2.0;
        let a13 = -(cos_term + minus * sin_term) / 2.0;
        let a14 = -(cos_term - minus * sin_term) / 2.0;

        let gain = Self::gain(b, arg, t);
        let poles = [b1, b2];

        Self {
            center_freq,
            sections: [
                Biquad { b: [a0 / gain, a11 / gain, a2 / gain], a: poles },
                Biquad { b: [a0, a12, a2], a: poles },
                Biquad { b: [a0, a13, a2], a: poles },
                Biquad { b: [a0, a14, a2], a: poles },
            ],
        }
    }

    /// Magnitude of the cascade's response at the centre frequency.
    fn gain(b: f64, arg: f64, t: f64) -> f64 {
        let i = Complex::new(0.0, 1.0);
        let e4 = (i * 2.0 * arg).exp();
        let e2 = Complex::new(-b * t, arg).exp();
        let (cos, sin) = (arg.cos(), arg.sin());

        let term = |s: f64| -> Complex<f64> {
            -2.0 * e4 * t + 2.0 * e2 * t * (cos + s * sin)
        };
        let plus = (3.0 + 2.0f64.powf(1.5)).sqrt();
        let minus = (3.0 - 2.0f64.powf(1.5)).sqrt();
        let numerator = term(-minus) * term(minus) * term(-plus) * term(plus);

        let denom_base =
            -2.0 / (2.0 * b * t).exp() - 2.0 * e4 + 2.0 * (1.0 + e4) / (b * t).exp();
        let denominator = denom_base.powi(4);

        (numerator / denominator).norm()
    }

    /// Filter a frame from a zero state, returning the band output.
    pub fn filter(&self, frame: &[f64]) -> Vec<f64> {
        let mut out = frame.to_vec();
        for section in &self.sections {
            section.process(&mut out);
        }
        out
    }
}

/// ERB-spaced centre frequencies between `low` and `high`, ascending.
pub fn erb_center_frequencies(num_bands: usize, low: f64, high: f64) -> Vec<f64> {
    let q = EAR_Q * MIN_BW;
    let step = (-(high + q).ln() + (low + q).ln()) / num_bands as f64;
    let mut cfs: Vec<f64> = (1..=num_bands)
        .map(|i| -q + (i as f64 * step).exp() * (high + q))
        .collect();
    cfs.reverse();
    cfs
}

/// Bank of gammatone bands, lowest centre frequency first.
#[derive(Debug, Clone)]
pub struct GammatoneFilterBank {
    filters: Vec<GammatoneFilter>,
}

impl GammatoneFilterBank {
    pub fn new(sample_rate: u32, num_bands: usize, min_freq: f64, max_freq: f64) -> Self {
        let filters = erb_center_frequencies(num_bands, min_freq, max_freq)
            .into_iter()
            .map(|cf| GammatoneFilter::new(sample_rate as f64, cf))
            .collect();
        Self { filters }
    }

    pub fn num_bands(&self) -> usize {
        self.filters.len()
    }

    pub fn center_freqs(&self) -> Vec<f64> {
        self.filters.iter().map(|f| f.center_freq).collect()
    }

    /// RMS of every band's response to `frame`. Each band starts from a zero
    /// state, so frames are independent of one another.
    pub fn band_rms(&self, frame: &[f64]) -> Vec<f64> {
        self.filters.iter().map(|f| rms(&f.filter(frame))).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(freq: f64, sample_rate: f64, len: usize) -> Vec<f64> {
        (0..len)
            .map(|n| (2.0 * PI * freq * n as f64 / sample_rate).sin())
            .collect()
    }

    #[test]
    fn test_erb_spacing() {
        let cfs = erb_center_frequencies(32, 50.0, 24_000.0);
        assert_eq!(cfs.len(), 32);
        assert!((cfs[0] - 50.0).abs() < 1e-9);
        assert!(cfs[31] < 24_000.0);
        assert!(cfs.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_unity_gain_at_center() {
        let fs = 16_000.0;
        let filter = GammatoneFilter::new(fs, 1_000.0);
        let input = tone(1_000.0, fs, 8_000);
        let output = filter.filter(&input);
        // Skip the onset transient
        let gain = rms(&output[4_000..]) / rms(&input[4_000..]);
        assert!((gain - 1.0).abs() < 0.05, "gain = {}", gain);
    }

    #[test]
    fn test_band_selectivity() {
        let fs = 16_000.0;
        let bank = GammatoneFilterBank::new(16_000, 21, 50.0, 8_000.0);
        let input = tone(1_000.0, fs, 4_000);
        let energies = bank.band_rms(&input);
        let loudest = energies
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .map(|(i, _)| i)
            .unwrap();
        let cf = bank.center_freqs()[loudest];
        assert!(cf > 700.0 && cf < 1_400.0, "loudest band at {} Hz", cf);
    }
}
