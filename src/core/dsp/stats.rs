//! Statistical helpers over sample and feature slices

/// Reference pressure for sound-pressure level, in pascals
pub const SPL_REFERENCE_PA: f64 = 20e-6;

/// Arithmetic mean, `0.0` for an empty slice
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

/// Population standard deviation
pub fn std_dev(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let m = mean(data);
    let var = data.iter().map(|&x| (x - m) * (x - m)).sum::<f64>() / data.len() as f64;
    var.sqrt()
}

/// Compute RMS (Root Mean Square)
pub fn rms(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum_sq: f64 = samples.iter().map(|s| s * s).sum();
    (sum_sq / samples.len() as f64).sqrt()
}

/// Sound-pressure level in dB, treating samples as pascals.
/// Returns `None` for a silent signal.
pub fn sound_pressure_level(samples: &[f64]) -> Option<f64> {
    let r = rms(samples);
    if r > 0.0 {
        Some(20.0 * (r / SPL_REFERENCE_PA).log10())
    } else {
        None
    }
}

/// Power-style dB (`10·log10`). Zero maps to the smallest positive double.
pub fn power_to_db(value: f64) -> f64 {
    10.0 * value.max(f64::MIN_POSITIVE).log10()
}
