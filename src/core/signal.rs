// src/core/signal.rs
//
// Mono sample buffer with its sample rate.

use super::dsp::stats::sound_pressure_level;

/// A single-channel signal
#[derive(Debug, Clone, PartialEq)]
pub struct AudioSignal {
    pub samples: Vec<f64>,
    pub sample_rate: u32,
}

impl AudioSignal {
    pub fn new(samples: Vec<f64>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds
    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Copy of the samples in `[start, end)`, clipped to the signal.
    pub fn slice(&self, start: usize, end: usize) -> AudioSignal {
        let end = end.min(self.samples.len());
        let start = start.min(end);
        AudioSignal::new(self.samples[start..end].to_vec(), self.sample_rate)
    }

    /// Scale `self` so its sound-pressure level matches `target`'s.
    /// A silent signal (or silent target) is returned unchanged.
    pub fn scaled_to_match_spl(&self, target: &AudioSignal) -> AudioSignal {
        match (
            sound_pressure_level(&target.samples),
            sound_pressure_level(&self.samples),
        ) {
            (Some(target_spl), Some(own_spl)) => {
                let gain = 10f64.powf((target_spl - own_spl) / 20.0);
                AudioSignal::new(
                    self.samples.iter().map(|s| s * gain).collect(),
                    self.sample_rate,
                )
            }
            _ => self.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dsp::stats::rms;

    #[test]
    fn test_duration() {
        let signal = AudioSignal::new(vec![0.0; 24_000], 48_000);
        assert!((signal.duration() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_spl_matching() {
        let target = AudioSignal::new(vec![0.5, -0.5, 0.5, -0.5], 8);
        let quiet = AudioSignal::new(vec![0.1, -0.1, 0.1, -0.1], 8);
        let scaled = quiet.scaled_to_match_spl(&target);
        assert!((rms(&scaled.samples) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_spl_matching_silent() {
        let target = AudioSignal::new(vec![0.5, -0.5], 8);
        let silent = AudioSignal::new(vec![0.0, 0.0], 8);
        assert_eq!(silent.scaled_to_match_spl(&target), silent);
    }

    #[test]
    fn test_slice_clips() {
        let signal = AudioSignal::new(vec![1.0, 2.0, 3.0], 1);
        assert_eq!(signal.slice(1, 10).samples, vec![2.0, 3.0]);
        assert!(signal.slice(5, 10).is_empty());
    }
}
