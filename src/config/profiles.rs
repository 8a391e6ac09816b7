// src/config/profiles.rs
//
// Mode-dependent analysis profiles. A profile fixes the filterbank layout,
// patch geometry and patch selection strategy for one scoring mode.

use serde::{Deserialize, Serialize};

/// Lowest gammatone centre-frequency bound, shared by both modes
pub const MINIMUM_FREQ_HZ: f64 = 50.0;
/// Upper analysis bound in speech mode
pub const SPEECH_MODE_MAX_FREQ_HZ: f64 = 8_000.0;
/// Analysis window length in seconds
pub const WINDOW_DURATION_S: f64 = 0.08;
/// Fractional overlap between consecutive analysis windows
pub const WINDOW_OVERLAP: f64 = 0.5;

pub const NUM_BANDS_AUDIO: usize = 32;
pub const NUM_BANDS_SPEECH: usize = 21;
pub const PATCH_SIZE_AUDIO: usize = 30;
pub const PATCH_SIZE_SPEECH: usize = 20;

/// Scoring mode, fixed for the lifetime of a configured instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoringMode {
    /// Full-band audio: SVR regression over the per-band similarity vector
    Audio,
    /// Wideband speech: closed-form exponential mapping of the aggregate
    Speech {
        /// When true, perfect similarity maps exactly to 5.0
        scale_to_max_mos: bool,
    },
}

impl ScoringMode {
    /// Resolves the mode from the two config flags. The unscaled flag is
    /// inert unless speech scoring is enabled.
    pub fn from_flags(use_speech_scoring: bool, use_unscaled_mapping: bool) -> Self {
        if use_speech_scoring {
            ScoringMode::Speech {
                scale_to_max_mos: !use_unscaled_mapping,
            }
        } else {
            ScoringMode::Audio
        }
    }

    pub fn is_speech(&self) -> bool {
        matches!(self, ScoringMode::Speech { .. })
    }

    pub fn name(&self) -> &'static str {
        match self {
            ScoringMode::Audio => "audio",
            ScoringMode::Speech { scale_to_max_mos: true } => "speech (scaled)",
            ScoringMode::Speech { scale_to_max_mos: false } => "speech (unscaled)",
        }
    }

    pub fn profile(&self) -> AnalysisProfile {
        match self {
            ScoringMode::Audio => AnalysisProfile::audio(),
            ScoringMode::Speech { .. } => AnalysisProfile::speech(),
        }
    }
}

/// How reference patches are chosen from the reference neurogram
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatchSelection {
    /// Every complete patch on a regular grid
    Image,
    /// Regular grid, restricted to patches with enough voice activity
    VoiceActivity,
}

/// Analysis geometry for one scoring mode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisProfile {
    pub num_bands: usize,
    pub min_freq_hz: f64,
    /// `None` means "up to the Nyquist frequency"
    pub max_freq_hz: Option<f64>,
    pub patch_size: usize,
    pub window_duration_s: f64,
    pub overlap: f64,
    pub patch_selection: PatchSelection,
}

impl AnalysisProfile {
    pub fn audio() -> Self {
        Self {
            num_bands: NUM_BANDS_AUDIO,
            min_freq_hz: MINIMUM_FREQ_HZ,
            max_freq_hz: None,
            patch_size: PATCH_SIZE_AUDIO,
            window_duration_s: WINDOW_DURATION_S,
            overlap: WINDOW_OVERLAP,
            patch_selection: PatchSelection::Image,
        }
    }

    pub fn speech() -> Self {
        Self {
            num_bands: NUM_BANDS_SPEECH,
            min_freq_hz: MINIMUM_FREQ_HZ,
            max_freq_hz: Some(SPEECH_MODE_MAX_FREQ_HZ),
            patch_size: PATCH_SIZE_SPEECH,
            window_duration_s: WINDOW_DURATION_S,
            overlap: WINDOW_OVERLAP,
            patch_selection: PatchSelection::VoiceActivity,
        }
    }

    /// Upper filterbank bound for a given sample rate, never above Nyquist.
    pub fn max_freq_for(&self, sample_rate: u32) -> f64 {
        let nyquist = sample_rate as f64 / 2.0;
        match self.max_freq_hz {
            Some(max) => max.min(nyquist),
            None => nyquist,
        }
    }

    /// Analysis window length in samples.
    pub fn window_size(&self, sample_rate: u32) -> usize {
        (sample_rate as f64 * self.window_duration_s).round() as usize
    }

    /// Hop between consecutive windows in samples.
    pub fn hop_size(&self, sample_rate: u32) -> usize {
        ((self.window_size(sample_rate) as f64 * self.overlap) as usize).max(1)
    }

    /// Duration of one spectrogram frame (one hop) in seconds.
    pub fn frame_duration_s(&self, sample_rate: u32) -> f64 {
        self.hop_size(sample_rate) as f64 / sample_rate as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unscaled_flag_is_inert_outside_speech() {
        assert_eq!(ScoringMode::from_flags(false, true), ScoringMode::Audio);
        assert_eq!(ScoringMode::from_flags(false, false), ScoringMode::Audio);
        assert_eq!(
            ScoringMode::from_flags(true, true),
            ScoringMode::Speech { scale_to_max_mos: false }
        );
        assert_eq!(
            ScoringMode::from_flags(true, false),
            ScoringMode::Speech { scale_to_max_mos: true }
        );
    }

    #[test]
    fn test_audio_has_wider_band_set() {
        let audio = AnalysisProfile::audio();
        let speech = AnalysisProfile::speech();
        assert!(audio.num_bands > speech.num_bands);
        assert_eq!(audio.max_freq_for(48_000), 24_000.0);
        assert_eq!(speech.max_freq_for(48_000), 8_000.0);
        assert_eq!(speech.max_freq_for(8_000), 4_000.0);
    }

    #[test]
    fn test_window_geometry() {
        let profile = AnalysisProfile::audio();
        assert_eq!(profile.window_size(48_000), 3840);
        assert_eq!(profile.hop_size(48_000), 1920);
        assert!((profile.frame_duration_s(48_000) - 0.04).abs() < 1e-12);
        assert_eq!(profile.window_size(16_000), 1280);
    }
}
