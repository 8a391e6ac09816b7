//! Measurement configuration
//!
//! A [`VisqolConfig`] is the raw, user-facing request. It becomes usable only
//! after [`validate`] turns it into a [`ValidatedConfig`], which also owns the
//! loaded quality mapper.

mod profiles;
mod validate;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VisqolError};

pub use profiles::{
    AnalysisProfile, PatchSelection, ScoringMode, MINIMUM_FREQ_HZ, NUM_BANDS_AUDIO,
    NUM_BANDS_SPEECH, PATCH_SIZE_AUDIO, PATCH_SIZE_SPEECH, SPEECH_MODE_MAX_FREQ_HZ,
};
pub use validate::{validate, ValidatedConfig, SUPPORTED_SAMPLE_RATE};

/// Default search radius of the patch aligner, in spectrogram frames
pub const DEFAULT_SEARCH_WINDOW_RADIUS: usize = 60;

/// Quality-measurement request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisqolConfig {
    /// Sample rate of both signals in Hz. `None` or `0` is treated as missing.
    pub sample_rate: Option<u32>,
    /// Accept rates other than 48 kHz
    pub allow_unsupported_sample_rate: bool,
    /// Path to a libsvm model file. Empty selects the built-in model.
    pub model_path: String,
    pub use_speech_scoring: bool,
    /// Only meaningful together with `use_speech_scoring`
    pub use_unscaled_speech_mapping: bool,
    /// Aligner search radius in frames either side of each reference patch
    pub search_window_radius: usize,
}

impl Default for VisqolConfig {
    fn default() -> Self {
        Self {
            sample_rate: None,
            allow_unsupported_sample_rate: false,
            model_path: String::new(),
            use_speech_scoring: false,
            use_unscaled_speech_mapping: false,
            search_window_radius: DEFAULT_SEARCH_WINDOW_RADIUS,
        }
    }
}

impl VisqolConfig {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate: Some(sample_rate),
            ..Default::default()
        }
    }

    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = Some(sample_rate);
        self
    }

    pub fn with_model_path(mut self, path: impl Into<String>) -> Self {
        self.model_path = path.into();
        self
    }

    pub fn allow_unsupported_sample_rate(mut self, allow: bool) -> Self {
        self.allow_unsupported_sample_rate = allow;
        self
    }

    pub fn with_speech_scoring(mut self, enabled: bool) -> Self {
        self.use_speech_scoring = enabled;
        self
    }

    pub fn with_unscaled_speech_mapping(mut self, unscaled: bool) -> Self {
        self.use_unscaled_speech_mapping = unscaled;
        self
    }

    pub fn with_search_window_radius(mut self, radius: usize) -> Self {
        self.search_window_radius = radius;
        self
    }

    /// Scoring mode implied by the flags.
    pub fn scoring_mode(&self) -> ScoringMode {
        ScoringMode::from_flags(self.use_speech_scoring, self.use_unscaled_speech_mapping)
    }

    /// Parse a JSON configuration. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| VisqolError::MalformedConfig {
                reason: e.to_string(),
            })
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| VisqolError::MalformedConfig {
            reason: format!("cannot read {}: {}", path.display(), e),
        })?;
        Self::from_json_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = VisqolConfig::default();
        assert_eq!(config.sample_rate, None);
        assert!(config.model_path.is_empty());
        assert_eq!(config.search_window_radius, DEFAULT_SEARCH_WINDOW_RADIUS);
        assert_eq!(config.scoring_mode(), ScoringMode::Audio);
    }

    #[test]
    fn test_builder_chain() {
        let config = VisqolConfig::new(16_000)
            .allow_unsupported_sample_rate(true)
            .with_speech_scoring(true)
            .with_unscaled_speech_mapping(true)
            .with_search_window_radius(12);
        assert_eq!(config.sample_rate, Some(16_000));
        assert!(config.allow_unsupported_sample_rate);
        assert_eq!(config.search_window_radius, 12);
        assert_eq!(
            config.scoring_mode(),
            ScoringMode::Speech { scale_to_max_mos: false }
        );
    }

    #[test]
    fn test_json_partial_config() {
        let config =
            VisqolConfig::from_json_str(r#"{ "sample_rate": 48000, "use_speech_scoring": true }"#)
                .unwrap();
        assert_eq!(config.sample_rate, Some(48_000));
        assert!(config.use_speech_scoring);
        assert!(!config.use_unscaled_speech_mapping);
        assert_eq!(config.search_window_radius, DEFAULT_SEARCH_WINDOW_RADIUS);
    }

    #[test]
    fn test_json_malformed() {
        let err = VisqolConfig::from_json_str("{ sample_rate: }").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::MalformedConfig);
    }
}
