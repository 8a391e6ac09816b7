// src/config/validate.rs
//
// Turns a raw request into an immutable, fully usable configuration. There is
// no partially valid state: either every check passes and the mapper is
// loaded, or the request is rejected.

use log::{debug, info};

use super::profiles::{AnalysisProfile, ScoringMode};
use super::VisqolConfig;
use crate::core::analysis::QualityMapper;
use crate::error::{Result, VisqolError};

/// The single analysis rate supported without the override flag
pub const SUPPORTED_SAMPLE_RATE: u32 = 48_000;

/// Validated configuration, owning the loaded quality mapper
#[derive(Debug)]
pub struct ValidatedConfig {
    sample_rate: u32,
    mode: ScoringMode,
    profile: AnalysisProfile,
    search_window_radius: usize,
    model_path: String,
    mapper: QualityMapper,
}

impl ValidatedConfig {
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn mode(&self) -> ScoringMode {
        self.mode
    }

    pub fn profile(&self) -> &AnalysisProfile {
        &self.profile
    }

    pub fn search_window_radius(&self) -> usize {
        self.search_window_radius
    }

    /// Model path as requested; empty when the built-in model is in use.
    pub fn model_path(&self) -> &str {
        &self.model_path
    }

    pub fn mapper(&self) -> &QualityMapper {
        &self.mapper
    }
}

/// Validate a request. Checks run in order: sample rate present, sample rate
/// supported (unless overridden), mapping model loadable.
pub fn validate(config: &VisqolConfig) -> Result<ValidatedConfig> {
    let sample_rate = match config.sample_rate {
        Some(rate) if rate > 0 => rate,
        _ => return Err(VisqolError::MissingAudioInfo),
    };

    if sample_rate != SUPPORTED_SAMPLE_RATE && !config.allow_unsupported_sample_rate {
        return Err(VisqolError::UnsupportedSampleRate {
            requested: sample_rate,
            supported: SUPPORTED_SAMPLE_RATE,
        });
    }

    let mode = config.scoring_mode();
    let mapper = QualityMapper::load(mode, &config.model_path)?;
    debug!(
        "config validated: {} Hz, {} mode, search radius {} frames",
        sample_rate,
        mode.name(),
        config.search_window_radius
    );
    if sample_rate != SUPPORTED_SAMPLE_RATE {
        info!(
            "running at unsupported sample rate {} Hz by request; scores may not be calibrated",
            sample_rate
        );
    }

    Ok(ValidatedConfig {
        sample_rate,
        mode,
        profile: mode.profile(),
        search_window_radius: config.search_window_radius,
        model_path: config.model_path.clone(),
        mapper,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_missing_sample_rate() {
        let err = validate(&VisqolConfig::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingAudioInfo);

        let config = VisqolConfig {
            sample_rate: Some(0),
            ..Default::default()
        };
        assert_eq!(validate(&config).unwrap_err().kind(), ErrorKind::MissingAudioInfo);
    }

    #[test]
    fn test_missing_rate_checked_before_model() {
        let config = VisqolConfig::default().with_model_path("does/not/exist.txt");
        let err = validate(&config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingAudioInfo);
    }

    #[test]
    fn test_unsupported_rate() {
        let err = validate(&VisqolConfig::new(44_100)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedSampleRate);

        let config = VisqolConfig::new(44_100).allow_unsupported_sample_rate(true);
        let validated = validate(&config).unwrap();
        assert_eq!(validated.sample_rate(), 44_100);
    }

    #[test]
    fn test_mode_and_profile_resolution() {
        let config = VisqolConfig::new(48_000)
            .with_speech_scoring(false)
            .with_unscaled_speech_mapping(true);
        let validated = validate(&config).unwrap();
        assert_eq!(validated.mode(), ScoringMode::Audio);
        assert_eq!(validated.profile().num_bands, 32);

        let config = VisqolConfig::new(48_000).with_speech_scoring(true);
        let validated = validate(&config).unwrap();
        assert!(validated.mode().is_speech());
        assert_eq!(validated.profile().num_bands, 21);
    }

    #[test]
    fn test_bad_model_path() {
        let config = VisqolConfig::new(48_000).with_model_path("non_existant.txt");
        let err = validate(&config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ModelLoadFailure);
        assert_eq!(
            err.to_string(),
            "Failed to load the SVR model file: non_existant.txt"
        );
    }
}
