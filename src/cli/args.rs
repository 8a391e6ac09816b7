// src/cli/args.rs
//
// Command-line arguments

use clap::Parser;
use std::path::PathBuf;

use crate::config::{VisqolConfig, DEFAULT_SEARCH_WINDOW_RADIUS};

#[derive(Parser, Debug, Clone)]
#[command(name = "visqol")]
#[command(version, about = "Objective audio quality (MOS-LQO) from a reference and a degraded file")]
pub struct Args {
    /// Reference (clean) audio file
    #[arg(long, requires = "degraded_file", conflicts_with = "batch_input_csv")]
    pub reference_file: Option<PathBuf>,

    /// Degraded audio file to score against the reference
    #[arg(long, requires = "reference_file")]
    pub degraded_file: Option<PathBuf>,

    /// CSV of `reference,degraded` pairs to score in parallel
    #[arg(long, requires = "results_csv")]
    pub batch_input_csv: Option<PathBuf>,

    /// Where to write batch results
    #[arg(long)]
    pub results_csv: Option<PathBuf>,

    /// libsvm model mapping similarity to quality in audio mode. Without one
    /// a linear placeholder is used whose scores are not calibrated against
    /// listening tests
    #[arg(long, env = "VISQOL_MODEL", default_value = "")]
    pub similarity_to_quality_model: String,

    /// Score wideband speech instead of full-band audio
    #[arg(long)]
    pub use_speech_mode: bool,

    /// In speech mode, do not scale perfect similarity to MOS 5
    #[arg(long)]
    pub use_unscaled_speech_mos_mapping: bool,

    /// Accept sample rates other than 48 kHz
    #[arg(long)]
    pub allow_unsupported_sample_rates: bool,

    /// Patch search radius in frames
    #[arg(long, default_value_t = DEFAULT_SEARCH_WINDOW_RADIUS)]
    pub search_window_radius: usize,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,

    /// Per-band and per-patch detail, debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Configuration for files decoded at `sample_rate`
    pub fn to_config(&self, sample_rate: u32) -> VisqolConfig {
        VisqolConfig::new(sample_rate)
            .with_model_path(self.similarity_to_quality_model.clone())
            .with_speech_scoring(self.use_speech_mode)
            .with_unscaled_speech_mapping(self.use_unscaled_speech_mos_mapping)
            .allow_unsupported_sample_rate(self.allow_unsupported_sample_rates)
            .with_search_window_radius(self.search_window_radius)
    }

    pub fn is_batch(&self) -> bool {
        self.batch_input_csv.is_some()
    }

    /// Log filter implied by the flags when `RUST_LOG` is unset
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "warn"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScoringMode;

    #[test]
    fn test_single_pair() {
        let args = Args::try_parse_from([
            "visqol",
            "--reference-file",
            "ref.wav",
            "--degraded-file",
            "deg.wav",
            "--use-speech-mode",
        ])
        .unwrap();
        assert!(!args.is_batch());
        let config = args.to_config(16_000);
        assert_eq!(config.sample_rate, Some(16_000));
        assert_eq!(
            config.scoring_mode(),
            ScoringMode::Speech {
                scale_to_max_mos: true
            }
        );
        assert_eq!(config.search_window_radius, DEFAULT_SEARCH_WINDOW_RADIUS);
    }

    #[test]
    fn test_batch_requires_results() {
        assert!(Args::try_parse_from(["visqol", "--batch-input-csv", "pairs.csv"]).is_err());
        let args = Args::try_parse_from([
            "visqol",
            "--batch-input-csv",
            "pairs.csv",
            "--results-csv",
            "out.csv",
        ])
        .unwrap();
        assert!(args.is_batch());
    }

    #[test]
    fn test_reference_requires_degraded() {
        assert!(Args::try_parse_from(["visqol", "--reference-file", "ref.wav"]).is_err());
    }

    #[test]
    fn test_unscaled_flag_alone_stays_audio() {
        let args = Args::try_parse_from([
            "visqol",
            "--reference-file",
            "r.wav",
            "--degraded-file",
            "d.wav",
            "--use-unscaled-speech-mos-mapping",
        ])
        .unwrap();
        assert_eq!(args.to_config(48_000).scoring_mode(), ScoringMode::Audio);
    }
}
