// src/core/analyzer.rs
//
// Measurement orchestrator. A `VisqolApi` starts unconfigured, becomes usable
// once a configuration validates, and then serves any number of concurrent
// `measure` calls without internal locking.

use log::{debug, info, warn};

use super::analysis::{
    globally_align, prepare_for_comparison, refine_patch_timing, score_pairs, FrameGeometry,
    PatchAligner, PatchCreator, SpectrogramBuilder,
};
use super::signal::AudioSignal;
use crate::config::{validate, ScoringMode, ValidatedConfig, VisqolConfig};
use crate::error::{Result, VisqolError};
use crate::measurement::{MeasurementResult, PatchSimilarity};

/// Duration difference above which a mismatch is reported, in seconds
pub const DURATION_MISMATCH_TOLERANCE_S: f64 = 1.0;

/// Lifecycle state of a [`VisqolApi`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiState {
    Uninitialized,
    Configured,
}

/// Quality measurement entry point
#[derive(Debug, Default)]
pub struct VisqolApi {
    engine: Option<MeasurementEngine>,
}

impl VisqolApi {
    /// An instance that must be configured with [`create`](Self::create)
    /// before it can measure.
    pub fn new() -> Self {
        Self { engine: None }
    }

    /// Validate `config` and load the mapping model in one step.
    pub fn from_config(config: &VisqolConfig) -> Result<Self> {
        let mut api = Self::new();
        api.create(config)?;
        Ok(api)
    }

    /// (Re)configure the instance. Any previous configuration is discarded
    /// first, so a failed call leaves the instance unconfigured.
    pub fn create(&mut self, config: &VisqolConfig) -> Result<()> {
        self.engine = None;
        let validated = validate(config)?;
        info!(
            "ViSQOL configured: {} Hz, {} mode",
            validated.sample_rate(),
            validated.mode().name()
        );
        self.engine = Some(MeasurementEngine { config: validated });
        Ok(())
    }

    pub fn state(&self) -> ApiState {
        match self.engine {
            Some(_) => ApiState::Configured,
            None => ApiState::Uninitialized,
        }
    }

    pub fn mode(&self) -> Option<ScoringMode> {
        self.engine.as_ref().map(|e| e.config.mode())
    }

    pub fn sample_rate(&self) -> Option<u32> {
        self.engine.as_ref().map(|e| e.config.sample_rate())
    }

    /// Compare two mono sample sequences at the configured sample rate.
    pub fn measure(&self, reference: &[f64], degraded: &[f64]) -> Result<MeasurementResult> {
        let engine = self.engine.as_ref().ok_or(VisqolError::NotConfigured)?;
        let rate = engine.config.sample_rate();
        engine.measure(
            AudioSignal::new(reference.to_vec(), rate),
            AudioSignal::new(degraded.to_vec(), rate),
        )
    }

    /// Compare two signals, checking their sample rates against the
    /// configuration first.
    pub fn measure_signals(
        &self,
        reference: &AudioSignal,
        degraded: &AudioSignal,
    ) -> Result<MeasurementResult> {
        let engine = self.engine.as_ref().ok_or(VisqolError::NotConfigured)?;
        let rate = engine.config.sample_rate();
        for (name, signal) in [("reference", reference), ("degraded", degraded)] {
            if signal.sample_rate != rate {
                return Err(VisqolError::invalid_input(format!(
                    "{} sample rate {} Hz does not match the configured {} Hz",
                    name, signal.sample_rate, rate
                )));
            }
        }
        engine.measure(reference.clone(), degraded.clone())
    }
}

/// Immutable per-configuration state shared by all measurements
#[derive(Debug)]
struct MeasurementEngine {
    config: ValidatedConfig,
}

impl MeasurementEngine {
    fn measure(&self, reference: AudioSignal, degraded: AudioSignal) -> Result<MeasurementResult> {
        validate_input(&reference, "reference")?;
        validate_input(&degraded, "degraded")?;

        let mismatch = (reference.duration() - degraded.duration()).abs();
        if mismatch > DURATION_MISMATCH_TOLERANCE_S {
            warn!(
                "Mismatch in duration between reference and degraded signal. \
                 Reference is {:.2} seconds. Degraded is {:.2} seconds.",
                reference.duration(),
                degraded.duration()
            );
        }

        let sample_rate = self.config.sample_rate();
        let profile = self.config.profile();

        let (aligned, alignment_lag_s) = globally_align(&reference, &degraded);
        let degraded = aligned.scaled_to_match_spl(&reference);

        let builder = SpectrogramBuilder::new(profile, sample_rate);
        let mut ref_spec = builder.build(&reference.samples);
        let mut deg_spec = builder.build(&degraded.samples);
        prepare_for_comparison(&mut ref_spec, &mut deg_spec);

        let creator = PatchCreator::new(profile, sample_rate);
        let indices = creator.ref_patch_indices(&ref_spec, &reference.samples);
        if indices.is_empty() {
            let complete = creator.complete_patch_count(ref_spec.num_frames());
            let reason = if complete == 0 {
                format!(
                    "reference of {:.3} s yields no complete {}-frame patch",
                    reference.duration(),
                    creator.patch_size()
                )
            } else {
                format!(
                    "none of the {} reference patches has enough voice activity",
                    complete
                )
            };
            return Err(VisqolError::invalid_input(reason));
        }
        if deg_spec.num_frames() < creator.patch_size() {
            return Err(VisqolError::invalid_input(format!(
                "degraded signal of {:.3} s is shorter than one patch",
                degraded.duration()
            )));
        }
        let patches = creator.create_patches(&ref_spec, &indices);

        let aligner = PatchAligner::new(self.config.search_window_radius());
        let (map, pairs) = aligner.align(&patches, &deg_spec);
        if pairs.is_empty() {
            return Err(VisqolError::AlignmentFailure);
        }

        let (similarity, scores) = score_pairs(&pairs, profile.num_bands);

        let geometry = FrameGeometry {
            hop_size: builder.hop_size(),
            window_size: builder.window_size(),
            sample_rate,
        };
        let patch_sims = map
            .entries
            .iter()
            .zip(&scores)
            .map(|(entry, score)| {
                let timing =
                    refine_patch_timing(&reference, &degraded, entry, creator.patch_size(), geometry);
                PatchSimilarity {
                    ref_start_s: timing.ref_start_s,
                    ref_end_s: timing.ref_end_s,
                    deg_start_s: timing.deg_start_s,
                    deg_end_s: timing.deg_end_s,
                    similarity: score.similarity,
                    freq_band_means: score.band_means.clone(),
                }
            })
            .collect();

        let moslqo = self.config.mapper().predict(&similarity);
        debug!(
            "measured {} patches ({} dropped): vnsim {:.4}, MOS-LQO {:.4}",
            pairs.len(),
            map.dropped.len(),
            similarity.vnsim,
            moslqo
        );

        Ok(MeasurementResult {
            moslqo,
            vnsim: similarity.vnsim,
            fvnsim: similarity.fvnsim,
            fstdnsim: similarity.fstdnsim,
            fvdegenergy: similarity.fvdegenergy,
            band_coverage: similarity.band_coverage,
            center_freq_bands: ref_spec.center_freqs,
            alignment_lag_s,
            patch_sims,
        })
    }
}

fn validate_input(signal: &AudioSignal, name: &str) -> Result<()> {
    if signal.is_empty() {
        return Err(VisqolError::invalid_input(format!("{} signal is empty", name)));
    }
    if let Some(pos) = signal.samples.iter().position(|s| !s.is_finite()) {
        return Err(VisqolError::invalid_input(format!(
            "{} signal has a non-finite sample at index {}",
            name, pos
        )));
    }
    Ok(())
}
