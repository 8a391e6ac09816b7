// src/core/analysis/alignment.rs
//
// Temporal alignment at two scales: a global sample lag from cross-correlation
// of the whole signals, and a bounded, monotonic patch search over the
// degraded neurogram.

use log::{debug, warn};

use super::nsim::measure_patch_similarity;
use super::patches::Patch;
use super::spectrogram::Spectrogram;
use crate::core::dsp::calc_best_lag;
use crate::core::signal::AudioSignal;

/// A best match at or below this similarity drops the reference patch.
/// Content matched against silence scores near 1e-6 after floor subtraction.
pub const MIN_PATCH_SIMILARITY: f64 = 0.01;

// ============================================================================
// Sample-level alignment
// ============================================================================

/// Shift `degraded` so that it lines up with `reference`.
///
/// Returns the shifted signal and the lag that was removed, in seconds.
/// Lags of more than half the reference length are treated as spurious and
/// the degraded signal is returned unchanged with a lag of zero.
pub fn globally_align(reference: &AudioSignal, degraded: &AudioSignal) -> (AudioSignal, f64) {
    let lag = calc_best_lag(&reference.samples, &degraded.samples);
    let max_lag = (reference.len() / 2) as i64;

    if lag == 0 || lag.abs() > max_lag {
        if lag != 0 {
            debug!("ignoring global lag of {} samples (limit {})", lag, max_lag);
        }
        return (degraded.clone(), 0.0);
    }

    let shift = lag.unsigned_abs() as usize;
    let samples = if lag < 0 {
        degraded.samples[shift.min(degraded.len())..].to_vec()
    } else {
        let mut padded = vec![0.0; shift];
        padded.extend_from_slice(&degraded.samples);
        padded
    };

    let lag_s = lag as f64 / degraded.sample_rate.max(1) as f64;
    debug!("global alignment: lag {} samples ({:.4} s)", lag, lag_s);
    (AudioSignal::new(samples, degraded.sample_rate), lag_s)
}

/// Align the two signals, then keep only their overlapping region, both
/// truncated to the same length. Returns `(reference, degraded, lag_seconds)`.
pub fn align_and_truncate(
    reference: &AudioSignal,
    degraded: &AudioSignal,
) -> (AudioSignal, AudioSignal, f64) {
    let (aligned, lag_s) = globally_align(reference, degraded);
    let lag = (lag_s * degraded.sample_rate as f64).round() as i64;

    let (new_ref, new_deg) = if lag > 0 {
        // Drop the reference lead-in and the zeros inserted in front of the degraded copy
        let shift = lag as usize;
        (
            reference.slice(shift, reference.len()),
            aligned.slice(shift, aligned.len()),
        )
    } else {
        (reference.clone(), aligned)
    };

    let common = new_ref.len().min(new_deg.len());
    (new_ref.slice(0, common), new_deg.slice(0, common), lag_s)
}

// ============================================================================
// Patch-level alignment
// ============================================================================

/// One reference patch matched to a degraded position
#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentEntry {
    /// Index into the reference patch list
    pub ref_index: usize,
    pub ref_frame: usize,
    pub deg_frame: usize,
    pub similarity: f64,
}

/// Outcome of the patch search
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlignmentMap {
    /// Matched patches, in reference order with non-decreasing `deg_frame`
    pub entries: Vec<AlignmentEntry>,
    /// Reference patch indices that found no acceptable match
    pub dropped: Vec<usize>,
}

impl AlignmentMap {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Reference patch paired with the degraded patch it was matched to
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedPair {
    pub ref_index: usize,
    pub reference: Patch,
    pub degraded: Patch,
}

/// Bounded local search for the best degraded patch of each reference patch
#[derive(Debug, Clone, Copy)]
pub struct PatchAligner {
    search_radius: usize,
    similarity_floor: f64,
}

impl PatchAligner {
    pub fn new(search_radius: usize) -> Self {
        Self {
            search_radius,
            similarity_floor: MIN_PATCH_SIMILARITY,
        }
    }

    pub fn with_similarity_floor(mut self, floor: f64) -> Self {
        self.similarity_floor = floor;
        self
    }

    pub fn search_radius(&self) -> usize {
        self.search_radius
    }

    /// Match every reference patch against the degraded neurogram.
    ///
    /// Candidates lie within `search_radius` frames of the reference start and
    /// never before the previously chosen degraded frame. On equal similarity
    /// the smaller absolute offset wins, then the earlier frame.
    pub fn align(
        &self,
        ref_patches: &[Patch],
        degraded: &Spectrogram,
    ) -> (AlignmentMap, Vec<AlignedPair>) {
        let mut map = AlignmentMap::default();
        let mut pairs = Vec::with_capacity(ref_patches.len());
        let mut lower_bound = 0usize;

        for (ref_index, patch) in ref_patches.iter().enumerate() {
            let width = patch.num_frames();
            let Some(last_start) = degraded.num_frames().checked_sub(width) else {
                map.dropped.push(ref_index);
                continue;
            };

            let lo = patch
                .start_frame
                .saturating_sub(self.search_radius)
                .max(lower_bound);
            let hi = patch
                .start_frame
                .saturating_add(self.search_radius)
                .min(last_start);

            let mut best: Option<(usize, f64)> = None;
            for deg_frame in lo..=hi {
                let candidate = degraded.data.columns(deg_frame, width);
                let sim = measure_patch_similarity(&patch.data, &candidate).similarity;
                if !sim.is_finite() {
                    continue;
                }
                let better = match best {
                    None => true,
                    Some((best_frame, best_sim)) => {
                        sim > best_sim
                            || (sim == best_sim
                                && deg_frame.abs_diff(patch.start_frame)
                                    < best_frame.abs_diff(patch.start_frame))
                    }
                };
                if better {
                    best = Some((deg_frame, sim));
                }
            }

            match best {
                Some((deg_frame, similarity)) if similarity > self.similarity_floor => {
                    lower_bound = deg_frame;
                    map.entries.push(AlignmentEntry {
                        ref_index,
                        ref_frame: patch.start_frame,
                        deg_frame,
                        similarity,
                    });
                    pairs.push(AlignedPair {
                        ref_index,
                        reference: patch.clone(),
                        degraded: Patch {
                            start_frame: deg_frame,
                            data: degraded.data.columns(deg_frame, width),
                        },
                    });
                }
                _ => map.dropped.push(ref_index),
            }
        }

        if !map.dropped.is_empty() {
            warn!(
                "{} of {} reference patches dropped during alignment",
                map.dropped.len(),
                ref_patches.len()
            );
        }
        debug!(
            "patch alignment: {} matched, radius {} frames",
            map.entries.len(),
            self.search_radius
        );
        (map, pairs)
    }
}

// ============================================================================
// Sub-frame refinement
// ============================================================================

/// Time span of one matched pair, in seconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatchTiming {
    pub ref_start_s: f64,
    pub ref_end_s: f64,
    pub deg_start_s: f64,
    pub deg_end_s: f64,
    /// Residual sample lag found inside the pair
    pub lag_s: f64,
}

/// Frame geometry needed to map frames back to samples
#[derive(Debug, Clone, Copy)]
pub struct FrameGeometry {
    pub hop_size: usize,
    pub window_size: usize,
    pub sample_rate: u32,
}

impl FrameGeometry {
    fn frame_duration_s(&self) -> f64 {
        self.hop_size as f64 / self.sample_rate as f64
    }

    fn patch_samples(&self, patch_frames: usize) -> usize {
        patch_frames.saturating_sub(1) * self.hop_size + self.window_size
    }
}

/// Refine a frame-level match with a sample-level alignment of the two
/// time-domain segments. Residual lags longer than one hop are ignored.
pub fn refine_patch_timing(
    reference: &AudioSignal,
    degraded: &AudioSignal,
    entry: &AlignmentEntry,
    patch_frames: usize,
    geometry: FrameGeometry,
) -> PatchTiming {
    let span = geometry.patch_samples(patch_frames);
    let ref_start = entry.ref_frame * geometry.hop_size;
    let deg_start = entry.deg_frame * geometry.hop_size;

    let ref_segment = reference.slice(ref_start, ref_start + span);
    let deg_segment = degraded.slice(deg_start, deg_start + span);
    let (_, _, lag_s) = align_and_truncate(&ref_segment, &deg_segment);

    let frame_s = geometry.frame_duration_s();
    let lag_s = if lag_s.abs() > frame_s { 0.0 } else { lag_s };
    let duration = span as f64 / geometry.sample_rate as f64;

    let ref_start_s = entry.ref_frame as f64 * frame_s;
    let deg_start_s = (entry.deg_frame as f64 * frame_s - lag_s).max(0.0);
    PatchTiming {
        ref_start_s,
        ref_end_s: ref_start_s + duration,
        deg_start_s,
        deg_end_s: deg_start_s + duration,
        lag_s,
    }
}
