// src/core/analysis/patches.rs
//
// Splits a reference neurogram into fixed-width patches. Audio mode keeps
// every complete patch on a regular grid; speech mode keeps only patches
// with enough voice activity.

use log::debug;

use super::spectrogram::Spectrogram;
use super::vad::RmsVad;
use crate::config::{AnalysisProfile, PatchSelection};
use crate::core::dsp::Grid;

/// Minimum fraction of active frames for a speech patch to be scored
pub const FRAMES_WITH_VOICE_THRESHOLD: f64 = 0.3;

/// Fixed-width slice of a neurogram: every band over `patch_size` frames
#[derive(Debug, Clone, PartialEq)]
pub struct Patch {
    /// Index of the first frame within the source neurogram
    pub start_frame: usize,
    pub data: Grid,
}

impl Patch {
    pub fn num_frames(&self) -> usize {
        self.data.cols()
    }

    pub fn num_bands(&self) -> usize {
        self.data.rows()
    }
}

#[derive(Debug, Clone)]
pub struct PatchCreator {
    selection: PatchSelection,
    patch_size: usize,
    hop_size: usize,
    window_size: usize,
}

impl PatchCreator {
    pub fn new(profile: &AnalysisProfile, sample_rate: u32) -> Self {
        Self {
            selection: profile.patch_selection,
            patch_size: profile.patch_size,
            hop_size: profile.hop_size(sample_rate),
            window_size: profile.window_size(sample_rate),
        }
    }

    pub fn patch_size(&self) -> usize {
        self.patch_size
    }

    /// Number of complete patches a neurogram of `num_frames` frames holds,
    /// before any voice-activity filtering.
    pub fn complete_patch_count(&self, num_frames: usize) -> usize {
        grid_indices(num_frames, self.patch_size).len()
    }

    /// Start frames of the reference patches. The first patch begins half a
    /// patch in; only complete patches are returned.
    pub fn ref_patch_indices(&self, spectrogram: &Spectrogram, ref_samples: &[f64]) -> Vec<usize> {
        let grid = grid_indices(spectrogram.num_frames(), self.patch_size);
        match self.selection {
            PatchSelection::Image => grid,
            PatchSelection::VoiceActivity => {
                let active = self.active_frames(ref_samples, spectrogram.num_frames());
                let kept: Vec<usize> = grid
                    .iter()
                    .copied()
                    .filter(|&start| {
                        let count = active[start..start + self.patch_size]
                            .iter()
                            .filter(|&&a| a)
                            .count();
                        count as f64 / self.patch_size as f64 >= FRAMES_WITH_VOICE_THRESHOLD
                    })
                    .collect();
                debug!(
                    "voice activity kept {} of {} reference patches",
                    kept.len(),
                    grid.len()
                );
                kept
            }
        }
    }

    /// A frame is active when any hop-sized chunk it spans is active.
    fn active_frames(&self, samples: &[f64], num_frames: usize) -> Vec<bool> {
        let chunks = RmsVad::new(self.hop_size).process(samples);
        let chunks_per_frame = self.window_size.div_ceil(self.hop_size).max(1);
        (0..num_frames)
            .map(|f| {
                let end = (f + chunks_per_frame).min(chunks.len());
                f < end && chunks[f..end].iter().any(|&a| a)
            })
            .collect()
    }

    pub fn create_patches(&self, spectrogram: &Spectrogram, indices: &[usize]) -> Vec<Patch> {
        indices
            .iter()
            .map(|&start| Patch {
                start_frame: start,
                data: spectrogram.data.columns(start, self.patch_size),
            })
            .collect()
    }
}

fn grid_indices(num_frames: usize, patch_size: usize) -> Vec<usize> {
    if patch_size == 0 {
        return Vec::new();
    }
    let first = (patch_size / 2).saturating_sub(1);
    (first..)
        .step_by(patch_size)
        .take_while(|start| start + patch_size <= num_frames)
        .collect()
}
