// src/core/analysis/vad.rs
//
// Energy-based voice activity detection on fixed-size chunks.

use crate::core::dsp::stats::rms;

/// Chunk RMS threshold on the int16 scale
pub const RMS_THRESHOLD: f64 = 5_000.0;
/// A chunk is inactive only once this many consecutive chunks are quiet
pub const SILENT_CHUNK_COUNT: usize = 3;

const INT16_SCALE: f64 = 32_768.0;

/// RMS voice activity detector
#[derive(Debug, Clone, Copy)]
pub struct RmsVad {
    chunk_size: usize,
    threshold: f64,
}

impl RmsVad {
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            threshold: RMS_THRESHOLD,
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// One activity flag per complete chunk of `samples`.
    pub fn process(&self, samples: &[f64]) -> Vec<bool> {
        let loud: Vec<bool> = samples
            .chunks_exact(self.chunk_size)
            .map(|chunk| rms(chunk) * INT16_SCALE >= self.threshold)
            .collect();

        (0..loud.len())
            .map(|i| {
                let first = (i + 1).saturating_sub(SILENT_CHUNK_COUNT);
                loud[first..=i].iter().any(|&l| l)
            })
            .collect()
    }
}
