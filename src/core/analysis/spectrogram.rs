// src/core/analysis/spectrogram.rs
//
// Time-frequency transform: gammatone filterbank energies over sliding Hann
// windows, producing one RMS value per (band, frame) cell.

use log::debug;

use crate::config::AnalysisProfile;
use crate::core::dsp::stats::power_to_db;
use crate::core::dsp::{apply_window, hann_window, GammatoneFilterBank, Grid};

/// Absolute floor applied to both neurograms, in dB
pub const NOISE_FLOOR_ABSOLUTE_DB: f64 = -45.0;
/// Dynamic range kept below each neurogram's peak, in dB
pub const NOISE_FLOOR_RELATIVE_TO_PEAK_DB: f64 = 45.0;

/// Band energies of one signal, rows ordered from the lowest band up.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrogram {
    pub data: Grid,
    pub center_freqs: Vec<f64>,
}

impl Spectrogram {
    pub fn num_bands(&self) -> usize {
        self.data.rows()
    }

    pub fn num_frames(&self) -> usize {
        self.data.cols()
    }

    /// Convert every cell to dB (`10·log10`).
    pub fn convert_to_db(&mut self) {
        self.data.map_inplace(power_to_db);
    }

    /// Clamp every cell to at least `floor`.
    pub fn raise_floor(&mut self, floor: f64) {
        self.data.map_inplace(|v| v.max(floor));
    }

    pub fn subtract_floor(&mut self, floor: f64) {
        self.data.map_inplace(|v| v - floor);
    }
}

/// Builds spectrograms for one analysis profile at one sample rate.
#[derive(Debug, Clone)]
pub struct SpectrogramBuilder {
    filterbank: GammatoneFilterBank,
    window: Vec<f64>,
    hop_size: usize,
}

impl SpectrogramBuilder {
    pub fn new(profile: &AnalysisProfile, sample_rate: u32) -> Self {
        let window_size = profile.window_size(sample_rate);
        Self {
            filterbank: GammatoneFilterBank::new(
                sample_rate,
                profile.num_bands,
                profile.min_freq_hz,
                profile.max_freq_for(sample_rate),
            ),
            window: hann_window(window_size),
            hop_size: profile.hop_size(sample_rate),
        }
    }

    pub fn window_size(&self) -> usize {
        self.window.len()
    }

    pub fn hop_size(&self) -> usize {
        self.hop_size
    }

    pub fn center_freqs(&self) -> Vec<f64> {
        self.filterbank.center_freqs()
    }

    /// Number of complete windows in `num_samples`. A trailing partial window
    /// is never analysed.
    pub fn num_frames(&self, num_samples: usize) -> usize {
        if num_samples < self.window.len() || self.window.is_empty() {
            return 0;
        }
        (num_samples - self.window.len()) / self.hop_size + 1
    }

    pub fn build(&self, samples: &[f64]) -> Spectrogram {
        let num_frames = self.num_frames(samples.len());
        let window_size = self.window.len();
        let mut data = Grid::zeros(self.filterbank.num_bands(), num_frames);

        for frame_idx in 0..num_frames {
            let start = frame_idx * self.hop_size;
            let frame = apply_window(&samples[start..start + window_size], &self.window);
            for (band, energy) in self.filterbank.band_rms(&frame).into_iter().enumerate() {
                data.set(band, frame_idx, energy);
            }
        }

        debug!(
            "spectrogram: {} samples -> {} bands x {} frames",
            samples.len(),
            data.rows(),
            num_frames
        );
        Spectrogram {
            data,
            center_freqs: self.filterbank.center_freqs(),
        }
    }
}

/// Bring both neurograms into a shared dB range: absolute floor, common
/// relative-to-peak floor, then shift so the lowest cell of either is 0 dB.
pub fn prepare_for_comparison(reference: &mut Spectrogram, degraded: &mut Spectrogram) {
    reference.convert_to_db();
    degraded.convert_to_db();

    reference.raise_floor(NOISE_FLOOR_ABSOLUTE_DB);
    degraded.raise_floor(NOISE_FLOOR_ABSOLUTE_DB);

    let ref_floor = reference.data.max() - NOISE_FLOOR_RELATIVE_TO_PEAK_DB;
    let deg_floor = degraded.data.max() - NOISE_FLOOR_RELATIVE_TO_PEAK_DB;
    let lowest_floor = ref_floor.min(deg_floor);
    reference.raise_floor(lowest_floor);
    degraded.raise_floor(lowest_floor);

    let global_min = reference.data.min().min(degraded.data.min());
    if global_min.is_finite() {
        reference.subtract_floor(global_min);
        degraded.subtract_floor(global_min);
    }
}
