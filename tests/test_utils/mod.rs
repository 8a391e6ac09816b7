// tests/test_utils/mod.rs
//
// Shared helpers: deterministic synthetic signals and WAV fixtures.

#![allow(dead_code)]

use std::f64::consts::PI;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

static FIXTURE_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Seeded linear congruential generator
pub struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self(seed)
    }

    /// Uniform value in [-1, 1)
    pub fn next_f64(&mut self) -> f64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((self.0 >> 11) as f64 / (1u64 << 53) as f64) * 2.0 - 1.0
    }
}

/// Voiced bursts at three syllables per second with a few formant-like partials
pub fn speech_like(seconds: f64, sample_rate: u32) -> Vec<f64> {
    let len = (seconds * sample_rate as f64) as usize;
    (0..len)
        .map(|n| {
            let t = n as f64 / sample_rate as f64;
            let envelope = (2.0 * PI * 3.0 * t).sin().max(0.0);
            envelope
                * (0.4 * (2.0 * PI * 180.0 * t).sin()
                    + 0.2 * (2.0 * PI * 900.0 * t).sin()
                    + 0.1 * (2.0 * PI * 2_600.0 * t).sin())
        })
        .collect()
}

/// Broadband music-like signal: a chord with slow amplitude modulation and
/// a little seeded noise
pub fn music_like(seconds: f64, sample_rate: u32) -> Vec<f64> {
    let len = (seconds * sample_rate as f64) as usize;
    let mut rng = Lcg::new(7);
    (0..len)
        .map(|n| {
            let t = n as f64 / sample_rate as f64;
            let tremolo = 0.6 + 0.4 * (2.0 * PI * 0.7 * t).sin();
            tremolo
                * (0.25 * (2.0 * PI * 220.0 * t).sin()
                    + 0.15 * (2.0 * PI * 277.2 * t).sin()
                    + 0.1 * (2.0 * PI * 329.6 * t).sin()
                    + 0.05 * (2.0 * PI * 5_000.0 * t).sin())
                + 0.01 * rng.next_f64()
        })
        .collect()
}

/// `signal` plus seeded white noise of the given amplitude
pub fn add_noise(signal: &[f64], amplitude: f64, seed: u64) -> Vec<f64> {
    let mut rng = Lcg::new(seed);
    signal.iter().map(|s| s + amplitude * rng.next_f64()).collect()
}

/// Prepend `samples` zeros
pub fn delayed(signal: &[f64], samples: usize) -> Vec<f64> {
    let mut out = vec![0.0; samples];
    out.extend_from_slice(signal);
    out
}

/// Fresh path under the system temp directory
pub fn temp_path(name: &str) -> PathBuf {
    let id = FIXTURE_COUNTER.fetch_add(1, Ordering::SeqCst);
    let dir = std::env::temp_dir().join(format!("visqol-tests-{}", std::process::id()));
    let _ = std::fs::create_dir_all(&dir);
    dir.join(format!("{}-{}", id, name))
}

/// Write interleaved channels as 16-bit PCM
pub fn write_wav(path: &Path, channels: &[Vec<f64>], sample_rate: u32) {
    let spec = hound::WavSpec {
        channels: channels.len() as u16,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).expect("create wav");
    let frames = channels.iter().map(Vec::len).min().unwrap_or(0);
    for i in 0..frames {
        for channel in channels {
            let value = (channel[i].clamp(-1.0, 1.0) * 32_767.0).round() as i16;
            writer.write_sample(value).expect("write sample");
        }
    }
    writer.finalize().expect("finalize wav");
}

pub fn write_mono_wav(name: &str, samples: &[f64], sample_rate: u32) -> PathBuf {
    let path = temp_path(name);
    write_wav(&path, &[samples.to_vec()], sample_rate);
    path
}
