// src/core/decoder.rs
//
// File decoding. Uses Symphonia for format-agnostic decoding and mixes every
// file down to a single channel before measurement.

use anyhow::{bail, Context, Result};
use log::debug;
use std::fs::File;
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use super::signal::AudioSignal;

/// Decoded interleaved audio with its stream parameters
#[derive(Debug, Clone)]
pub struct AudioData {
    /// Interleaved samples normalized to [-1.0, 1.0]
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: usize,
    pub duration_secs: f64,
    pub codec_name: String,
}

/// Decode an audio file to floating-point samples
pub fn decode_audio(path: &Path) -> Result<AudioData> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open file: {}", path.display()))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let mut probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .context("Failed to probe file format - may be corrupted or unsupported")?;

    let track = probed
        .format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .context("No supported audio track found in file")?;

    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .context("File does not specify sample rate")?;
    let channels = track.codec_params.channels.map(|c| c.count()).unwrap_or(1);
    if channels == 0 {
        bail!("File reports 0 audio channels");
    }
    let codec_name = format!("{:?}", track.codec_params.codec);

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .context("Failed to create decoder for audio codec")?;

    let mut samples: Vec<f32> = Vec::new();
    let mut sample_buf: Option<SampleBuffer<f32>> = None;

    loop {
        let packet = match probed.format.next_packet() {
            Ok(packet) => packet,
            Err(symphonia::core::errors::Error::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break
            }
            Err(symphonia::core::errors::Error::ResetRequired) => {
                decoder.reset();
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(buf) => buf,
            Err(symphonia::core::errors::Error::DecodeError(_)) => continue,
            Err(e) => return Err(e.into()),
        };

        if sample_buf.is_none() {
            let spec = *decoded.spec();
            sample_buf = Some(SampleBuffer::new(decoded.capacity() as u64, spec));
        }

        if let Some(ref mut buf) = sample_buf {
            buf.copy_interleaved_ref(decoded);
            samples.extend_from_slice(buf.samples());
        }
    }

    if samples.is_empty() {
        bail!("No audio samples decoded from {}", path.display());
    }

    let duration_secs = samples.len() as f64 / (sample_rate as f64 * channels as f64);
    debug!(
        "decoded {}: {} Hz, {} ch, {:.2} s, {}",
        path.display(),
        sample_rate,
        channels,
        duration_secs,
        codec_name
    );

    Ok(AudioData {
        samples,
        sample_rate,
        channels,
        duration_secs,
        codec_name,
    })
}

/// Average all channels into one
pub fn extract_mono(audio: &AudioData) -> Vec<f64> {
    if audio.channels <= 1 {
        return audio.samples.iter().map(|&s| s as f64).collect();
    }
    audio
        .samples
        .chunks_exact(audio.channels)
        .map(|frame| frame.iter().map(|&s| s as f64).sum::<f64>() / audio.channels as f64)
        .collect()
}

/// Decode `path` and mix it down to a mono signal
pub fn load_as_mono<P: AsRef<Path>>(path: P) -> Result<AudioSignal> {
    let audio = decode_audio(path.as_ref())?;
    if audio.channels > 1 {
        debug!(
            "mixing {} channels of {} to mono",
            audio.channels,
            path.as_ref().display()
        );
    }
    Ok(AudioSignal::new(extract_mono(&audio), audio.sample_rate))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn audio(samples: Vec<f32>, channels: usize) -> AudioData {
        AudioData {
            samples,
            sample_rate: 48_000,
            channels,
            duration_secs: 0.0,
            codec_name: "Test".to_string(),
        }
    }

    #[test]
    fn test_extract_mono_averages_channels() {
        let mono = extract_mono(&audio(vec![0.5, -0.5, 0.25, 0.75], 2));
        assert_eq!(mono.len(), 2);
        assert!(mono[0].abs() < 1e-9);
        assert!((mono[1] - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_extract_mono_passthrough() {
        let mono = extract_mono(&audio(vec![0.5, -0.25], 1));
        assert_eq!(mono, vec![0.5, -0.25]);
    }

    #[test]
    fn test_extract_mono_drops_partial_frame() {
        let mono = extract_mono(&audio(vec![0.5, 0.5, 0.5, 0.1, 0.2], 3));
        assert_eq!(mono.len(), 1);
    }

    #[test]
    fn test_missing_file() {
        assert!(load_as_mono("no/such/file.wav").is_err());
    }
}
