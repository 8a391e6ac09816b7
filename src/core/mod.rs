//! Signal handling, DSP primitives and the measurement engine

pub mod analysis;
pub mod analyzer;
pub mod decoder;
pub mod dsp;
pub mod signal;

pub use analyzer::{ApiState, VisqolApi};
pub use decoder::{decode_audio, load_as_mono, AudioData};
pub use signal::AudioSignal;
