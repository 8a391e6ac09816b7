//! ViSQOL - objective perceptual audio quality
//!
//! Compares a degraded recording against its clean reference and predicts
//! the mean opinion score a listening panel would give (MOS-LQO, 1 to 5).
//!
//! ## Pipeline
//!
//! 1. Global alignment by cross-correlation, then level matching
//! 2. Gammatone spectrograms of both signals on an ERB-spaced filterbank
//! 3. Fixed-width reference patches (voice-activity filtered in speech mode)
//! 4. Bounded, monotonic search for the best degraded match of each patch
//! 5. Neurogram similarity (NSIM) per band
//! 6. Mapping to MOS-LQO: SVR regression for audio, a fixed curve for speech
//!
//! ## Module Structure
//!
//! - `config` - Measurement requests, mode profiles and validation
//! - `core` - Signal handling, DSP, analysis stages and the orchestrator
//! - `measurement` - Result types
//! - `cli` - Command-line interface
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use visqol::{VisqolApi, VisqolConfig};
//!
//! let config = VisqolConfig::new(48_000);
//! let api = VisqolApi::from_config(&config)?;
//! let result = api.measure(&reference, &degraded)?;
//!
//! println!("MOS-LQO: {:.3}", result.moslqo);
//! ```
//!
//! ## Audio-mode model
//!
//! The bundled model is a linear placeholder (`MOS = 8 * mean(fvnsim) - 3`),
//! not a trained SVR. It ranks degradations consistently but does not
//! reproduce published ViSQOL scores. Load a trained libsvm model through
//! `VisqolConfig::with_model_path` or `--similarity-to-quality-model` for
//! calibrated results.
//!
//! ## Modes
//!
//! | Mode   | Bands | Range           | Patch  | Mapping            |
//! |--------|-------|-----------------|--------|--------------------|
//! | Audio  | 32    | 50 Hz - Nyquist | 30 fr. | SVR model          |
//! | Speech | 21    | 50 Hz - 8 kHz   | 20 fr. | exponential curve  |

// Command-line interface
pub mod cli;

// Requests, profiles and validation
pub mod config;

// Signal processing and the measurement engine
pub mod core;

pub mod error;

// Measurement result types
pub mod measurement;

pub use config::{ScoringMode, VisqolConfig};
pub use core::{ApiState, AudioSignal, VisqolApi};
pub use error::{ErrorKind, Result, VisqolError};
pub use measurement::{MeasurementResult, PatchSimilarity, QualityGrade};
