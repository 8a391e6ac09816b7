// src/error.rs
//
// Error taxonomy for configuration, model loading and measurement.

use thiserror::Error;

/// Broad category of a [`VisqolError`], independent of its message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No sample rate was supplied in the configuration
    MissingAudioInfo,
    /// Sample rate other than 48 kHz without the override flag
    UnsupportedSampleRate,
    /// The regression model could not be read or parsed
    ModelLoadFailure,
    /// Empty, non-finite or too-short input at measurement time
    InvalidInputSignal,
    /// Every reference patch fell below the similarity floor
    AlignmentFailure,
    /// `measure` was called before a successful `create`
    NotConfigured,
    /// A serialized configuration could not be read or parsed
    MalformedConfig,
}

impl ErrorKind {
    /// Canonical status name used by integrations that compare status strings.
    pub fn status_code(&self) -> &'static str {
        match self {
            ErrorKind::NotConfigured => "FAILED_PRECONDITION",
            _ => "INVALID_ARGUMENT",
        }
    }
}

#[derive(Debug, Error)]
pub enum VisqolError {
    #[error("Audio info must be supplied for config.")]
    MissingAudioInfo,

    #[error(
        "Currently, {}k is the only sample rate supported by ViSQOL Audio. \
         See README for details of overriding.",
        .supported / 1000
    )]
    UnsupportedSampleRate { requested: u32, supported: u32 },

    #[error("Failed to load the SVR model file: {path}")]
    ModelLoadFailure { path: String, reason: String },

    #[error("Invalid input signal: {reason}")]
    InvalidInputSignal { reason: String },

    #[error("No reference patch could be aligned with the degraded signal.")]
    AlignmentFailure,

    #[error("ViSQOL must be created with a valid config before measuring.")]
    NotConfigured,

    #[error("Malformed config: {reason}")]
    MalformedConfig { reason: String },
}

impl VisqolError {
    pub(crate) fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInputSignal {
            reason: reason.into(),
        }
    }

    pub(crate) fn model_load(path: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::ModelLoadFailure {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            VisqolError::MissingAudioInfo => ErrorKind::MissingAudioInfo,
            VisqolError::UnsupportedSampleRate { .. } => ErrorKind::UnsupportedSampleRate,
            VisqolError::ModelLoadFailure { .. } => ErrorKind::ModelLoadFailure,
            VisqolError::InvalidInputSignal { .. } => ErrorKind::InvalidInputSignal,
            VisqolError::AlignmentFailure => ErrorKind::AlignmentFailure,
            VisqolError::NotConfigured => ErrorKind::NotConfigured,
            VisqolError::MalformedConfig { .. } => ErrorKind::MalformedConfig,
        }
    }

    /// Renders the error as `"<STATUS>: <message>"`.
    pub fn status_string(&self) -> String {
        format!("{}: {}", self.kind().status_code(), self)
    }
}

pub type Result<T> = std::result::Result<T, VisqolError>;
