//! Similarity-and-mapping engine
//!
//! The stages of one measurement, in pipeline order:
//! - Spectrogram construction (gammatone filterbank neurograms)
//! - Patch selection, with voice activity filtering in speech mode
//! - Global and patch-level alignment
//! - NSIM scoring per band
//! - Mapping of the similarity vector to MOS-LQO

pub mod alignment;
pub mod mapping;
pub mod nsim;
pub mod patches;
pub mod spectrogram;
pub mod svr;
pub mod vad;

pub use alignment::{
    align_and_truncate, globally_align, refine_patch_timing, AlignedPair, AlignmentEntry,
    AlignmentMap, FrameGeometry, PatchAligner, PatchTiming, MIN_PATCH_SIMILARITY,
};
pub use mapping::{QualityMapper, RegressionModel, MOS_MAX, MOS_MIN};
pub use nsim::{measure_patch_similarity, score_pairs, NsimScore, SimilarityVector};
pub use patches::{Patch, PatchCreator};
pub use spectrogram::{prepare_for_comparison, Spectrogram, SpectrogramBuilder};
pub use svr::{Kernel, SvrModel, SvrModelError};
pub use vad::RmsVad;
