//! Measurement result types

mod result;

pub use result::{MeasurementResult, PatchSimilarity, QualityGrade};
