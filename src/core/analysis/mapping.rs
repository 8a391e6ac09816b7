// src/core/analysis/mapping.rs
//
// Similarity-to-quality mapping. Audio mode feeds the per-band similarity
// vector to a regression model; speech mode applies a fixed exponential
// curve to the aggregate similarity.

use std::fmt;

use log::{debug, info};

use super::nsim::SimilarityVector;
use super::svr::SvrModel;
use crate::config::ScoringMode;
use crate::error::{Result, VisqolError};

pub const MOS_MIN: f64 = 1.0;
pub const MOS_MAX: f64 = 5.0;

// Exponential speech curve: f(x) = a + exp(b * (x - x0))
const SPEECH_CURVE_A: f64 = 1.155945;
const SPEECH_CURVE_B: f64 = 4.68378;
const SPEECH_CURVE_X0: f64 = 0.76309;

/// Anything that turns a feature vector into a raw quality estimate
pub trait RegressionModel: Send + Sync + fmt::Debug {
    fn predict(&self, features: &[f64]) -> f64;
}

impl RegressionModel for SvrModel {
    fn predict(&self, features: &[f64]) -> f64 {
        SvrModel::predict(self, features)
    }
}

fn speech_curve(x: f64) -> f64 {
    SPEECH_CURVE_A + (SPEECH_CURVE_B * (x - SPEECH_CURVE_X0)).exp()
}

/// Maps a similarity vector to MOS-LQO in [1, 5]
#[derive(Debug)]
pub enum QualityMapper {
    Audio { model: Box<dyn RegressionModel> },
    Speech { scale_to_max_mos: bool },
}

impl QualityMapper {
    /// Build the mapper for `mode`. In audio mode an empty `model_path`
    /// selects the built-in model; speech mode never reads a model.
    pub fn load(mode: ScoringMode, model_path: &str) -> Result<Self> {
        match mode {
            ScoringMode::Speech { scale_to_max_mos } => {
                if !model_path.is_empty() {
                    debug!("speech mode ignores model path '{}'", model_path);
                }
                Ok(QualityMapper::Speech { scale_to_max_mos })
            }
            ScoringMode::Audio => {
                let model = if model_path.is_empty() {
                    info!("no SVR model given, using the uncalibrated linear placeholder");
                    SvrModel::builtin().map_err(|e| VisqolError::model_load("<built-in>", e))?
                } else {
                    SvrModel::from_file(model_path)
                        .map_err(|e| VisqolError::model_load(model_path, e))?
                };
                info!(
                    "loaded {} SVR model with {} support vectors",
                    model.kernel(),
                    model.num_support_vectors()
                );
                Ok(QualityMapper::Audio {
                    model: Box::new(model),
                })
            }
        }
    }

    /// Audio-mode mapper around an arbitrary regression model
    pub fn with_model(model: Box<dyn RegressionModel>) -> Self {
        QualityMapper::Audio { model }
    }

    pub fn predict(&self, similarity: &SimilarityVector) -> f64 {
        let raw = match self {
            QualityMapper::Audio { model } => model.predict(&similarity.fvnsim),
            QualityMapper::Speech { scale_to_max_mos } => {
                let mos = speech_curve(similarity.vnsim);
                if *scale_to_max_mos {
                    MOS_MAX * mos / speech_curve(1.0)
                } else {
                    mos
                }
            }
        };
        if raw.is_nan() {
            return MOS_MIN;
        }
        raw.clamp(MOS_MIN, MOS_MAX)
    }
}
