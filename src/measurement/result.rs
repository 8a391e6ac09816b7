//! Measurement results, serialisable for JSON output and batch reports

use serde::{Deserialize, Serialize};

/// Listening-quality grade on the absolute category rating scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum QualityGrade {
    Bad,
    Poor,
    Fair,
    Good,
    Excellent,
}

impl QualityGrade {
    pub fn from_mos(mos: f64) -> Self {
        match mos {
            m if m >= 4.5 => QualityGrade::Excellent,
            m if m >= 3.5 => QualityGrade::Good,
            m if m >= 2.5 => QualityGrade::Fair,
            m if m >= 1.5 => QualityGrade::Poor,
            _ => QualityGrade::Bad,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            QualityGrade::Excellent => "excellent",
            QualityGrade::Good => "good",
            QualityGrade::Fair => "fair",
            QualityGrade::Poor => "poor",
            QualityGrade::Bad => "bad",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            QualityGrade::Excellent | QualityGrade::Good => "✓",
            QualityGrade::Fair => "⚠",
            QualityGrade::Poor | QualityGrade::Bad => "✗",
        }
    }
}

/// Similarity of one aligned reference/degraded patch pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchSimilarity {
    pub ref_start_s: f64,
    pub ref_end_s: f64,
    pub deg_start_s: f64,
    pub deg_end_s: f64,
    /// Mean NSIM over the whole patch
    pub similarity: f64,
    pub freq_band_means: Vec<f64>,
}

/// Outcome of one reference/degraded comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementResult {
    /// Objective MOS-LQO in [1, 5]
    pub moslqo: f64,
    /// Aggregate similarity, mean of `fvnsim` over covered bands
    pub vnsim: f64,
    pub fvnsim: Vec<f64>,
    pub fstdnsim: Vec<f64>,
    pub fvdegenergy: Vec<f64>,
    /// Patches contributing to each band
    pub band_coverage: Vec<usize>,
    pub center_freq_bands: Vec<f64>,
    /// Global lag removed before analysis, in seconds
    pub alignment_lag_s: f64,
    pub patch_sims: Vec<PatchSimilarity>,
}

impl MeasurementResult {
    pub fn grade(&self) -> QualityGrade {
        QualityGrade::from_mos(self.moslqo)
    }

    pub fn num_bands(&self) -> usize {
        self.fvnsim.len()
    }

    /// Mean patch similarity, or `None` when no patch was scored
    pub fn mean_patch_similarity(&self) -> Option<f64> {
        if self.patch_sims.is_empty() {
            return None;
        }
        let total: f64 = self.patch_sims.iter().map(|p| p.similarity).sum();
        Some(total / self.patch_sims.len() as f64)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MeasurementResult {
        MeasurementResult {
            moslqo: 4.1,
            vnsim: 0.9,
            fvnsim: vec![0.8, 1.0],
            fstdnsim: vec![0.1, 0.0],
            fvdegenergy: vec![12.0, 20.0],
            band_coverage: vec![2, 2],
            center_freq_bands: vec![50.0, 1_000.0],
            alignment_lag_s: 0.0,
            patch_sims: vec![
                PatchSimilarity {
                    ref_start_s: 0.0,
                    ref_end_s: 0.6,
                    deg_start_s: 0.0,
                    deg_end_s: 0.6,
                    similarity: 0.8,
                    freq_band_means: vec![0.7, 0.9],
                },
                PatchSimilarity {
                    ref_start_s: 0.6,
                    ref_end_s: 1.2,
                    deg_start_s: 0.6,
                    deg_end_s: 1.2,
                    similarity: 1.0,
                    freq_band_means: vec![0.9, 1.1],
                },
            ],
        }
    }

    #[test]
    fn test_grade_thresholds() {
        assert_eq!(QualityGrade::from_mos(5.0), QualityGrade::Excellent);
        assert_eq!(QualityGrade::from_mos(4.1), QualityGrade::Good);
        assert_eq!(QualityGrade::from_mos(3.0), QualityGrade::Fair);
        assert_eq!(QualityGrade::from_mos(2.0), QualityGrade::Poor);
        assert_eq!(QualityGrade::from_mos(1.0), QualityGrade::Bad);
        assert!(QualityGrade::Good > QualityGrade::Fair);
    }

    #[test]
    fn test_mean_patch_similarity() {
        let result = sample();
        assert!((result.mean_patch_similarity().unwrap() - 0.9).abs() < 1e-12);
        let empty = MeasurementResult {
            patch_sims: Vec::new(),
            ..result
        };
        assert!(empty.mean_patch_similarity().is_none());
    }

    #[test]
    fn test_json_contains_fields() {
        let json = sample().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["moslqo"], 4.1);
        assert_eq!(value["band_coverage"][0], 2);
        assert_eq!(value["patch_sims"].as_array().unwrap().len(), 2);
    }
}
