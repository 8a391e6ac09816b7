// src/core/analysis/nsim.rs
//
// Neurogram Similarity Index Measure. A structural-similarity style index
// computed over a 3x3 Gaussian neighbourhood of each time-frequency cell,
// then reduced per band and across patches.

use serde::{Deserialize, Serialize};

use super::alignment::AlignedPair;
use crate::core::dsp::stats::{mean, std_dev};
use crate::core::dsp::Grid;

/// Dynamic range of the compared intensities
const INTENSITY_RANGE: f64 = 1.0;

/// 3x3 Gaussian weighting window (sigma = 0.5)
const GAUSSIAN_WINDOW: [[f64; 3]; 3] = [
    [0.0113033910173052, 0.0838251475442633, 0.0113033910173052],
    [0.0838251475442633, 0.619485845753726, 0.0838251475442633],
    [0.0113033910173052, 0.0838251475442633, 0.0113033910173052],
];

/// Similarity of one reference/degraded patch pair
#[derive(Debug, Clone, PartialEq)]
pub struct NsimScore {
    /// Mean of the similarity map, per band
    pub band_means: Vec<f64>,
    /// Standard deviation of the similarity map, per band
    pub band_stddevs: Vec<f64>,
    /// Mean degraded intensity, per band
    pub band_deg_energy: Vec<f64>,
    /// Mean of the whole similarity map
    pub similarity: f64,
}

/// 2-D convolution with the Gaussian window, same-size output, zero padding.
fn gaussian_filter(grid: &Grid) -> Grid {
    let (rows, cols) = (grid.rows(), grid.cols());
    let mut out = Grid::zeros(rows, cols);
    for r in 0..rows {
        for c in 0..cols {
            let mut acc = 0.0;
            for (dr, w_row) in GAUSSIAN_WINDOW.iter().enumerate() {
                let rr = r as isize + dr as isize - 1;
                if rr < 0 || rr >= rows as isize {
                    continue;
                }
                for (dc, &w) in w_row.iter().enumerate() {
                    let cc = c as isize + dc as isize - 1;
                    if cc < 0 || cc >= cols as isize {
                        continue;
                    }
                    acc += w * grid.get(rr as usize, cc as usize);
                }
            }
            out.set(r, c, acc);
        }
    }
    out
}

/// Compare two equally shaped patches.
///
/// Every cell of the similarity map lies in [-1, 1]: variances are clamped
/// at zero and the covariance at the Cauchy-Schwarz bound.
pub fn measure_patch_similarity(reference: &Grid, degraded: &Grid) -> NsimScore {
    let c1 = (0.01 * INTENSITY_RANGE).powi(2);
    let c3 = (0.03 * INTENSITY_RANGE).powi(2) / 2.0;

    let mu_r = gaussian_filter(reference);
    let mu_d = gaussian_filter(degraded);
    let ref_sq = gaussian_filter(&reference.zip_map(reference, |a, b| a * b));
    let deg_sq = gaussian_filter(&degraded.zip_map(degraded, |a, b| a * b));
    let ref_deg = gaussian_filter(&reference.zip_map(degraded, |a, b| a * b));

    let (rows, cols) = (reference.rows(), reference.cols());
    let mut sim_map = Grid::zeros(rows, cols);
    for r in 0..rows {
        for c in 0..cols {
            let (mr, md) = (mu_r.get(r, c), mu_d.get(r, c));
            let mr_sq = mr * mr;
            let md_sq = md * md;
            let mr_md = mr * md;

            let sigma_r_sq = (ref_sq.get(r, c) - mr_sq).max(0.0);
            let sigma_d_sq = (deg_sq.get(r, c) - md_sq).max(0.0);
            let bound = (sigma_r_sq * sigma_d_sq).sqrt();
            let sigma_rd = (ref_deg.get(r, c) - mr_md).clamp(-bound, bound);

            let intensity = (2.0 * mr_md + c1) / (mr_sq + md_sq + c1);
            let structure = (sigma_rd + c3) / (bound + c3);
            sim_map.set(r, c, (intensity * structure).clamp(-1.0, 1.0));
        }
    }

    let band_means: Vec<f64> = (0..rows).map(|r| mean(sim_map.row(r))).collect();
    let band_stddevs = (0..rows).map(|r| std_dev(sim_map.row(r))).collect();
    let band_deg_energy = (0..rows).map(|r| mean(degraded.row(r))).collect();

    NsimScore {
        similarity: mean(&band_means),
        band_means,
        band_stddevs,
        band_deg_energy,
    }
}

/// Per-band and aggregate similarity across all aligned patches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityVector {
    /// Mean similarity per band; `0.0` where a band has no coverage
    pub fvnsim: Vec<f64>,
    /// Mean per-band spread of the similarity map
    pub fstdnsim: Vec<f64>,
    /// Mean degraded energy per band
    pub fvdegenergy: Vec<f64>,
    /// Number of patches that contributed to each band
    pub band_coverage: Vec<usize>,
    /// Mean of `fvnsim` over covered bands
    pub vnsim: f64,
}

impl SimilarityVector {
    pub fn num_bands(&self) -> usize {
        self.fvnsim.len()
    }

    pub fn covered_bands(&self) -> usize {
        self.band_coverage.iter().filter(|&&n| n > 0).count()
    }
}

/// Score aligned pairs. Returns the aggregate vector together with the
/// per-pair scores in input order.
pub fn score_pairs(pairs: &[AlignedPair], num_bands: usize) -> (SimilarityVector, Vec<NsimScore>) {
    let scores: Vec<NsimScore> = pairs
        .iter()
        .map(|p| measure_patch_similarity(&p.reference.data, &p.degraded.data))
        .collect();

    let mut sums = vec![0.0; num_bands];
    let mut std_sums = vec![0.0; num_bands];
    let mut energy_sums = vec![0.0; num_bands];
    let mut coverage = vec![0usize; num_bands];

    for score in &scores {
        for band in 0..num_bands.min(score.band_means.len()) {
            let value = score.band_means[band];
            if !value.is_finite() {
                continue;
            }
            sums[band] += value;
            std_sums[band] += score.band_stddevs[band];
            energy_sums[band] += score.band_deg_energy[band];
            coverage[band] += 1;
        }
    }

    let average = |sums: &[f64]| -> Vec<f64> {
        sums.iter()
            .zip(&coverage)
            .map(|(&s, &n)| if n > 0 { s / n as f64 } else { 0.0 })
            .collect()
    };
    let fvnsim: Vec<f64> = average(&sums)
        .into_iter()
        .map(|v| v.clamp(-1.0, 1.0))
        .collect();
    let fstdnsim = average(&std_sums);
    let fvdegenergy = average(&energy_sums);

    let covered: Vec<f64> = fvnsim
        .iter()
        .zip(&coverage)
        .filter(|(_, &n)| n > 0)
        .map(|(&v, _)| v)
        .collect();

    let vector = SimilarityVector {
        vnsim: mean(&covered),
        fvnsim,
        fstdnsim,
        fvdegenergy,
        band_coverage: coverage,
    };
    (vector, scores)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::analysis::patches::Patch;

    fn ramp_grid(rows: usize, cols: usize, offset: f64) -> Grid {
        let data: Vec<Vec<f64>> = (0..rows)
            .map(|r| (0..cols).map(|c| offset + (r * cols + c) as f64 % 7.0).collect())
            .collect();
        Grid::from_rows(&data).unwrap()
    }

    fn pair(reference: Grid, degraded: Grid) -> AlignedPair {
        AlignedPair {
            ref_index: 0,
            reference: Patch { start_frame: 0, data: reference },
            degraded: Patch { start_frame: 0, data: degraded },
        }
    }

    #[test]
    fn test_window_sums_to_one() {
        let total: f64 = GAUSSIAN_WINDOW.iter().flatten().sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_identical_patches_score_one() {
        let grid = ramp_grid(6, 10, 3.0);
        let score = measure_patch_similarity(&grid, &grid);
        assert!((score.similarity - 1.0).abs() < 1e-12);
        assert!(score.band_means.iter().all(|&v| (v - 1.0).abs() < 1e-12));
        assert!(score.band_stddevs.iter().all(|&v| v < 1e-9));
    }

    #[test]
    fn test_flat_identical_patches_score_one() {
        let grid = Grid::zeros(4, 8);
        let score = measure_patch_similarity(&grid, &grid);
        assert!((score.similarity - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_different_patches_score_lower() {
        let reference = ramp_grid(6, 10, 3.0);
        let degraded = ramp_grid(6, 10, 0.0).zip_map(&reference, |d, r| (d * 3.0 + r) % 5.0);
        let score = measure_patch_similarity(&reference, &degraded);
        assert!(score.similarity < 1.0);
        assert!(score.band_means.iter().all(|&v| (-1.0..=1.0).contains(&v)));
    }

    #[test]
    fn test_score_pairs_averages_bands() {
        let reference = ramp_grid(4, 8, 2.0);
        let degraded = ramp_grid(4, 8, 0.0);
        let pairs = vec![
            pair(reference.clone(), reference.clone()),
            pair(reference.clone(), degraded.clone()),
        ];
        let (vector, scores) = score_pairs(&pairs, 4);
        assert_eq!(scores.len(), 2);
        assert_eq!(vector.band_coverage, vec![2, 2, 2, 2]);
        for band in 0..4 {
            let expected = (scores[0].band_means[band] + scores[1].band_means[band]) / 2.0;
            assert!((vector.fvnsim[band] - expected).abs() < 1e-12);
        }
        let mean_fvnsim = vector.fvnsim.iter().sum::<f64>() / 4.0;
        assert!((vector.vnsim - mean_fvnsim).abs() < 1e-12);
    }

    #[test]
    fn test_score_pairs_empty() {
        let (vector, scores) = score_pairs(&[], 3);
        assert!(scores.is_empty());
        assert_eq!(vector.covered_bands(), 0);
        assert_eq!(vector.fvnsim, vec![0.0; 3]);
        assert_eq!(vector.vnsim, 0.0);
    }
}
