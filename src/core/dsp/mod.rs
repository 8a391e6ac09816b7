//! Digital Signal Processing utilities

pub mod fft;
pub mod filters;
pub mod stats;
pub mod windows;

pub use fft::{calc_best_lag, cross_correlation};
pub use filters::{erb_center_frequencies, Biquad, GammatoneFilter, GammatoneFilterBank};
pub use windows::{apply_window, hann_window};

/// Dense row-major 2-D array of `f64`.
///
/// Time-frequency data is stored with one row per frequency band and one
/// column per frame, so a band's trace over time is a contiguous slice.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Grid {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Build from equally long rows. Returns `None` if the rows are ragged.
    pub fn from_rows(rows: &[Vec<f64>]) -> Option<Self> {
        let cols = rows.first().map_or(0, |r| r.len());
        if rows.iter().any(|r| r.len() != cols) {
            return None;
        }
        Some(Self {
            rows: rows.len(),
            cols,
            data: rows.iter().flatten().copied().collect(),
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[row * self.cols + col] = value;
    }

    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    pub fn values(&self) -> &[f64] {
        &self.data
    }

    /// Copy of `len` columns starting at `start`.
    pub fn columns(&self, start: usize, len: usize) -> Grid {
        let mut out = Grid::zeros(self.rows, len);
        for r in 0..self.rows {
            let src = &self.row(r)[start..start + len];
            out.data[r * len..(r + 1) * len].copy_from_slice(src);
        }
        out
    }

    pub fn map_inplace<F: Fn(f64) -> f64>(&mut self, f: F) {
        for v in self.data.iter_mut() {
            *v = f(*v);
        }
    }

    /// Element-wise combination of two grids of the same shape.
    pub fn zip_map<F: Fn(f64, f64) -> f64>(&self, other: &Grid, f: F) -> Grid {
        debug_assert_eq!((self.rows, self.cols), (other.rows, other.cols));
        Grid {
            rows: self.rows,
            cols: self.cols,
            data: self
                .data
                .iter()
                .zip(&other.data)
                .map(|(&a, &b)| f(a, b))
                .collect(),
        }
    }

    pub fn max(&self) -> f64 {
        self.data.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn min(&self) -> f64 {
        self.data.iter().copied().fold(f64::INFINITY, f64::min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_layout() {
        let grid = Grid::from_rows(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
        assert_eq!(grid.rows(), 2);
        assert_eq!(grid.cols(), 3);
        assert_eq!(grid.get(1, 2), 6.0);
        assert_eq!(grid.row(0), &[1.0, 2.0, 3.0]);

        let sub = grid.columns(1, 2);
        assert_eq!(sub.row(1), &[5.0, 6.0]);
        assert_eq!(grid.max(), 6.0);
        assert_eq!(grid.min(), 1.0);
    }

    #[test]
    fn test_ragged_rows_rejected() {
        assert!(Grid::from_rows(&[vec![1.0], vec![1.0, 2.0]]).is_none());
    }
}
