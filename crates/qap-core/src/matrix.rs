//! Dense square matrix used for distance/flow data and solver snapshots.

use crate::error::{QapError, QapResult};
use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// A dense n x n matrix of reals, stored row-major.
///
/// Backs the distance matrix A, the flow matrix B, the big-M matrix, and
/// the X/W value snapshots exchanged with the solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SquareMatrix {
    n: usize,
    data: Vec<f64>,
}

impl SquareMatrix {
    /// Create an n x n matrix filled with zeros.
    pub fn zeros(n: usize) -> Self {
        Self {
            n,
            data: vec![0.0; n * n],
        }
    }

    /// Build from a flat row-major vector. Fails when the length is not a
    /// perfect square matching `n * n`.
    pub fn from_flat(n: usize, data: Vec<f64>) -> QapResult<Self> {
        if data.len() != n * n {
            return Err(QapError::DimensionMismatch(format!(
                "expected {} entries for a {n}x{n} matrix, got {}",
                n * n,
                data.len()
            )));
        }
        Ok(Self { n, data })
    }

    /// Build from nested rows. Fails when the rows do not form a square.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> QapResult<Self> {
        let n = rows.len();
        let mut data = Vec::with_capacity(n * n);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != n {
                return Err(QapError::DimensionMismatch(format!(
                    "row {i} has {} entries, expected {n}",
                    row.len()
                )));
            }
            data.extend(row);
        }
        Ok(Self { n, data })
    }

    /// Side length of the matrix.
    pub fn n(&self) -> usize {
        self.n
    }

    /// Flat row-major view of the entries.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Sum of all entries.
    pub fn total(&self) -> f64 {
        self.data.iter().sum()
    }

    /// True when every entry is within `tol` of 0 or 1.
    pub fn is_binary(&self, tol: f64) -> bool {
        self.data
            .iter()
            .all(|&v| v.abs() <= tol || (v - 1.0).abs() <= tol)
    }
}

impl Index<(usize, usize)> for SquareMatrix {
    type Output = f64;

    fn index(&self, (i, j): (usize, usize)) -> &f64 {
        &self.data[i * self.n + j]
    }
}

impl IndexMut<(usize, usize)> for SquareMatrix {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut f64 {
        &mut self.data[i * self.n + j]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indexing_is_row_major() {
        let m = SquareMatrix::from_flat(2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(m[(0, 0)], 1.0);
        assert_eq!(m[(0, 1)], 2.0);
        assert_eq!(m[(1, 0)], 3.0);
        assert_eq!(m[(1, 1)], 4.0);
    }

    #[test]
    fn test_from_rows_rejects_ragged_input() {
        let err = SquareMatrix::from_rows(vec![vec![1.0, 2.0], vec![3.0]]);
        assert!(matches!(err, Err(QapError::DimensionMismatch(_))));
    }

    #[test]
    fn test_from_flat_rejects_wrong_length() {
        let err = SquareMatrix::from_flat(3, vec![0.0; 8]);
        assert!(matches!(err, Err(QapError::DimensionMismatch(_))));
    }

    #[test]
    fn test_is_binary() {
        let mut m = SquareMatrix::zeros(2);
        m[(0, 1)] = 1.0;
        m[(1, 0)] = 1.0 - 1e-9;
        assert!(m.is_binary(1e-6));
        m[(1, 1)] = 0.4;
        assert!(!m.is_binary(1e-6));
    }
}
