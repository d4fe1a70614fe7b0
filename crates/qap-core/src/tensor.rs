//! The 4-dimensional QAP cost tensor.

use crate::error::{QapError, QapResult};
use crate::matrix::SquareMatrix;
use serde::{Deserialize, Serialize};

/// The immutable cost tensor `Q[i][j][k][l] = A[i][k] * B[j][l]`.
///
/// Indexing convention: `i`, `k` are locations, `j`, `l` are facilities, so
/// `Q[i][j][k][l]` is the cost incurred by hosting facility `j` at location
/// `i` while facility `l` sits at location `k`. All entries are non-negative
/// and all four dimensions equal the instance size `n`; both invariants are
/// enforced at construction and the tensor is never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostTensor {
    n: usize,
    data: Vec<f64>,
}

impl CostTensor {
    /// Build the tensor from a distance matrix A and a flow matrix B.
    ///
    /// Fails with [`QapError::DimensionMismatch`] when the matrices disagree
    /// in size and with [`QapError::Validation`] when either carries a
    /// negative entry. Pure and deterministic.
    pub fn from_matrices(a: &SquareMatrix, b: &SquareMatrix) -> QapResult<Self> {
        if a.n() != b.n() {
            return Err(QapError::DimensionMismatch(format!(
                "distance matrix is {0}x{0} but flow matrix is {1}x{1}",
                a.n(),
                b.n()
            )));
        }
        let n = a.n();
        let mut data = vec![0.0; n * n * n * n];
        for i in 0..n {
            for j in 0..n {
                for k in 0..n {
                    for l in 0..n {
                        data[((i * n + j) * n + k) * n + l] = a[(i, k)] * b[(j, l)];
                    }
                }
            }
        }
        let q = Self { n, data };
        q.check_non_negative()?;
        Ok(q)
    }

    /// Build the tensor directly from flat row-major data of length n^4.
    pub fn from_flat(n: usize, data: Vec<f64>) -> QapResult<Self> {
        if data.len() != n * n * n * n {
            return Err(QapError::DimensionMismatch(format!(
                "expected {} entries for an n^4 tensor with n = {n}, got {}",
                n * n * n * n,
                data.len()
            )));
        }
        let q = Self { n, data };
        q.check_non_negative()?;
        Ok(q)
    }

    fn check_non_negative(&self) -> QapResult<()> {
        if let Some(v) = self.data.iter().find(|v| **v < 0.0) {
            return Err(QapError::Validation(format!(
                "cost tensor has a negative entry ({v})"
            )));
        }
        Ok(())
    }

    /// Instance size n.
    pub fn n(&self) -> usize {
        self.n
    }

    /// Entry `Q[i][j][k][l]`.
    #[inline]
    pub fn at(&self, i: usize, j: usize, k: usize, l: usize) -> f64 {
        self.data[((i * self.n + j) * self.n + k) * self.n + l]
    }

    /// The self-interaction term `Q[i][j][i][j]` that the Benders master
    /// keeps in its objective rather than in W.
    #[inline]
    pub fn self_interaction(&self, i: usize, j: usize) -> f64 {
        self.at(i, j, i, j)
    }
}
