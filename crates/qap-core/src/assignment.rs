//! Permutations and assignment matrices.
//!
//! A QAP solution assigns exactly one facility to each location. Solution
//! files carry it as a 1-indexed permutation; solver output carries it as a
//! 0/1 matrix `X` with unit row and column sums. This module converts and
//! validates both forms.

use crate::error::{QapError, QapResult};
use crate::matrix::SquareMatrix;
use serde::{Deserialize, Serialize};

/// A validated permutation, 0-based: `p[i]` is the facility hosted at
/// location `i`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permutation(Vec<usize>);

impl Permutation {
    /// Validate a 0-based image vector as a bijection on `0..n`.
    pub fn new(image: Vec<usize>) -> QapResult<Self> {
        let n = image.len();
        let mut seen = vec![false; n];
        for &v in &image {
            if v >= n {
                return Err(QapError::Validation(format!(
                    "permutation entry {v} out of range for n = {n}"
                )));
            }
            if seen[v] {
                return Err(QapError::Validation(format!(
                    "permutation repeats entry {v}"
                )));
            }
            seen[v] = true;
        }
        Ok(Self(image))
    }

    /// Build from the 1-indexed form used by solution files.
    pub fn from_one_indexed(image: &[usize]) -> QapResult<Self> {
        let shifted: Vec<usize> = image
            .iter()
            .map(|&v| {
                if v == 0 {
                    Err(QapError::Validation(
                        "permutation entries are 1-indexed, got 0".into(),
                    ))
                } else {
                    Ok(v - 1)
                }
            })
            .collect::<QapResult<_>>()?;
        Self::new(shifted)
    }

    /// 1-indexed form for writing back out.
    pub fn to_one_indexed(&self) -> Vec<usize> {
        self.0.iter().map(|&v| v + 1).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Facility at location `i`.
    #[inline]
    pub fn at(&self, i: usize) -> usize {
        self.0[i]
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }

    /// The equivalent 0/1 assignment matrix with `X[i][p(i)] = 1`.
    pub fn to_matrix(&self) -> SquareMatrix {
        let mut x = SquareMatrix::zeros(self.len());
        for (i, j) in self.0.iter().copied().enumerate() {
            x[(i, j)] = 1.0;
        }
        x
    }
}

/// Extract the permutation encoded by a (possibly slightly noisy) 0/1
/// assignment matrix.
///
/// Entries within `tol` of 1 count as assigned; anything else within `tol`
/// of 0 counts as free. Fails with [`QapError::Validation`] when a row or
/// column does not contain exactly one assigned entry.
pub fn assignment_from_matrix(x: &SquareMatrix, tol: f64) -> QapResult<Permutation> {
    let n = x.n();
    let mut image = vec![usize::MAX; n];
    for i in 0..n {
        for j in 0..n {
            let v = x[(i, j)];
            if (v - 1.0).abs() <= tol {
                if image[i] != usize::MAX {
                    return Err(QapError::Validation(format!(
                        "assignment row {i} selects more than one facility"
                    )));
                }
                image[i] = j;
            } else if v.abs() > tol {
                return Err(QapError::Validation(format!(
                    "assignment entry ({i},{j}) = {v} is not 0/1"
                )));
            }
        }
        if image[i] == usize::MAX {
            return Err(QapError::Validation(format!(
                "assignment row {i} selects no facility"
            )));
        }
    }
    Permutation::new(image)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_one_indexed() {
        let p = Permutation::from_one_indexed(&[2, 1, 3]).unwrap();
        assert_eq!(p.at(0), 1);
        assert_eq!(p.to_one_indexed(), vec![2, 1, 3]);
    }

    #[test]
    fn test_rejects_repeats_and_out_of_range() {
        assert!(Permutation::new(vec![0, 0, 1]).is_err());
        assert!(Permutation::new(vec![0, 3, 1]).is_err());
        assert!(Permutation::from_one_indexed(&[0, 1, 2]).is_err());
    }

    #[test]
    fn test_matrix_round_trip() {
        let p = Permutation::new(vec![1, 0, 2]).unwrap();
        let x = p.to_matrix();
        assert_eq!(x[(0, 1)], 1.0);
        assert_eq!(x[(1, 1)], 0.0);
        let back = assignment_from_matrix(&x, 1e-6).unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn test_fractional_matrix_rejected() {
        let mut x = SquareMatrix::zeros(2);
        x[(0, 0)] = 0.5;
        x[(0, 1)] = 0.5;
        x[(1, 0)] = 0.5;
        x[(1, 1)] = 0.5;
        assert!(assignment_from_matrix(&x, 1e-6).is_err());
    }
}
