//! Shared helpers for formulation tests.

use crate::verify::permutation_objective;
use qap_core::{CostTensor, Permutation, SquareMatrix};

/// The 3x3 reference instance; brute-force optimum 24 at permutation
/// (2, 1, 3) in 1-indexed form.
pub fn small3() -> (SquareMatrix, SquareMatrix) {
    let a = SquareMatrix::from_rows(vec![
        vec![0.0, 1.0, 2.0],
        vec![1.0, 0.0, 3.0],
        vec![2.0, 3.0, 0.0],
    ])
    .unwrap();
    let b = SquareMatrix::from_rows(vec![
        vec![0.0, 5.0, 1.0],
        vec![5.0, 0.0, 2.0],
        vec![1.0, 2.0, 0.0],
    ])
    .unwrap();
    (a, b)
}

/// Cost tensor of the 3x3 reference instance.
pub fn small3_tensor() -> CostTensor {
    let (a, b) = small3();
    CostTensor::from_matrices(&a, &b).unwrap()
}

/// All permutations of `0..n`, in lexicographic order. Only usable for
/// tiny n.
pub fn permutations(n: usize) -> Vec<Vec<usize>> {
    let mut out = Vec::new();
    let mut current = Vec::with_capacity(n);
    let mut used = vec![false; n];
    extend(n, &mut current, &mut used, &mut out);
    out
}

fn extend(n: usize, current: &mut Vec<usize>, used: &mut [bool], out: &mut Vec<Vec<usize>>) {
    if current.len() == n {
        out.push(current.clone());
        return;
    }
    for v in 0..n {
        if !used[v] {
            used[v] = true;
            current.push(v);
            extend(n, current, used, out);
            current.pop();
            used[v] = false;
        }
    }
}

/// Exhaustive minimum over all assignments. Only usable for tiny n.
pub fn brute_force_optimum(a: &SquareMatrix, b: &SquareMatrix) -> (f64, Permutation) {
    let n = a.n();
    let mut best: Option<(f64, Permutation)> = None;
    for image in permutations(n) {
        let p = Permutation::new(image).expect("generated images are permutations");
        let value = permutation_objective(a, b, &p);
        if best.as_ref().map_or(true, |(v, _)| value < *v) {
            best = Some((value, p));
        }
    }
    best.expect("at least one permutation exists")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small3_brute_force() {
        let (a, b) = small3();
        let (value, p) = brute_force_optimum(&a, &b);
        assert_eq!(value, 24.0);
        assert_eq!(p.to_one_indexed(), vec![2, 1, 3]);
    }

    #[test]
    fn test_permutation_count() {
        assert_eq!(permutations(1).len(), 1);
        assert_eq!(permutations(4).len(), 24);
    }
}
