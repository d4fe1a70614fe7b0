//! The per-pair transportation subproblem and its dual-based cut.
//!
//! For a fixed pair (i,j) and a master snapshot X̂:
//!
//! ```text
//! min   sum_{k!=i, l!=j} q[i][j][k][l] x1[k,l]
//! s.t.  x1[k,l] <= x̂[k,l]                   (bound rows, duals λ)
//!       sum_{k!=i} x1[k,l] == x̂[i,j]        (column rows, duals θ)
//!       sum_{l!=j} x1[k,l] == x̂[i,j]        (row rows,    duals φ)
//!       x1 >= 0
//! ```
//!
//! A balanced transportation problem with every right-hand side equal to
//! x̂[i,j]; it is feasible for any snapshot in the assignment polytope
//! (x1[k,l] = x̂[i,j] * x̂[k,l] satisfies every row), so infeasibility is a
//! bug signal, not a data condition. Each instance is built fresh, solved,
//! its duals consumed, and discarded.

use good_lp::solvers::clarabel::clarabel;
use good_lp::solvers::{ConstraintReference, DualValues, SolutionWithDual};
use good_lp::{
    constraint, variable, variables, Expression, ResolutionError, Solution, SolverModel, Variable,
};

use crate::benders::master::BendersCut;
use qap_core::{CostTensor, QapError, QapResult, SquareMatrix};

/// Optimal value and dual multipliers of one SP(i,j) solve.
#[derive(Debug, Clone)]
pub struct SubproblemSolution {
    pub i: usize,
    pub j: usize,
    /// Optimal value w_bar[i,j]
    pub value: f64,
    /// Duals of the column-sum rows, indexed by l (entry j unused)
    pub theta: Vec<f64>,
    /// Duals of the row-sum rows, indexed by k (entry i unused)
    pub phi: Vec<f64>,
    /// Duals of the x1 <= x̂ bounds, zero on row i and column j
    pub lambda: SquareMatrix,
}

impl SubproblemSolution {
    /// Derive the Benders cut carried by these duals.
    pub fn cut(&self) -> BendersCut {
        let x_coeff = self.theta.iter().sum::<f64>() + self.phi.iter().sum::<f64>();
        BendersCut {
            i: self.i,
            j: self.j,
            x_coeff,
            coeffs: self.lambda.clone(),
        }
    }

    /// Cut right-hand side at a snapshot; by strong duality this equals
    /// `value` at the snapshot the duals came from.
    fn support_at(&self, x_hat: &SquareMatrix) -> f64 {
        self.cut().rhs_at(x_hat)
    }

    fn negated(&self) -> Self {
        let mut flipped = self.clone();
        for v in &mut flipped.theta {
            *v = -*v;
        }
        for v in &mut flipped.phi {
            *v = -*v;
        }
        let n = flipped.lambda.n();
        for k in 0..n {
            for l in 0..n {
                flipped.lambda[(k, l)] = -flipped.lambda[(k, l)];
            }
        }
        flipped
    }
}

/// Build SP(i,j) for the snapshot, solve it, and extract value and duals.
pub fn solve_subproblem(
    q: &CostTensor,
    i: usize,
    j: usize,
    x_hat: &SquareMatrix,
) -> QapResult<SubproblemSolution> {
    let n = q.n();
    debug_assert!(i < n && j < n && x_hat.n() == n);

    if n == 1 {
        // no off-pair cells: the subproblem is empty with value 0
        return Ok(SubproblemSolution {
            i,
            j,
            value: 0.0,
            theta: vec![0.0],
            phi: vec![0.0],
            lambda: SquareMatrix::zeros(1),
        });
    }

    let mut vars = variables!();
    let mut x1: Vec<Option<Variable>> = vec![None; n * n];
    for k in 0..n {
        if k == i {
            continue;
        }
        for l in 0..n {
            if l == j {
                continue;
            }
            x1[k * n + l] = Some(vars.add(variable().min(0.0)));
        }
    }

    let mut objective = Expression::from(0.0);
    for k in 0..n {
        for l in 0..n {
            if let Some(v) = x1[k * n + l] {
                let c = q.at(i, j, k, l);
                if c != 0.0 {
                    objective += c * v;
                }
            }
        }
    }

    let mut model = vars.minimise(objective).using(clarabel);

    let mut bound_refs: Vec<Option<ConstraintReference>> = vec![None; n * n];
    for k in 0..n {
        for l in 0..n {
            if let Some(v) = x1[k * n + l] {
                bound_refs[k * n + l] = Some(model.add_constraint(constraint!(v <= x_hat[(k, l)])));
            }
        }
    }

    let rhs = x_hat[(i, j)];
    let mut col_refs: Vec<Option<ConstraintReference>> = vec![None; n];
    for l in 0..n {
        if l == j {
            continue;
        }
        let mut s = Expression::from(0.0);
        for k in 0..n {
            if let Some(v) = x1[k * n + l] {
                s += v;
            }
        }
        col_refs[l] = Some(model.add_constraint(constraint!(s == rhs)));
    }
    let mut row_refs: Vec<Option<ConstraintReference>> = vec![None; n];
    for k in 0..n {
        if k == i {
            continue;
        }
        let mut s = Expression::from(0.0);
        for l in 0..n {
            if let Some(v) = x1[k * n + l] {
                s += v;
            }
        }
        row_refs[k] = Some(model.add_constraint(constraint!(s == rhs)));
    }

    let mut solution = match model.solve() {
        Ok(s) => s,
        Err(ResolutionError::Infeasible) => {
            return Err(QapError::SubproblemInfeasible { i, j })
        }
        Err(e) => {
            return Err(QapError::Solver(format!(
                "subproblem ({i},{j}) solve failed: {e:?}"
            )))
        }
    };

    let mut value = 0.0;
    for k in 0..n {
        for l in 0..n {
            if let Some(v) = x1[k * n + l] {
                value += q.at(i, j, k, l) * solution.value(v);
            }
        }
    }

    let (theta, phi, lambda) = {
        let duals = solution.compute_dual();
        let mut theta = vec![0.0; n];
        for (l, r) in col_refs.iter().enumerate() {
            if let Some(r) = r {
                theta[l] = duals.dual(*r);
            }
        }
        let mut phi = vec![0.0; n];
        for (k, r) in row_refs.iter().enumerate() {
            if let Some(r) = r {
                phi[k] = duals.dual(*r);
            }
        }
        let mut lambda = SquareMatrix::zeros(n);
        for k in 0..n {
            for l in 0..n {
                if let Some(r) = bound_refs[k * n + l] {
                    lambda[(k, l)] = duals.dual(r);
                }
            }
        }
        (theta, phi, lambda)
    };

    let sp = SubproblemSolution {
        i,
        j,
        value,
        theta,
        phi,
        lambda,
    };
    orient_duals(sp, x_hat)
}

/// Backends disagree on the sign convention of reported duals. Strong
/// duality pins the correct orientation: the cut must reproduce the
/// subproblem's optimal value at the snapshot it was separated from. This
/// doubles as the tightness check for every cut that leaves this module.
fn orient_duals(sp: SubproblemSolution, x_hat: &SquareMatrix) -> QapResult<SubproblemSolution> {
    let tol = 1e-5 * (1.0 + sp.value.abs());
    let flipped = sp.negated();
    let forward = (sp.support_at(x_hat) - sp.value).abs() <= tol;
    let backward = (flipped.support_at(x_hat) - sp.value).abs() <= tol;
    match (forward, backward) {
        (true, false) => Ok(sp),
        (false, true) => Ok(flipped),
        (true, true) => {
            // both orientations reproduce a near-zero value; keep the
            // dual-feasible one, which has non-positive bound multipliers
            if positive_mass(&flipped.lambda) < positive_mass(&sp.lambda) {
                Ok(flipped)
            } else {
                Ok(sp)
            }
        }
        (false, false) => Err(QapError::Solver(format!(
            "subproblem ({},{}) duals do not reproduce its optimal value",
            sp.i, sp.j
        ))),
    }
}

fn positive_mass(lambda: &SquareMatrix) -> f64 {
    lambda.as_slice().iter().filter(|v| **v > 0.0).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::small3_tensor;
    use qap_core::Permutation;

    #[test]
    fn test_integral_snapshot_value_is_interaction_cost() {
        let q = small3_tensor();
        // permutation (1, 0, 2): location 0 hosts facility 1, etc.
        let p = Permutation::new(vec![1, 0, 2]).unwrap();
        let x_hat = p.to_matrix();

        // pair (0,1) is part of the assignment: the only feasible point is
        // the restriction of x_hat, so w_bar is the pair's interaction cost
        let sp = solve_subproblem(&q, 0, 1, &x_hat).unwrap();
        let expected: f64 = (0..3)
            .filter(|&k| k != 0)
            .map(|k| q.at(0, 1, k, p.at(k)))
            .sum();
        assert!((sp.value - expected).abs() < 1e-5);

        // the cut is tight at the snapshot it was separated from
        let cut = sp.cut();
        assert!((cut.rhs_at(&x_hat) - sp.value).abs() < 1e-5);
    }

    #[test]
    fn test_unassigned_pair_has_zero_value() {
        let q = small3_tensor();
        let p = Permutation::new(vec![1, 0, 2]).unwrap();
        let x_hat = p.to_matrix();
        // (0,0) is not in the assignment, so all right-hand sides are zero
        let sp = solve_subproblem(&q, 0, 0, &x_hat).unwrap();
        assert!(sp.value.abs() < 1e-6);
    }

    #[test]
    fn test_fractional_snapshot_is_feasible() {
        let q = small3_tensor();
        let mut x_hat = SquareMatrix::zeros(3);
        for k in 0..3 {
            for l in 0..3 {
                x_hat[(k, l)] = 1.0 / 3.0;
            }
        }
        let sp = solve_subproblem(&q, 1, 1, &x_hat).unwrap();
        assert!(sp.value >= -1e-7);
        let cut = sp.cut();
        assert!((cut.rhs_at(&x_hat) - sp.value).abs() < 1e-5);
    }

    #[test]
    fn test_trivial_instance() {
        let q = qap_core::CostTensor::from_flat(1, vec![7.0]).unwrap();
        let mut x_hat = SquareMatrix::zeros(1);
        x_hat[(0, 0)] = 1.0;
        let sp = solve_subproblem(&q, 0, 0, &x_hat).unwrap();
        assert_eq!(sp.value, 0.0);
    }
}
