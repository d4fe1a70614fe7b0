//! Kaufman-Broeckx linearization
//!
//! The classic big-M MILP baseline:
//!
//! ```text
//! min   sum_{i,j} w[i,j]
//! s.t.  w[i,j] >= sum_{k,l} q[i][j][k][l] x[k,l] - M[i][j] (1 - x[i,j])
//!       sum_i x[i,j] == 1,  sum_j x[i,j] == 1
//!       w >= 0,  x binary
//! ```
//!
//! with `M[i][j] = sum_{k,l} q[i][j][k][l]`, the largest interaction cost
//! pair (i,j) can ever incur, so the bound on w goes slack whenever
//! x[i,j] = 0. Static model, solved once; no cut generation.

use std::time::Instant;

use good_lp::solvers::highs::highs;
use good_lp::{constraint, variable, variables, Expression, Solution, SolverModel, Variable};

use crate::settings::SolveLimits;
use crate::types::{MethodSolution, QapMethod, SolveStatus};
use qap_core::{CostTensor, QapError, QapResult, SquareMatrix};

/// `M[i][j] = sum_{k,l} q[i][j][k][l]`.
pub fn compute_m(q: &CostTensor) -> SquareMatrix {
    let n = q.n();
    let mut m = SquareMatrix::zeros(n);
    for i in 0..n {
        for j in 0..n {
            let mut total = 0.0;
            for k in 0..n {
                for l in 0..n {
                    total += q.at(i, j, k, l);
                }
            }
            m[(i, j)] = total;
        }
    }
    m
}

/// Build and solve the Kaufman-Broeckx model for the given tensor.
pub fn solve_kbl(q: &CostTensor, limits: &SolveLimits) -> QapResult<MethodSolution> {
    limits.validate()?;
    let n = q.n();
    let start = Instant::now();

    let mut vars = variables!();
    let x: Vec<Variable> = (0..n * n).map(|_| vars.add(variable().binary())).collect();
    let w: Vec<Variable> = (0..n * n).map(|_| vars.add(variable().min(0.0))).collect();

    let mut objective = Expression::from(0.0);
    for &w_var in &w {
        objective += w_var;
    }

    let mut model = vars.minimise(objective).using(highs);

    // each location hosts exactly one facility and vice versa
    for j in 0..n {
        let mut col = Expression::from(0.0);
        for i in 0..n {
            col += x[i * n + j];
        }
        model = model.with(constraint!(col == 1.0));
    }
    for i in 0..n {
        let mut row = Expression::from(0.0);
        for j in 0..n {
            row += x[i * n + j];
        }
        model = model.with(constraint!(row == 1.0));
    }

    let m = compute_m(q);
    for i in 0..n {
        for j in 0..n {
            let mut interaction = Expression::from(0.0);
            for k in 0..n {
                for l in 0..n {
                    let c = q.at(i, j, k, l);
                    if c != 0.0 {
                        interaction += c * x[k * n + l];
                    }
                }
            }
            let deactivation = m[(i, j)] - m[(i, j)] * x[i * n + j];
            model = model.with(constraint!(w[i * n + j] >= interaction - deactivation));
        }
    }

    let solution = model
        .solve()
        .map_err(|e| QapError::Solver(format!("Kaufman-Broeckx solve failed: {e:?}")))?;

    let mut x_val = SquareMatrix::zeros(n);
    let mut w_val = SquareMatrix::zeros(n);
    let mut objective_value = 0.0;
    for i in 0..n {
        for j in 0..n {
            x_val[(i, j)] = solution.value(x[i * n + j]);
            w_val[(i, j)] = solution.value(w[i * n + j]);
            objective_value += w_val[(i, j)];
        }
    }

    Ok(MethodSolution {
        method: QapMethod::KaufmanBroeckx,
        status: SolveStatus::Optimal,
        objective: objective_value,
        bound: objective_value,
        assignment: x_val,
        w: Some(w_val),
        rounds: 1,
        solve_time: start.elapsed(),
        benders: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::small3_tensor;

    #[test]
    fn test_compute_m_totals() {
        let q = small3_tensor();
        let m = compute_m(&q);
        for i in 0..3 {
            for j in 0..3 {
                let mut expected = 0.0;
                for k in 0..3 {
                    for l in 0..3 {
                        expected += q.at(i, j, k, l);
                    }
                }
                assert_eq!(m[(i, j)], expected);
            }
        }
    }

    #[test]
    fn test_limits_validated_before_build() {
        let q = small3_tensor();
        let limits = SolveLimits {
            threads: 0,
            ..Default::default()
        };
        assert!(matches!(
            solve_kbl(&q, &limits),
            Err(QapError::Config(_))
        ));
    }
}
