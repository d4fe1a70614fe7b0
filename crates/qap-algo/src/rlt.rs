//! Reformulation-Linearization Technique
//!
//! Level-1 RLT model with explicit product variables:
//!
//! ```text
//! min   sum_{i,j,k,l} q[i][j][k][l] y[i,j,k,l]
//! s.t.  y[i,j,k,l] <= x[i,j]
//!       y[i,j,k,l] <= x[k,l]
//!       y[i,j,k,l] >= x[i,j] + x[k,l] - 1        (McCormick)
//!       y[i,j,k,l] == y[k,l,i,j]                 (symmetry)
//!       sum_i y[i,j,k,l] == x[k,l]               (column aggregation)
//!       sum_j y[i,j,k,l] == x[k,l]               (row aggregation)
//!       sum_i x[i,j] == 1,  sum_j x[i,j] == 1
//!       x, y binary
//! ```
//!
//! The aggregation rows come from multiplying the assignment constraints by
//! x[k,l] and substituting the products. Quartic variable count; this is an
//! exactness and tightness reference, not a scalable method.

use std::time::Instant;

use good_lp::solvers::highs::highs;
use good_lp::{constraint, variable, variables, Expression, Solution, SolverModel, Variable};

use crate::settings::SolveLimits;
use crate::types::{MethodSolution, QapMethod, SolveStatus};
use qap_core::{CostTensor, QapError, QapResult, SquareMatrix};

/// Build and solve the RLT model for the given tensor.
pub fn solve_rlt(q: &CostTensor, limits: &SolveLimits) -> QapResult<MethodSolution> {
    limits.validate()?;
    let n = q.n();
    let start = Instant::now();

    let mut vars = variables!();
    let x: Vec<Variable> = (0..n * n).map(|_| vars.add(variable().binary())).collect();
    let y: Vec<Variable> = (0..n * n * n * n)
        .map(|_| vars.add(variable().binary()))
        .collect();
    let yi = |i: usize, j: usize, k: usize, l: usize| ((i * n + j) * n + k) * n + l;

    let mut objective = Expression::from(0.0);
    for i in 0..n {
        for j in 0..n {
            for k in 0..n {
                for l in 0..n {
                    let c = q.at(i, j, k, l);
                    if c != 0.0 {
                        objective += c * y[yi(i, j, k, l)];
                    }
                }
            }
        }
    }

    let mut model = vars.minimise(objective).using(highs);

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

    // symmetry: y[i,j,k,l] == y[k,l,i,j]; the mirrored copy is not re-added
    for a in 0..n * n {
        for b in (a + 1)..n * n {
            let (i, j) = (a / n, a % n);
            let (k, l) = (b / n, b % n);
            model = model.with(constraint!(y[yi(i, j, k, l)] - y[yi(k, l, i, j)] == 0.0));
        }
    }

    // McCormick envelope of x[i,j] * x[k,l]
    for i in 0..n {
        for j in 0..n {
            for k in 0..n {
                for l in 0..n {
                    let y_var = y[yi(i, j, k, l)];
                    model = model.with(constraint!(y_var <= x[i * n + j]));
                    model = model.with(constraint!(y_var <= x[k * n + l]));
                    model = model.with(constraint!(
                        y_var - x[i * n + j] - x[k * n + l] >= -1.0
                    ));
                }
            }
        }
    }

    // aggregation rows from the assignment constraints
    for j in 0..n {
        for k in 0..n {
            for l in 0..n {
                let mut s = Expression::from(0.0);
                for i in 0..n {
                    s += y[yi(i, j, k, l)];
                }
                model = model.with(constraint!(s - x[k * n + l] == 0.0));
            }
        }
    }
    for i in 0..n {
        for k in 0..n {
            for l in 0..n {
                let mut s = Expression::from(0.0);
                for j in 0..n {
                    s += y[yi(i, j, k, l)];
                }
                model = model.with(constraint!(s - x[k * n + l] == 0.0));
            }
        }
    }

    let solution = model
        .solve()
        .map_err(|e| QapError::Solver(format!("RLT solve failed: {e:?}")))?;

    let mut x_val = SquareMatrix::zeros(n);
    for i in 0..n {
        for j in 0..n {
            x_val[(i, j)] = solution.value(x[i * n + j]);
        }
    }
    let mut objective_value = 0.0;
    for i in 0..n {
        for j in 0..n {
            for k in 0..n {
                for l in 0..n {
                    let c = q.at(i, j, k, l);
                    if c != 0.0 {
                        objective_value += c * solution.value(y[yi(i, j, k, l)]);
                    }
                }
            }
        }
    }

    Ok(MethodSolution {
        method: QapMethod::Rlt,
        status: SolveStatus::Optimal,
        objective: objective_value,
        bound: objective_value,
        assignment: x_val,
        w: None,
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
    fn test_limits_validated_before_build() {
        let q = small3_tensor();
        let limits = SolveLimits {
            soft_mem_limit: 0,
            ..Default::default()
        };
        assert!(matches!(solve_rlt(&q, &limits), Err(QapError::Config(_))));
    }
}
