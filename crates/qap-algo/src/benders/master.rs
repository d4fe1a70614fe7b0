//! The Benders master problem.
//!
//! Holds the cost tensor, the configuration and the append-only cut set.
//! `good_lp` models are consumed by `solve`, so the master re-materializes
//! its model from the owned data on every solve; the cut set is the single
//! source of truth between rounds.

use serde::Serialize;

use good_lp::solvers::highs::highs;
use good_lp::{
    constraint, variable, variables, Expression, ResolutionError, Solution, SolverModel, Variable,
};

use crate::benders::settings::BendersSettings;
use crate::kbl::compute_m;
use qap_core::{CostTensor, QapError, QapResult, SquareMatrix};

/// One optimality cut, derived from the duals of a subproblem solve.
///
/// Encodes `w[i,j] >= x_coeff * x[i,j] + sum_{k,l} coeffs[k,l] * x[k,l]`,
/// with `coeffs` zero on row i and column j.
#[derive(Debug, Clone, Serialize)]
pub struct BendersCut {
    pub i: usize,
    pub j: usize,
    /// `Σθ + Σφ`, the multiplier carried by x[i,j]
    pub x_coeff: f64,
    /// The λ multipliers of the x1 upper bounds
    pub coeffs: SquareMatrix,
}

impl BendersCut {
    /// Right-hand side of the cut at the given X values.
    pub fn rhs_at(&self, x: &SquareMatrix) -> f64 {
        let n = x.n();
        let mut rhs = self.x_coeff * x[(self.i, self.j)];
        for k in 0..n {
            for l in 0..n {
                let c = self.coeffs[(k, l)];
                if c != 0.0 {
                    rhs += c * x[(k, l)];
                }
            }
        }
        rhs
    }

    /// Whether (x, w) violates this cut by more than `tol`.
    pub fn is_violated(&self, x: &SquareMatrix, w: &SquareMatrix, tol: f64) -> bool {
        w[(self.i, self.j)] < self.rhs_at(x) - tol
    }
}

/// One master optimum, snapshotted for the separation oracle.
#[derive(Debug, Clone, Serialize)]
pub struct MasterSolution {
    pub x: SquareMatrix,
    pub w: SquareMatrix,
    pub objective: f64,
}

/// Assignment-constrained master with an incrementally grown cut set.
pub struct MasterProblem {
    q: CostTensor,
    settings: BendersSettings,
    big_m: Option<SquareMatrix>,
    cuts: Vec<BendersCut>,
}

impl MasterProblem {
    /// Validates the configuration and prepares the master. Configuration
    /// errors and the unimplemented warm start fail here, before any solve.
    pub fn new(q: &CostTensor, settings: &BendersSettings) -> QapResult<Self> {
        settings.validate()?;
        let big_m = settings.init_with_kbl.then(|| compute_m(q));
        Ok(Self {
            q: q.clone(),
            settings: settings.clone(),
            big_m,
            cuts: Vec::new(),
        })
    }

    pub fn n(&self) -> usize {
        self.q.n()
    }

    pub fn q(&self) -> &CostTensor {
        &self.q
    }

    pub fn settings(&self) -> &BendersSettings {
        &self.settings
    }

    pub fn cuts(&self) -> &[BendersCut] {
        &self.cuts
    }

    pub fn cut_count(&self) -> usize {
        self.cuts.len()
    }

    /// Append a cut. Cuts are never removed during a run.
    pub fn add_cut(&mut self, cut: BendersCut) {
        self.cuts.push(cut);
    }

    /// Solve the current master. `relax` drops integrality regardless of
    /// `x_is_bin`, for node-checkpoint separation.
    pub fn solve(&self, relax: bool) -> QapResult<MasterSolution> {
        let n = self.n();
        let binary = self.settings.x_is_bin && !relax;

        let mut vars = variables!();
        let x: Vec<Variable> = (0..n * n)
            .map(|_| {
                if binary {
                    vars.add(variable().binary())
                } else {
                    vars.add(variable().min(0.0).max(1.0))
                }
            })
            .collect();
        let w: Vec<Variable> = (0..n * n).map(|_| vars.add(variable().min(0.0))).collect();

        let mut objective = Expression::from(0.0);
        for i in 0..n {
            for j in 0..n {
                objective += w[i * n + j];
                let c = self.q.self_interaction(i, j);
                if c != 0.0 {
                    objective += c * x[i * n + j];
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

        if let Some(m) = &self.big_m {
            // Kaufman-Broeckx seed, restricted to k != i, l != j: the self
            // term lives in the objective, not in w
            for i in 0..n {
                for j in 0..n {
                    let mut interaction = Expression::from(0.0);
                    for k in 0..n {
                        if k == i {
                            continue;
                        }
                        for l in 0..n {
                            if l == j {
                                continue;
                            }
                            let c = self.q.at(i, j, k, l);
                            if c != 0.0 {
                                interaction += c * x[k * n + l];
                            }
                        }
                    }
                    let deactivation = m[(i, j)] - m[(i, j)] * x[i * n + j];
                    model = model.with(constraint!(w[i * n + j] >= interaction - deactivation));
                }
            }
        }

        for cut in &self.cuts {
            let mut rhs = Expression::from(0.0);
            if cut.x_coeff != 0.0 {
                rhs += cut.x_coeff * x[cut.i * n + cut.j];
            }
            for k in 0..n {
                for l in 0..n {
                    let c = cut.coeffs[(k, l)];
                    if c != 0.0 {
                        rhs += c * x[k * n + l];
                    }
                }
            }
            model = model.with(constraint!(w[cut.i * n + cut.j] >= rhs));
        }

        let solution = match model.solve() {
            Ok(s) => s,
            Err(ResolutionError::Infeasible) => {
                return Err(QapError::Solver(
                    "master problem reported infeasible".into(),
                ))
            }
            Err(e) => return Err(QapError::Solver(format!("master solve failed: {e:?}"))),
        };

        let mut x_val = SquareMatrix::zeros(n);
        let mut w_val = SquareMatrix::zeros(n);
        let mut objective_value = 0.0;
        for i in 0..n {
            for j in 0..n {
                x_val[(i, j)] = solution.value(x[i * n + j]);
                w_val[(i, j)] = solution.value(w[i * n + j]);
                objective_value +=
                    w_val[(i, j)] + self.q.self_interaction(i, j) * x_val[(i, j)];
            }
        }

        Ok(MasterSolution {
            x: x_val,
            w: w_val,
            objective: objective_value,
        })
    }
}
