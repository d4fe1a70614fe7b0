//! Benders (disjunctive programming) decomposition
//!
//! The core exact method of this crate: the QAP is split into an
//! assignment-constrained master over (X, W) and n^2 independent
//! transportation subproblems whose LP duals generate optimality cuts.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │  MASTER                                                              │
//! │    min  sum_ij ( w[i,j] + q[i][j][i][j] x[i,j] )                     │
//! │    s.t. sum_i x[i,j] == 1,  sum_j x[i,j] == 1,  w >= 0               │
//! │         + the growing Benders cut set                                │
//! │         + (optionally) the Kaufman-Broeckx bounds as a warm seed     │
//! │                                                                      │
//! │  SUBPROBLEM SP(i,j) at snapshot X̂                                    │
//! │    min  sum_{k!=i, l!=j} q[i][j][k][l] x1[k,l]                       │
//! │    s.t. x1[k,l] <= x̂[k,l]                        [λ]                 │
//! │         sum_{k!=i} x1[k,l] == x̂[i,j]             [θ]                 │
//! │         sum_{l!=j} x1[k,l] == x̂[i,j]             [φ]                 │
//! │                                                                      │
//! │  CUT for a violated pair (w_hat[i,j] < w_bar[i,j] - tol)             │
//! │    w[i,j] >= (Σθ + Σφ) x[i,j] + sum_{k,l} λ[k,l] x[k,l]              │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The separation engine sits between the master and the external search:
//! at each checkpoint it snapshots (X̂, Ŵ), runs the subproblem battery,
//! commits the violated cuts, and records its diagnostics. Finite
//! convergence follows from the finite number of extreme points of each
//! subproblem's dual polytope.
//!
//! ## References
//!
//! - **Benders (1962)**: "Partitioning procedures for solving mixed-variables
//!   programming problems"
//! - **Kaufman & Broeckx (1978)**: the big-M linearization used to seed the
//!   master
//! - **Koopmans & Beckmann (1957)**: the facility/location formulation of
//!   the QAP

mod diagnostics;
mod engine;
mod master;
mod settings;
mod subproblem;

pub use diagnostics::{BendersDiagnostics, CutRecord, RoundRecord};
pub use engine::{solve_benders, BendersEngine, Candidate, EngineState, RoundOutcome};
pub use master::{BendersCut, MasterProblem, MasterSolution};
pub use settings::{BendersSettings, CutInjectionMode, SeparationTrigger};
pub use subproblem::{solve_subproblem, SubproblemSolution};
