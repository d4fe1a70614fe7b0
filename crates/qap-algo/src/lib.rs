//! # qap-algo: Exact Formulations for the Quadratic Assignment Problem
//!
//! Three exact mixed-integer formulations of the QAP, built with `good_lp`
//! against external solver backends, plus an independent verifier:
//!
//! | Method | Description | Shape |
//! |--------|-------------|-------|
//! | [`QapMethod::KaufmanBroeckx`] | Big-M linearization | Static MILP, n^2 + n^2 variables |
//! | [`QapMethod::Rlt`] | Reformulation-Linearization Technique | Static MILP, n^4 variables |
//! | [`QapMethod::Benders`] | Disjunctive-programming decomposition | Master + n^2 subproblems, lazy cuts |
//!
//! ## Architecture
//!
//! - **[`kbl`] / [`rlt`]**: direct model constructions, solved once.
//! - **[`benders`]**: a master problem over (X, W), a battery of n^2
//!   transportation subproblems whose LP duals generate optimality cuts, and
//!   a separation engine invoked at search checkpoints. The engine owns its
//!   diagnostics; the cut set is owned by the master and append-only.
//! - **[`verify`]**: recomputes the true objective of a 0/1 assignment from
//!   the raw distance/flow matrices and reports (never corrects) mismatches.
//!
//! The underlying MILP/LP engines stay external: models are handed to HiGHS
//! (integral masters and baselines) and Clarabel (subproblem LPs, for their
//! dual values) through the `good_lp` capability surface.

pub mod benders;
pub mod kbl;
pub mod rlt;
pub mod settings;
pub mod test_utils;
pub mod types;
pub mod verify;

pub use benders::{solve_benders, BendersEngine, BendersSettings};
pub use kbl::{compute_m, solve_kbl};
pub use rlt::solve_rlt;
pub use settings::SolveLimits;
pub use types::{MethodSolution, QapMethod, SolveStatus};
pub use verify::{
    permutation_objective, recompute_objective_flat, recompute_objective_nested, verify,
    VerificationReport,
};
