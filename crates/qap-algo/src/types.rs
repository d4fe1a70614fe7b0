use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::benders::BendersDiagnostics;
use qap_core::{assignment_from_matrix, Permutation, QapResult, SquareMatrix};

/// QAP solution method
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum QapMethod {
    /// Kaufman-Broeckx big-M linearization (static baseline)
    KaufmanBroeckx,
    /// Reformulation-Linearization Technique (static baseline, n^4 variables)
    Rlt,
    /// Benders (disjunctive programming) decomposition with lazy cuts
    #[default]
    Benders,
}

impl fmt::Display for QapMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QapMethod::KaufmanBroeckx => write!(f, "kbl"),
            QapMethod::Rlt => write!(f, "rlt"),
            QapMethod::Benders => write!(f, "benders"),
        }
    }
}

impl std::str::FromStr for QapMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "kbl" | "kaufman-broeckx" => Ok(QapMethod::KaufmanBroeckx),
            "rlt" => Ok(QapMethod::Rlt),
            "benders" | "dp" | "disjunctive" => Ok(QapMethod::Benders),
            _ => Err(format!("Unknown QAP method: {}", s)),
        }
    }
}

/// Terminal status of one method run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SolveStatus {
    /// Proven optimal
    Optimal,
    /// Stopped on the wall-clock budget; best incumbent reported
    TimeLimit,
    /// The model was reported infeasible (cannot happen for well-formed instances)
    Infeasible,
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveStatus::Optimal => write!(f, "optimal"),
            SolveStatus::TimeLimit => write!(f, "time_limit"),
            SolveStatus::Infeasible => write!(f, "infeasible"),
        }
    }
}

/// Output of one method run
#[derive(Debug, Clone, Serialize)]
pub struct MethodSolution {
    pub method: QapMethod,
    pub status: SolveStatus,
    /// Objective value of the returned assignment
    pub objective: f64,
    /// Best proven lower bound (equals `objective` when optimal)
    pub bound: f64,
    /// X values as returned by the solver
    pub assignment: SquareMatrix,
    /// W values, for the methods that carry linearization variables
    pub w: Option<SquareMatrix>,
    /// Master re-solves for Benders; 1 for the static models
    pub rounds: usize,
    pub solve_time: Duration,
    /// Engine diagnostics, present on Benders runs
    pub benders: Option<BendersDiagnostics>,
}

impl MethodSolution {
    /// Decode the permutation encoded by the assignment matrix.
    pub fn permutation(&self) -> QapResult<Permutation> {
        assignment_from_matrix(&self.assignment, 1e-4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_round_trip() {
        for method in [QapMethod::KaufmanBroeckx, QapMethod::Rlt, QapMethod::Benders] {
            let parsed: QapMethod = method.to_string().parse().unwrap();
            assert_eq!(parsed, method);
        }
        assert_eq!("dp".parse::<QapMethod>().unwrap(), QapMethod::Benders);
        assert!("simulated-annealing".parse::<QapMethod>().is_err());
    }
}
