//! Separation engine and cut-loop driver.
//!
//! The engine is the separation oracle of the decomposition. Given a master
//! candidate it runs the n^2 subproblem battery, derives and commits the
//! violated cuts, and updates its own diagnostics; it then returns control
//! to the search. The two states are *Idle* (between checkpoints) and
//! *Separating* (inside one); the search invokes the callback with mutual
//! exclusion, which `&mut self` encodes directly.
//!
//! The driver realizes the checkpoint loop on top of backends without
//! native lazy constraints: every master solve-to-optimality is an
//! incumbent checkpoint, and node-triggered separation first saturates the
//! root relaxation. Termination is the driver's responsibility; the engine
//! only guarantees that an optimal integral candidate eventually produces
//! no further cuts.

use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::benders::diagnostics::{BendersDiagnostics, CutRecord, RoundRecord};
use crate::benders::master::{MasterProblem, MasterSolution};
use crate::benders::settings::{BendersSettings, CutInjectionMode, SeparationTrigger};
use crate::benders::subproblem::{solve_subproblem, SubproblemSolution};
use crate::types::{MethodSolution, QapMethod, SolveStatus};
use qap_core::{CostTensor, QapError, QapResult, SquareMatrix};

/// Snapshot of a candidate (X̂, Ŵ) taken at a solver checkpoint.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub x: SquareMatrix,
    pub w: SquareMatrix,
}

impl From<MasterSolution> for Candidate {
    fn from(sol: MasterSolution) -> Self {
        Self { x: sol.x, w: sol.w }
    }
}

/// Engine phase; `Separating` only while a callback invocation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Separating,
}

/// What one separation round did.
#[derive(Debug, Clone, Copy)]
pub struct RoundOutcome {
    pub cuts_added: usize,
    pub pairs_skipped: usize,
}

/// The Benders separation engine for one optimization run.
///
/// Owns the master (and through it the cut set) and the diagnostics record
/// exclusively; there is no cross-run sharing.
pub struct BendersEngine {
    master: MasterProblem,
    diagnostics: BendersDiagnostics,
    state: EngineState,
    started: Instant,
    pool: Option<rayon::ThreadPool>,
}

impl BendersEngine {
    pub fn new(q: &CostTensor, settings: &BendersSettings) -> QapResult<Self> {
        let master = MasterProblem::new(q, settings)?;
        let pool = match settings.limits.thread_count() {
            Some(t) if t > 1 => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(t)
                    .build()
                    .map_err(|e| {
                        QapError::Config(format!("cannot build {t}-thread battery pool: {e}"))
                    })?,
            ),
            _ => None,
        };
        Ok(Self {
            master,
            diagnostics: BendersDiagnostics::default(),
            state: EngineState::Idle,
            started: Instant::now(),
            pool,
        })
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn master(&self) -> &MasterProblem {
        &self.master
    }

    pub fn diagnostics(&self) -> &BendersDiagnostics {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> BendersDiagnostics {
        self.diagnostics
    }

    /// Solve the current master; checkpoint material for
    /// [`Self::on_candidate`].
    pub fn solve_master(&mut self, relax: bool) -> QapResult<MasterSolution> {
        self.master.solve(relax)
    }

    /// The separation callback: one invocation per checkpoint.
    ///
    /// Snapshots are read-only; all subproblem solves complete before any
    /// cut is committed, and commits happen in row-major pair order
    /// regardless of battery scheduling.
    pub fn on_candidate(&mut self, candidate: &Candidate) -> QapResult<RoundOutcome> {
        self.diagnostics.callback_calls += 1;
        self.state = EngineState::Separating;
        self.diagnostics.separation_rounds += 1;
        let round = self.diagnostics.separation_rounds;
        let round_start = Instant::now();

        let outcome = self.separate(candidate, round);

        let in_round = round_start.elapsed();
        self.diagnostics.time_in_separation += in_round;
        if let Ok(outcome) = &outcome {
            self.diagnostics.rounds.push(RoundRecord {
                round,
                callback_call: self.diagnostics.callback_calls,
                cuts_added: outcome.cuts_added,
                time_since_start: self.started.elapsed().as_secs_f64(),
                time_in_round: in_round.as_secs_f64(),
            });
        }
        self.state = EngineState::Idle;
        outcome
    }

    fn separate(&mut self, candidate: &Candidate, round: usize) -> QapResult<RoundOutcome> {
        let n = self.master.n();
        let tol = self.master.settings().minimum_w_difference;
        let results = self.run_battery(candidate);

        let mut cuts_added = 0;
        let mut pairs_skipped = 0;
        for (idx, result) in results.into_iter().enumerate() {
            let (i, j) = (idx / n, idx % n);
            match result {
                Ok(sp) => {
                    let w_hat = candidate.w[(i, j)];
                    if w_hat < sp.value - tol {
                        // (x_hat, w_hat[i,j]) lies outside this pair's
                        // epigraph: inject the supporting hyperplane
                        let violation = sp.value - w_hat;
                        self.master.add_cut(sp.cut());
                        cuts_added += 1;
                        self.diagnostics.cuts_added += 1;
                        self.diagnostics.cut_log.push(CutRecord {
                            cut_number: self.diagnostics.cuts_added,
                            round,
                            violation,
                            i,
                            j,
                        });
                    }
                }
                Err(QapError::SubproblemInfeasible { i, j }) => {
                    pairs_skipped += 1;
                    warn!(
                        i,
                        j, round, "transportation subproblem infeasible; cut skipped"
                    );
                    debug!(x_hat = ?candidate.x, "snapshot behind the infeasible subproblem");
                    self.diagnostics.issues.add_warning_with_entity(
                        "separation",
                        format!("subproblem infeasible in round {round}; cut skipped"),
                        format!("SP({i},{j})"),
                    );
                }
                Err(QapError::Solver(msg)) => {
                    pairs_skipped += 1;
                    warn!(i, j, round, %msg, "subproblem solve failed; cut skipped");
                    self.diagnostics.issues.add_warning_with_entity(
                        "separation",
                        format!("{msg} (round {round}); cut skipped"),
                        format!("SP({i},{j})"),
                    );
                }
                Err(other) => return Err(other),
            }
        }
        debug!(round, cuts_added, pairs_skipped, "separation round finished");
        Ok(RoundOutcome {
            cuts_added,
            pairs_skipped,
        })
    }

    /// Solve all n^2 subproblems for one snapshot. The solves share no
    /// mutable state and their order is irrelevant; `threads == 1` keeps the
    /// baseline strictly sequential.
    fn run_battery(&self, candidate: &Candidate) -> Vec<QapResult<SubproblemSolution>> {
        let n = self.master.n();
        let q = self.master.q();
        let x_hat = &candidate.x;
        let solve_pair = |idx: usize| solve_subproblem(q, idx / n, idx % n, x_hat);
        match (self.master.settings().limits.threads, &self.pool) {
            (1, _) => (0..n * n).map(solve_pair).collect(),
            (_, Some(pool)) => {
                pool.install(|| (0..n * n).into_par_iter().map(solve_pair).collect())
            }
            (_, None) => (0..n * n).into_par_iter().map(solve_pair).collect(),
        }
    }
}

/// Drive the full decomposition: alternate master solves with separation
/// rounds until no violated pair remains, honoring the wall-clock budget at
/// round granularity.
pub fn solve_benders(q: &CostTensor, settings: &BendersSettings) -> QapResult<MethodSolution> {
    let start = Instant::now();
    let mut engine = BendersEngine::new(q, settings)?;
    let budget = settings.limits.time_budget();
    let out_of_time = |start: &Instant| budget.is_some_and(|b| start.elapsed() >= b);

    // emergency brake against cut cycling from solver noise, far above any
    // converging run
    let max_rounds = 10 * q.n() * q.n() + 10;

    // node-checkpoint phase: separate on optimal relaxations until saturated
    if settings.trigger == SeparationTrigger::OnOptimalNode {
        loop {
            if out_of_time(&start) || engine.diagnostics().separation_rounds > max_rounds {
                break;
            }
            let relaxed = engine.solve_master(true)?;
            let outcome = engine.on_candidate(&Candidate::from(relaxed))?;
            if outcome.cuts_added == 0 {
                break;
            }
        }
    }

    let mut status = SolveStatus::Optimal;
    let incumbent = loop {
        if engine.diagnostics().separation_rounds > max_rounds {
            return Err(QapError::Solver(format!(
                "cut generation did not converge within {max_rounds} rounds"
            )));
        }
        let incumbent = engine.solve_master(false)?;
        if settings.cut_mode == CutInjectionMode::UserCut {
            // strengthening cuts only; the seeded master is already exact
            break incumbent;
        }
        if out_of_time(&start) {
            status = SolveStatus::TimeLimit;
            break incumbent;
        }
        let outcome = engine.on_candidate(&Candidate::from(incumbent.clone()))?;
        if outcome.cuts_added == 0 {
            if outcome.pairs_skipped > 0 {
                return Err(QapError::Solver(format!(
                    "separation skipped {} pair(s) and added no cut; \
                     optimality cannot be certified",
                    outcome.pairs_skipped
                )));
            }
            break incumbent;
        }
    };

    // at an integral incumbent the master objective coincides with the true
    // assignment cost once no pair is violated; report the recomputed cost
    // so tolerance drift never leaks into the artifact
    let objective = if settings.x_is_bin {
        assignment_cost(q, &incumbent.x)
    } else {
        incumbent.objective
    };

    Ok(MethodSolution {
        method: QapMethod::Benders,
        status,
        objective,
        bound: incumbent.objective,
        assignment: incumbent.x,
        w: Some(incumbent.w),
        rounds: engine.diagnostics().separation_rounds,
        solve_time: start.elapsed(),
        benders: Some(engine.into_diagnostics()),
    })
}

/// Interaction cost of a 0/1 assignment under the tensor.
fn assignment_cost(q: &CostTensor, x: &SquareMatrix) -> f64 {
    let n = q.n();
    let mut total = 0.0;
    for i in 0..n {
        for j in 0..n {
            if x[(i, j)] > 0.5 {
                for k in 0..n {
                    for l in 0..n {
                        if x[(k, l)] > 0.5 {
                            total += q.at(i, j, k, l);
                        }
                    }
                }
            }
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::small3_tensor;
    use qap_core::Permutation;

    #[test]
    fn test_engine_starts_idle_and_returns_to_idle() {
        let q = small3_tensor();
        let settings = BendersSettings {
            init_with_kbl: false,
            ..Default::default()
        };
        let mut engine = BendersEngine::new(&q, &settings).unwrap();
        assert_eq!(engine.state(), EngineState::Idle);

        let p = Permutation::new(vec![0, 1, 2]).unwrap();
        let candidate = Candidate {
            x: p.to_matrix(),
            w: SquareMatrix::zeros(3),
        };
        let outcome = engine.on_candidate(&candidate).unwrap();
        assert_eq!(engine.state(), EngineState::Idle);
        assert_eq!(engine.diagnostics().callback_calls, 1);
        assert_eq!(engine.diagnostics().separation_rounds, 1);
        assert_eq!(engine.diagnostics().cuts_added, outcome.cuts_added);
        assert_eq!(outcome.pairs_skipped, 0);
        // w = 0 underestimates every assigned pair with positive
        // interaction cost, so the round must cut
        assert!(outcome.cuts_added > 0);
        assert_eq!(engine.master().cut_count(), outcome.cuts_added);
    }

    #[test]
    fn test_satisfied_candidate_produces_no_cut() {
        let q = small3_tensor();
        let settings = BendersSettings {
            init_with_kbl: false,
            minimum_w_difference: 1e-6,
            ..Default::default()
        };
        let mut engine = BendersEngine::new(&q, &settings).unwrap();

        // w set to each assigned pair's true interaction cost: nothing to cut
        let p = Permutation::new(vec![0, 1, 2]).unwrap();
        let x = p.to_matrix();
        let mut w = SquareMatrix::zeros(3);
        for i in 0..3 {
            let j = p.at(i);
            let mut cost = 0.0;
            for k in 0..3 {
                if k != i {
                    cost += q.at(i, j, k, p.at(k));
                }
            }
            w[(i, j)] = cost;
        }
        let outcome = engine.on_candidate(&Candidate { x, w }).unwrap();
        assert_eq!(outcome.cuts_added, 0);
    }

    #[test]
    fn test_cut_soundness_over_all_assignments() {
        // every generated cut must hold at every feasible integral (X, W)
        // pair where W carries the true interaction costs
        let q = small3_tensor();
        let settings = BendersSettings {
            init_with_kbl: false,
            ..Default::default()
        };
        let mut engine = BendersEngine::new(&q, &settings).unwrap();

        for image in [[0, 1, 2], [1, 0, 2], [2, 1, 0]] {
            let p = Permutation::new(image.to_vec()).unwrap();
            let candidate = Candidate {
                x: p.to_matrix(),
                w: SquareMatrix::zeros(3),
            };
            engine.on_candidate(&candidate).unwrap();
        }
        assert!(engine.master().cut_count() > 0);

        for image in crate::test_utils::permutations(3) {
            let p = Permutation::new(image).unwrap();
            let x = p.to_matrix();
            let mut w = SquareMatrix::zeros(3);
            for i in 0..3 {
                let j = p.at(i);
                for k in 0..3 {
                    if k != i {
                        w[(i, j)] += q.at(i, j, k, p.at(k));
                    }
                }
            }
            for cut in engine.master().cuts() {
                assert!(
                    !cut.is_violated(&x, &w, 1e-4),
                    "cut for ({},{}) excludes a true cost point",
                    cut.i,
                    cut.j
                );
            }
        }
    }

    #[test]
    fn test_manual_rounds_converge_finitely() {
        let q = small3_tensor();
        let settings = BendersSettings {
            init_with_kbl: false,
            minimum_w_difference: 1e-6,
            ..Default::default()
        };
        let mut engine = BendersEngine::new(&q, &settings).unwrap();

        let mut previous_cuts = 0;
        let mut converged = false;
        for _ in 0..30 {
            let incumbent = engine.solve_master(false).unwrap();
            let outcome = engine
                .on_candidate(&Candidate::from(incumbent))
                .unwrap();
            if outcome.cuts_added == 0 {
                converged = true;
                break;
            }
            // the cut set grows strictly until saturation
            assert!(engine.master().cut_count() > previous_cuts);
            previous_cuts = engine.master().cut_count();
        }
        assert!(converged, "cut generation did not reach a fixed point");
    }
}
