//! Engine-owned diagnostics for one optimization run.
//!
//! Counters and logs live in an explicit record owned by the engine and
//! handed back with the solution; the external solver never sees or mutates
//! them.

use std::time::Duration;

use serde::Serialize;

use qap_core::Diagnostics;

/// One row per separation round.
#[derive(Debug, Clone, Serialize)]
pub struct RoundRecord {
    pub round: usize,
    /// Checkpoint index the round ran at
    pub callback_call: usize,
    pub cuts_added: usize,
    /// Seconds since the engine was constructed
    pub time_since_start: f64,
    /// Seconds spent inside this round
    pub time_in_round: f64,
}

/// One row per committed cut.
#[derive(Debug, Clone, Serialize)]
pub struct CutRecord {
    pub cut_number: usize,
    pub round: usize,
    /// `w_bar[i,j] - w_hat[i,j]` at separation time
    pub violation: f64,
    pub i: usize,
    pub j: usize,
}

/// Counters and logs accumulated over the lifetime of one run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BendersDiagnostics {
    /// Checkpoints offered to the engine
    pub callback_calls: usize,
    /// Checkpoints that ran the full subproblem battery
    pub separation_rounds: usize,
    /// Cuts committed over the whole run
    pub cuts_added: usize,
    /// Cumulative wall-clock spent inside separation
    pub time_in_separation: Duration,
    pub rounds: Vec<RoundRecord>,
    pub cut_log: Vec<CutRecord>,
    /// Non-fatal anomalies (skipped pairs etc.)
    pub issues: Diagnostics,
}
