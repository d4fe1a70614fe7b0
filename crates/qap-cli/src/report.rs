//! Run artifact writing.
//!
//! One text report per run plus, for Benders runs, CSV logs of the
//! separation rounds (`*_callback_info.csv`) and committed cuts
//! (`*_cut_info.csv`). Files are named `output_<stamp>_r<k>` with `k`
//! bumped until the name is free, so re-runs never clobber earlier
//! artifacts.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use qap_algo::benders::BendersDiagnostics;
use qap_algo::{MethodSolution, QapMethod, VerificationReport};

/// File locations for one invocation, constructed once at startup and
/// passed down to every component that touches the filesystem.
#[derive(Debug, Clone)]
pub struct RunPaths {
    pub data: PathBuf,
    pub solution: Option<PathBuf>,
    pub out_dir: PathBuf,
}

/// Everything the artifact records about one method run.
pub struct RunReport<'a> {
    pub instance_name: &'a str,
    pub method: QapMethod,
    pub solution: &'a MethodSolution,
    pub verification: &'a VerificationReport,
    /// Settings echo, serialized by the caller
    pub settings: serde_json::Value,
    /// Wall-clock of the whole method run as measured by the caller
    pub raw_time: f64,
}

/// Write the text report (and CSV logs for Benders runs); returns the path
/// of the text report.
pub fn write_report(paths: &RunPaths, report: &RunReport<'_>) -> Result<PathBuf> {
    fs::create_dir_all(&paths.out_dir)
        .with_context(|| format!("creating {}", paths.out_dir.display()))?;

    let stamp = chrono::Local::now().format("%Y-%m-%d_%H-%M");
    let mut run = 1;
    let base = loop {
        let candidate = paths.out_dir.join(format!("output_{stamp}_r{run}"));
        if !candidate.with_extension("txt").exists() {
            break candidate;
        }
        run += 1;
    };

    let txt_path = base.with_extension("txt");
    let mut f = fs::File::create(&txt_path)
        .with_context(|| format!("creating {}", txt_path.display()))?;

    writeln!(f, "Output file:")?;
    writeln!(f, "instance_name: {}", report.instance_name)?;
    writeln!(f, "solving_technique: {}", report.method)?;
    writeln!(f, "data_file: {}", paths.data.display())?;
    if let Some(sol) = &paths.solution {
        writeln!(f, "solution_file: {}", sol.display())?;
    }
    writeln!(f)?;

    writeln!(f, "status: {}", report.solution.status)?;
    writeln!(f, "objective: {}", report.solution.objective)?;
    writeln!(f, "bound: {}", report.solution.bound)?;
    writeln!(f, "rounds: {}", report.solution.rounds)?;
    writeln!(
        f,
        "solve_time_s: {}",
        report.solution.solve_time.as_secs_f64()
    )?;
    writeln!(f, "raw_time_s: {}", report.raw_time)?;
    writeln!(f)?;

    writeln!(f, "objective_match: {}", report.verification.objective_match)?;
    writeln!(
        f,
        "recomputed_objective: {}",
        report.verification.recomputed_objective
    )?;
    if let Some(consistent) = report.verification.known_solution_consistent {
        writeln!(f, "solution_file_consistent: {consistent}")?;
    }
    if let Some(matches) = report.verification.matches_known_optimum {
        writeln!(f, "matches_known_optimum: {matches}")?;
    }
    for issue in report.verification.issues.issues() {
        writeln!(f, "{issue}")?;
    }
    writeln!(f)?;

    writeln!(f, "Settings:")?;
    writeln!(f, "{}", serde_json::to_string_pretty(&report.settings)?)?;

    if let Some(diag) = &report.solution.benders {
        writeln!(f)?;
        writeln!(f, "callback_calls: {}", diag.callback_calls)?;
        writeln!(f, "separation_rounds: {}", diag.separation_rounds)?;
        writeln!(f, "cuts_added: {}", diag.cuts_added)?;
        writeln!(
            f,
            "time_in_separation_s: {}",
            diag.time_in_separation.as_secs_f64()
        )?;
        for issue in diag.issues.issues() {
            writeln!(f, "{issue}")?;
        }
        write_csv_logs(&base, diag)?;
    }

    writeln!(f)?;
    writeln!(f, "non zero assignment entries:")?;
    let x = &report.solution.assignment;
    for i in 0..x.n() {
        for j in 0..x.n() {
            if x[(i, j)] != 0.0 {
                writeln!(f, "x[{i},{j}] = {}", x[(i, j)])?;
            }
        }
    }

    Ok(txt_path)
}

fn write_csv_logs(base: &Path, diag: &BendersDiagnostics) -> Result<()> {
    let mut rounds = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_path(csv_path(base, "callback_info"))?;
    for record in &diag.rounds {
        rounds.serialize(record)?;
    }
    rounds.flush()?;

    let mut cuts = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_path(csv_path(base, "cut_info"))?;
    for record in &diag.cut_log {
        cuts.serialize(record)?;
    }
    cuts.flush()?;
    Ok(())
}

fn csv_path(base: &Path, suffix: &str) -> PathBuf {
    let mut name = base
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    name.push('_');
    name.push_str(suffix);
    name.push_str(".csv");
    base.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use qap_algo::{verify, SolveLimits};
    use qap_core::CostTensor;

    #[test]
    fn test_report_written_without_clobbering() {
        let dir = tempfile::tempdir().unwrap();
        let a = qap_core::SquareMatrix::from_flat(1, vec![2.0]).unwrap();
        let b = qap_core::SquareMatrix::from_flat(1, vec![3.0]).unwrap();
        let q = CostTensor::from_matrices(&a, &b).unwrap();
        let solution = qap_algo::solve_kbl(&q, &SolveLimits::default()).unwrap();
        let verification = verify(&a, &b, &solution, None).unwrap();

        let paths = RunPaths {
            data: PathBuf::from("trivial.dat"),
            solution: None,
            out_dir: dir.path().to_path_buf(),
        };
        let report = RunReport {
            instance_name: "trivial",
            method: solution.method,
            solution: &solution,
            verification: &verification,
            settings: serde_json::to_value(SolveLimits::default()).unwrap(),
            raw_time: 0.01,
        };

        let first = write_report(&paths, &report).unwrap();
        let second = write_report(&paths, &report).unwrap();
        assert_ne!(first, second);
        let text = fs::read_to_string(&first).unwrap();
        assert!(text.contains("solving_technique: kbl"));
        assert!(text.contains("objective: 6"));
        assert!(text.contains("objective_match: true"));
    }
}
