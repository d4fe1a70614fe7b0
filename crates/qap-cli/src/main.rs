use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

use qap_algo::benders::BendersSettings;
use qap_algo::{solve_benders, solve_kbl, solve_rlt, verify, QapMethod, SolveLimits};
use qap_io::{parse_instance, parse_solution};

mod cli;
mod report;

use cli::Cli;
use report::{write_report, RunPaths, RunReport};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("setting tracing subscriber")?;

    let paths = RunPaths {
        data: cli.data.clone(),
        solution: cli.solution.clone(),
        out_dir: cli.out_dir.clone(),
    };

    let instance = parse_instance(&paths.data)?;
    let q = instance.cost_tensor()?;
    info!(instance = %instance.name, n = instance.n(), "instance loaded");

    let known_solution = match &paths.solution {
        Some(path) => Some(parse_solution(path)?),
        None => None,
    };

    let limits = SolveLimits {
        time_limit: cli.time_limit,
        threads: cli.threads,
        soft_mem_limit: cli.soft_mem_limit,
        pre_crush: !cli.no_pre_crush,
    };
    let benders_settings = BendersSettings {
        x_is_bin: !cli.relax_x,
        init_with_kbl: !cli.no_kbl_init,
        init_with_xy: cli.xy_init,
        trigger: cli.separate_at.parse().map_err(anyhow::Error::msg)?,
        cut_mode: cli.cut_mode.parse().map_err(anyhow::Error::msg)?,
        minimum_w_difference: cli.min_w_difference,
        limits,
    };

    let methods: Vec<QapMethod> = cli
        .methods
        .iter()
        .map(|m| m.parse().map_err(anyhow::Error::msg))
        .collect::<Result<_>>()?;

    for method in methods {
        info!(%method, instance = %instance.name, "solving");
        let raw_start = Instant::now();
        let solution = match method {
            QapMethod::KaufmanBroeckx => solve_kbl(&q, &limits)?,
            QapMethod::Rlt => solve_rlt(&q, &limits)?,
            QapMethod::Benders => solve_benders(&q, &benders_settings)?,
        };
        let raw_time = raw_start.elapsed().as_secs_f64();

        let known = known_solution
            .as_ref()
            .map(|s| (&s.permutation, s.objective));
        let verification = verify(&instance.a, &instance.b, &solution, known)?;

        let settings = match method {
            QapMethod::Benders => serde_json::to_value(&benders_settings)?,
            _ => serde_json::to_value(limits)?,
        };
        let run = RunReport {
            instance_name: &instance.name,
            method,
            solution: &solution,
            verification: &verification,
            settings,
            raw_time,
        };
        let artifact = write_report(&paths, &run)?;

        info!(
            %method,
            status = %solution.status,
            objective = solution.objective,
            artifact = %artifact.display(),
            "run complete"
        );
        println!(
            "{method}: status={} objective={} bound={} verified={} ({})",
            solution.status,
            solution.objective,
            solution.bound,
            verification.objective_match,
            artifact.display()
        );
    }

    Ok(())
}
