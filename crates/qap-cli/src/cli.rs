use clap::Parser;
use std::path::PathBuf;

/// Exact QAP solver suite: Kaufman-Broeckx, RLT and Benders decomposition.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Set the logging level
    #[arg(long, default_value = "info")]
    pub log_level: tracing::Level,

    /// Path to the instance data file (n, A, B blocks)
    #[arg(long)]
    pub data: PathBuf,

    /// Optional known-optimal solution file to verify against
    #[arg(long)]
    pub solution: Option<PathBuf>,

    /// Methods to run, comma separated (kbl, rlt, benders)
    #[arg(long, value_delimiter = ',', default_value = "benders,kbl")]
    pub methods: Vec<String>,

    /// Output directory for run artifacts
    #[arg(long, default_value = "results")]
    pub out_dir: PathBuf,

    /// Wall-clock limit in seconds (-1 = unlimited)
    #[arg(long, default_value_t = -1.0, allow_hyphen_values = true)]
    pub time_limit: f64,

    /// Worker threads for the subproblem battery (-1 = library default)
    #[arg(long, default_value_t = -1, allow_hyphen_values = true)]
    pub threads: i64,

    /// Soft memory limit in GB (-1 = unlimited); advisory for the pure-Rust
    /// backends
    #[arg(long, default_value_t = -1, allow_hyphen_values = true)]
    pub soft_mem_limit: i64,

    /// Disable the pre-crush hint
    #[arg(long)]
    pub no_pre_crush: bool,

    /// Benders: keep X continuous in [0,1] instead of binary
    #[arg(long)]
    pub relax_x: bool,

    /// Benders: do not seed the master with the Kaufman-Broeckx bounds
    #[arg(long)]
    pub no_kbl_init: bool,

    /// Benders: request the XY warm start (not implemented; fails fast)
    #[arg(long)]
    pub xy_init: bool,

    /// Benders: separation checkpoint (incumbent | node)
    #[arg(long, default_value = "incumbent")]
    pub separate_at: String,

    /// Benders: cut injection mode (lazy | user-cut)
    #[arg(long, default_value = "lazy")]
    pub cut_mode: String,

    /// Benders: violation tolerance before a cut is injected
    #[arg(long, default_value_t = 0.0)]
    pub min_w_difference: f64,
}
