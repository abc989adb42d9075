use std::path::PathBuf;

use clap::Parser;

use benchrun_core::PostprocessMode;

#[derive(Parser, Debug)]
#[command(
    name = "benchrun",
    version,
    about = "Run a benchmark under orchestration: parameter expansion, sampled iterations, telemetry, and run documents",
    after_help = "Orchestrator options must come before <BENCHMARK>; everything after it is \
                  handed to the benchmark. Separate parameter sets with `--`."
)]
pub struct Cli {
    /// Orchestrator config file (YAML)
    #[arg(long, env = "BENCHRUN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Comma-separated hosts the benchmark runs on
    #[arg(long, value_delimiter = ',')]
    pub clients: Vec<String>,

    /// Comma-separated server hosts, for two-sided benchmarks
    #[arg(long, value_delimiter = ',')]
    pub servers: Vec<String>,

    /// Samples per iteration; a `--samples=N` inside a parameter set
    /// overrides this for that set
    #[arg(long)]
    pub samples: Option<usize>,

    /// Parent directory for new runs; with --postprocess-only, the run
    /// directory to re-process
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// Tool group collected around every sample
    #[arg(long)]
    pub tool_group: Option<String>,

    /// System information gathered when tools stop
    #[arg(long)]
    pub sysinfo: Option<String>,

    /// Post-processing flavor: html or cdm
    #[arg(long)]
    pub postprocess_mode: Option<PostprocessMode>,

    /// Skip execution and re-run post-processing over an existing run
    #[arg(long)]
    pub postprocess_only: bool,

    /// Shell command run in each sample directory before the sample starts
    #[arg(long)]
    pub pre_sample_cmd: Option<String>,

    /// Your name, recorded in the run documents
    #[arg(long)]
    pub user_name: Option<String>,

    /// Your email, recorded in the run documents
    #[arg(long)]
    pub user_email: Option<String>,

    /// Free-form run description
    #[arg(long)]
    pub user_desc: Option<String>,

    /// Comma-separated tags attached to the run
    #[arg(long)]
    pub user_tags: Option<String>,

    /// Benchmark to run, or `list` to show the known benchmarks
    pub benchmark: String,

    /// Benchmark parameters, `--`-separated into parameter sets
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub params: Vec<String>,
}
