//! CLI argument definitions using clap

use clap::Parser;
use std::path::PathBuf;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "bizbench.json";

#[derive(Parser)]
#[command(name = "bizbench")]
#[command(about = "Benchmark conversational language models on multi-turn business scenarios")]
#[command(version)]
pub struct Cli {
    /// Path to the benchmark configuration file (JSON or YAML)
    #[arg(long, short = 'c', default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Directory for persisted results (overrides the config file)
    #[arg(long, short = 'o')]
    pub output_dir: Option<PathBuf>,

    /// Number of runs per (model, scenario) pair (overrides the config file)
    #[arg(long)]
    pub runs: Option<u32>,

    /// Run units across a bounded worker pool of this size
    #[arg(long, conflicts_with = "sequential")]
    pub workers: Option<usize>,

    /// Force sequential execution
    #[arg(long)]
    pub sequential: bool,

    /// Seed for tool fault injection (overrides the config file)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Enable verbose logging
    #[arg(long, short)]
    pub verbose: bool,
}
