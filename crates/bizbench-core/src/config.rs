//! Benchmark configuration

use crate::error::{BenchError, BenchResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// How benchmark units are scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ExecutionMode {
    /// One unit at a time
    Sequential,
    /// Bounded worker pool; `workers` caps in-flight units to respect
    /// downstream provider rate limits
    Concurrent { workers: usize },
}

impl Default for ExecutionMode {
    fn default() -> Self {
        ExecutionMode::Sequential
    }
}

/// Configuration for one model under test
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Identifier used to key results and summaries
    pub id: String,
    /// Provider kind ("openai", "scripted")
    pub provider: String,
    /// Provider-side model name
    pub model: String,
    /// Non-default API endpoint
    #[serde(default)]
    pub base_url: Option<String>,
    /// Environment variable holding the API key
    #[serde(default)]
    pub api_key_env: Option<String>,
    /// Sampling temperature
    #[serde(default)]
    pub temperature: Option<f64>,
    /// Completion token limit
    #[serde(default)]
    pub max_tokens: Option<u32>,
    /// Input token price per million, USD, for cost accounting
    #[serde(default)]
    pub input_cost_per_million: f64,
    /// Output token price per million, USD
    #[serde(default)]
    pub output_cost_per_million: f64,
}

fn default_runs() -> u32 {
    1
}

fn default_max_tool_rounds() -> u32 {
    3
}

/// Top-level benchmark configuration, loaded from a JSON or YAML file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchConfig {
    /// Models to benchmark
    pub models: Vec<ModelConfig>,

    /// Directory of scenario files; the built-in set is used when absent
    #[serde(default)]
    pub scenario_dir: Option<PathBuf>,

    /// Number of repeated runs per (model, scenario) pair
    #[serde(default = "default_runs")]
    pub runs_per_scenario: u32,

    /// Unit scheduling mode
    #[serde(default)]
    pub execution: ExecutionMode,

    /// Evaluator weight overrides by evaluator name; uniform when empty.
    /// Weights need not sum to 1; the aggregator re-normalizes.
    #[serde(default)]
    pub evaluator_weights: HashMap<String, f64>,

    /// Seed for tool fault injection, making failures reproducible across
    /// invocations of the same configuration
    #[serde(default)]
    pub seed: u64,

    /// Simulated error rate applied to the built-in tools
    #[serde(default)]
    pub tool_error_rate: f64,

    /// Cap on tool-resolution rounds within one conversation turn
    #[serde(default = "default_max_tool_rounds")]
    pub max_tool_rounds: u32,

    /// Directory for persisted results and summaries
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
}

impl BenchConfig {
    /// Load a configuration from a JSON or YAML file
    pub fn from_file(path: &Path) -> BenchResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();

        let config: BenchConfig = match extension {
            "json" => serde_json::from_str(&content)?,
            "yaml" | "yml" => serde_yaml::from_str(&content)?,
            other => {
                return Err(BenchError::config(format!(
                    "unsupported config file extension '{other}'"
                )));
            }
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration before any unit executes
    pub fn validate(&self) -> BenchResult<()> {
        if self.models.is_empty() {
            return Err(BenchError::config("no models configured"));
        }
        if self.runs_per_scenario == 0 {
            return Err(BenchError::config("runs_per_scenario must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.tool_error_rate) {
            return Err(BenchError::config(format!(
                "tool_error_rate {} is outside [0, 1]",
                self.tool_error_rate
            )));
        }
        if self.max_tool_rounds == 0 {
            return Err(BenchError::config("max_tool_rounds must be at least 1"));
        }
        if let ExecutionMode::Concurrent { workers } = self.execution {
            if workers == 0 {
                return Err(BenchError::config("concurrent mode needs at least 1 worker"));
            }
        }
        for (name, weight) in &self.evaluator_weights {
            if *weight < 0.0 {
                return Err(BenchError::config(format!(
                    "evaluator weight for '{name}' must not be negative"
                )));
            }
        }
        Ok(())
    }
}
