//! BizBench command line entry point

mod args;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use bizbench_core::config::{BenchConfig, ExecutionMode, ModelConfig};
use bizbench_core::llm::providers::{OpenAiCompatibleModel, ScriptedModel};
use bizbench_core::llm::LanguageModel;
use bizbench_core::scenario::ScenarioLoader;
use bizbench_eval::evaluators::default_evaluators;
use bizbench_eval::report::ReportWriter;
use bizbench_eval::runner::{RunnerOptions, ScenarioRunner};
use bizbench_eval::{EvaluationPipeline, Summary};
use bizbench_tools::default_tools;

use args::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = BenchConfig::from_file(&cli.config)
        .with_context(|| format!("failed to load config from {}", cli.config.display()))?;
    apply_overrides(&mut config, &cli);

    let scenarios = match &config.scenario_dir {
        Some(dir) => ScenarioLoader::load_dir(dir)
            .with_context(|| format!("failed to load scenarios from {}", dir.display()))?,
        None => ScenarioLoader::builtin(),
    };

    let models = build_models(&config)?;
    let tools = default_tools(config.tool_error_rate, config.seed);
    let runner = ScenarioRunner::new()
        .with_options(RunnerOptions::new().with_max_tool_rounds(config.max_tool_rounds));

    let mut builder = EvaluationPipeline::builder()
        .scenarios(scenarios)
        .evaluators(default_evaluators())
        .evaluator_weights(config.evaluator_weights.clone())
        .tools(tools)
        .runs_per_scenario(config.runs_per_scenario)
        .mode(config.execution)
        .runner(runner);
    for model in models {
        builder = builder.model(model);
    }

    let pipeline = builder.build().context("invalid benchmark configuration")?;
    info!(units = pipeline.unit_count(), "benchmark configured");

    let outcome = pipeline.run().await?;

    let output_dir = config
        .output_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from("bizbench-results"));
    let paths = ReportWriter::new(output_dir).write(&outcome.results, &outcome.summary)?;

    print_summary(&outcome.summary);
    println!("\nResults written to {}", paths.results.display());
    println!("Summary written to {}", paths.summary.display());

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_directive = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn apply_overrides(config: &mut BenchConfig, cli: &Cli) {
    if let Some(runs) = cli.runs {
        config.runs_per_scenario = runs;
    }
    if let Some(workers) = cli.workers {
        config.execution = ExecutionMode::Concurrent { workers };
    }
    if cli.sequential {
        config.execution = ExecutionMode::Sequential;
    }
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    if let Some(output_dir) = &cli.output_dir {
        config.output_dir = Some(output_dir.clone());
    }
}

fn build_models(config: &BenchConfig) -> Result<Vec<Arc<dyn LanguageModel>>> {
    let mut models: Vec<Arc<dyn LanguageModel>> = Vec::with_capacity(config.models.len());
    for model_config in &config.models {
        models.push(build_model(model_config)?);
    }
    Ok(models)
}

fn build_model(config: &ModelConfig) -> Result<Arc<dyn LanguageModel>> {
    match config.provider.as_str() {
        "openai" => {
            let key_var = config.api_key_env.as_deref().unwrap_or("OPENAI_API_KEY");
            let api_key = std::env::var(key_var).with_context(|| {
                format!(
                    "model '{}' needs an API key in the {key_var} environment variable",
                    config.id
                )
            })?;

            let mut model = OpenAiCompatibleModel::new(&config.id, &config.model, api_key)
                .map_err(|err| anyhow::anyhow!("{err}"))?
                .with_pricing(
                    config.input_cost_per_million,
                    config.output_cost_per_million,
                )
                .with_request_timeout(Duration::from_secs(120));
            if let Some(base_url) = &config.base_url {
                model = model.with_base_url(base_url);
            }
            if let Some(temperature) = config.temperature {
                model = model.with_temperature(temperature);
            }
            if let Some(max_tokens) = config.max_tokens {
                model = model.with_max_tokens(max_tokens);
            }
            Ok(Arc::new(model))
        }
        "scripted" => Ok(Arc::new(ScriptedModel::new(&config.id))),
        other => bail!("unknown provider '{other}' for model '{}'", config.id),
    }
}

fn print_summary(summary: &Summary) {
    println!("\nBenchmark summary ({} runs attempted, {} completed)", summary.attempted_runs, summary.completed_runs);
    println!("{:-<72}", "");
    println!(
        "{:<24} {:>8} {:>10} {:>10} {:>10}",
        "model", "overall", "success", "runs", "tool calls"
    );
    for (model_id, model) in &summary.models {
        println!(
            "{:<24} {:>8.2} {:>9.0}% {:>10} {:>10}",
            model_id,
            model.overall_score,
            model.success.rate * 100.0,
            model.success.attempted,
            model.tool_metrics.total_calls,
        );
    }

    for (model_id, model) in &summary.models {
        if model.by_category.is_empty() {
            continue;
        }
        println!("\n{model_id} by category:");
        for (category, breakdown) in &model.by_category {
            println!(
                "  {:<20} score {:>5.2}  success {:>3.0}%",
                category,
                breakdown.score,
                breakdown.success.rate * 100.0
            );
        }
    }
}
