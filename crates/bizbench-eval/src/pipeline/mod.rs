//! The evaluation pipeline
//!
//! Enumerates the models × scenarios × run-count cross-product, schedules
//! runner executions sequentially or across a bounded worker pool, applies
//! the evaluator set to each completed transcript, and aggregates everything
//! into a Summary. Errors local to one unit never propagate to siblings;
//! only configuration errors are pipeline-fatal.

use std::collections::{HashMap, HashSet};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use bizbench_core::config::ExecutionMode;
use bizbench_core::error::{BenchError, BenchResult};
use bizbench_core::evaluator::Evaluator;
use bizbench_core::llm::LanguageModel;
use bizbench_core::scenario::BusinessScenario;
use bizbench_core::tools::ToolMap;
use futures::FutureExt;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::metrics::{RunResult, RunStatus, Summary, SummaryAggregator};
use crate::runner::ScenarioRunner;

/// Everything a pipeline invocation produces
#[derive(Debug)]
pub struct PipelineOutcome {
    /// One result per attempted unit
    pub results: Vec<RunResult>,
    /// The cross-unit aggregation
    pub summary: Summary,
}

/// Builder for [`EvaluationPipeline`]
#[derive(Default)]
pub struct PipelineBuilder {
    models: Vec<Arc<dyn LanguageModel>>,
    scenarios: Vec<BusinessScenario>,
    evaluators: Vec<Arc<dyn Evaluator>>,
    tools: ToolMap,
    runs_per_scenario: u32,
    mode: ExecutionMode,
    runner: Option<ScenarioRunner>,
    weight_overrides: HashMap<String, f64>,
}

impl PipelineBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self {
            runs_per_scenario: 1,
            ..Self::default()
        }
    }

    /// Add a model under test
    pub fn model(mut self, model: Arc<dyn LanguageModel>) -> Self {
        self.models.push(model);
        self
    }

    /// Add a scenario
    pub fn scenario(mut self, scenario: BusinessScenario) -> Self {
        self.scenarios.push(scenario);
        self
    }

    /// Add a batch of scenarios
    pub fn scenarios(mut self, scenarios: Vec<BusinessScenario>) -> Self {
        self.scenarios.extend(scenarios);
        self
    }

    /// Add an evaluator
    pub fn evaluator(mut self, evaluator: Arc<dyn Evaluator>) -> Self {
        self.evaluators.push(evaluator);
        self
    }

    /// Add a batch of evaluators
    pub fn evaluators(mut self, evaluators: Vec<Arc<dyn Evaluator>>) -> Self {
        self.evaluators.extend(evaluators);
        self
    }

    /// Set the tool mapping shared by all units
    pub fn tools(mut self, tools: ToolMap) -> Self {
        self.tools = tools;
        self
    }

    /// Set the repeat count per (model, scenario) pair
    pub fn runs_per_scenario(mut self, runs: u32) -> Self {
        self.runs_per_scenario = runs;
        self
    }

    /// Set the scheduling mode
    pub fn mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Replace the default runner
    pub fn runner(mut self, runner: ScenarioRunner) -> Self {
        self.runner = Some(runner);
        self
    }

    /// Override evaluator weights by name
    pub fn evaluator_weights(mut self, weights: HashMap<String, f64>) -> Self {
        self.weight_overrides = weights;
        self
    }

    /// Validate the configuration and build the pipeline.
    ///
    /// Configuration errors are surfaced here, before any unit executes, so
    /// a misconfigured benchmark never produces a misleading partial summary.
    pub fn build(self) -> BenchResult<EvaluationPipeline> {
        if self.models.is_empty() {
            return Err(BenchError::config("no models configured"));
        }
        if self.evaluators.is_empty() {
            return Err(BenchError::config("no evaluators configured"));
        }
        if self.runs_per_scenario == 0 {
            return Err(BenchError::config("runs_per_scenario must be at least 1"));
        }
        if let ExecutionMode::Concurrent { workers } = self.mode {
            if workers == 0 {
                return Err(BenchError::config("concurrent mode needs at least 1 worker"));
            }
        }

        let mut ids = HashSet::new();
        for model in &self.models {
            if !ids.insert(model.id().to_string()) {
                return Err(BenchError::config(format!(
                    "duplicate model id '{}'",
                    model.id()
                )));
            }
        }

        // An individually invalid scenario (e.g. zero scripted turns) is
        // reported and skipped; the pipeline refuses to start only when
        // nothing valid remains.
        let mut scenarios = Vec::with_capacity(self.scenarios.len());
        let mut scenario_ids = HashSet::new();
        for scenario in self.scenarios {
            if let Err(err) = scenario.validate() {
                warn!(scenario = %scenario.id, error = %err, "skipping invalid scenario");
                continue;
            }
            if !scenario_ids.insert(scenario.id.clone()) {
                return Err(BenchError::config(format!(
                    "duplicate scenario id '{}'",
                    scenario.id
                )));
            }
            scenarios.push(Arc::new(scenario));
        }
        if scenarios.is_empty() {
            return Err(BenchError::config("no valid scenarios configured"));
        }

        Ok(EvaluationPipeline {
            models: self.models,
            scenarios,
            evaluators: self.evaluators,
            tools: Arc::new(self.tools),
            runs_per_scenario: self.runs_per_scenario,
            mode: self.mode,
            runner: Arc::new(self.runner.unwrap_or_default()),
            weight_overrides: self.weight_overrides,
        })
    }
}

/// Schedules benchmark units and aggregates their results
pub struct EvaluationPipeline {
    models: Vec<Arc<dyn LanguageModel>>,
    scenarios: Vec<Arc<BusinessScenario>>,
    evaluators: Vec<Arc<dyn Evaluator>>,
    tools: Arc<ToolMap>,
    runs_per_scenario: u32,
    mode: ExecutionMode,
    runner: Arc<ScenarioRunner>,
    weight_overrides: HashMap<String, f64>,
}

impl EvaluationPipeline {
    /// Start building a pipeline
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Number of units this pipeline will attempt
    pub fn unit_count(&self) -> usize {
        self.models.len() * self.scenarios.len() * self.runs_per_scenario as usize
    }

    /// Execute every unit and aggregate the results
    pub async fn run(&self) -> BenchResult<PipelineOutcome> {
        info!(
            models = self.models.len(),
            scenarios = self.scenarios.len(),
            runs_per_scenario = self.runs_per_scenario,
            units = self.unit_count(),
            "starting evaluation pipeline"
        );

        let results = match self.mode {
            ExecutionMode::Sequential => self.run_sequential().await,
            ExecutionMode::Concurrent { workers } => self.run_concurrent(workers).await,
        };

        let usage: HashMap<_, _> = self
            .models
            .iter()
            .map(|model| (model.id().to_string(), model.usage()))
            .collect();

        let aggregator =
            SummaryAggregator::from_evaluators(&self.evaluators, &self.weight_overrides);
        let summary = aggregator.aggregate(&results, &usage);

        info!(
            attempted = summary.attempted_runs,
            completed = summary.completed_runs,
            "pipeline finished"
        );

        Ok(PipelineOutcome { results, summary })
    }

    async fn run_sequential(&self) -> Vec<RunResult> {
        let mut results = Vec::with_capacity(self.unit_count());
        for model in &self.models {
            for scenario in &self.scenarios {
                for run_index in 0..self.runs_per_scenario {
                    results.push(
                        execute_unit(
                            Arc::clone(&self.runner),
                            Arc::clone(model),
                            Arc::clone(scenario),
                            Arc::clone(&self.tools),
                            self.evaluators.clone(),
                            run_index,
                        )
                        .await,
                    );
                }
            }
        }
        results
    }

    async fn run_concurrent(&self, workers: usize) -> Vec<RunResult> {
        let semaphore = Arc::new(Semaphore::new(workers));
        let mut set = JoinSet::new();

        for model in &self.models {
            for scenario in &self.scenarios {
                for run_index in 0..self.runs_per_scenario {
                    let semaphore = Arc::clone(&semaphore);
                    let runner = Arc::clone(&self.runner);
                    let model = Arc::clone(model);
                    let scenario = Arc::clone(scenario);
                    let tools = Arc::clone(&self.tools);
                    let evaluators = self.evaluators.clone();

                    set.spawn(async move {
                        // The semaphore is never closed; a failed acquire
                        // would only drop the bound, not the unit.
                        let _permit = semaphore.acquire_owned().await.ok();
                        execute_unit(runner, model, scenario, tools, evaluators, run_index).await
                    });
                }
            }
        }

        let mut results = Vec::with_capacity(self.unit_count());
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(result) => results.push(result),
                Err(err) => error!(error = %err, "benchmark unit task did not complete"),
            }
        }
        results
    }
}

/// Execute one unit in isolation and score its transcript.
///
/// A panic inside the runner is contained here and recorded as a failed
/// unit; it never cancels sibling units. Evaluator errors and panics are
/// recorded per evaluator and leave the remaining evaluators running.
async fn execute_unit(
    runner: Arc<ScenarioRunner>,
    model: Arc<dyn LanguageModel>,
    scenario: Arc<BusinessScenario>,
    tools: Arc<ToolMap>,
    evaluators: Vec<Arc<dyn Evaluator>>,
    run_index: u32,
) -> RunResult {
    let fut = runner.run(model.as_ref(), &scenario, &tools, run_index);
    let mut result = match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(result) => result,
        Err(_) => {
            error!(model = %model.id(), scenario = %scenario.id, run_index, "unit panicked");
            let mut result = RunResult::new(model.id(), &scenario, run_index);
            result.status = RunStatus::Failed;
            result.failure = Some("unit panicked during execution".to_string());
            result
        }
    };

    if result.is_completed() {
        for evaluator in &evaluators {
            let name = evaluator.name().to_string();
            let scored = std::panic::catch_unwind(AssertUnwindSafe(|| {
                evaluator.score(&result.transcript, &scenario)
            }));
            match scored {
                Ok(Ok(evaluation)) => {
                    result.scores.insert(name, evaluation);
                }
                Ok(Err(err)) => {
                    warn!(evaluator = %name, error = %err, "evaluator failed; contribution is missing");
                    result.evaluator_failures.insert(name, err.to_string());
                }
                Err(_) => {
                    warn!(evaluator = %name, "evaluator panicked; contribution is missing");
                    result
                        .evaluator_failures
                        .insert(name, "evaluator panicked".to_string());
                }
            }
        }
    }

    result
}
