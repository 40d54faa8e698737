//! Summary aggregation over run results
//!
//! Reduces the full set of RunResults into per-model summaries. The
//! reduction is commutative and associative over runs, so the order in which
//! results arrive from the scheduler does not affect the output.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use bizbench_core::evaluator::Evaluator;
use bizbench_core::llm::UsageSnapshot;
use chrono::Utc;
use tracing::warn;

use super::types::{
    CategoryBreakdown, ModelSummary, RunResult, SuccessStats, Summary, ToolUsageMetrics,
};

/// Aggregator computing a [`Summary`] from run results
pub struct SummaryAggregator {
    /// Effective weight per evaluator name
    weights: HashMap<String, f64>,
}

impl SummaryAggregator {
    /// Create an aggregator with explicit per-evaluator weights.
    ///
    /// Weights need not sum to 1; normalization happens per run over the
    /// evaluators that actually produced a score, so a missing evaluator
    /// contribution is missing rather than an implicit zero.
    pub fn new(weights: HashMap<String, f64>) -> Self {
        Self { weights }
    }

    /// Resolve weights from an evaluator set plus configured overrides
    pub fn from_evaluators(
        evaluators: &[Arc<dyn Evaluator>],
        overrides: &HashMap<String, f64>,
    ) -> Self {
        let weights = evaluators
            .iter()
            .map(|evaluator| {
                let name = evaluator.name().to_string();
                let weight = overrides
                    .get(&name)
                    .copied()
                    .unwrap_or_else(|| evaluator.weight());
                (name, weight)
            })
            .collect();
        Self::new(weights)
    }

    fn weight_for(&self, evaluator: &str) -> f64 {
        self.weights.get(evaluator).copied().unwrap_or(1.0)
    }

    /// Weight-normalized score of one run over the evaluators that scored it
    fn weighted_run_score(&self, run: &RunResult) -> Option<f64> {
        let mut numerator = 0.0;
        let mut denominator = 0.0;
        for (name, evaluation) in &run.scores {
            let weight = self.weight_for(name);
            numerator += weight * evaluation.score;
            denominator += weight;
        }
        (denominator > 0.0).then(|| numerator / denominator)
    }

    /// Compute the summary for a full result set
    pub fn aggregate(
        &self,
        results: &[RunResult],
        usage: &HashMap<String, UsageSnapshot>,
    ) -> Summary {
        // The (model, scenario, run-index) triple must be unique; duplicates
        // would silently overwrite each other in the per-scenario matrix.
        let mut seen = HashSet::new();
        for run in results {
            if !seen.insert(run.unit_key()) {
                warn!(
                    model = %run.model_id,
                    scenario = %run.scenario_id,
                    run_index = run.run_index,
                    "duplicate run result for unit triple"
                );
            }
        }

        let mut by_model: BTreeMap<&str, Vec<&RunResult>> = BTreeMap::new();
        for run in results {
            by_model.entry(run.model_id.as_str()).or_default().push(run);
        }

        let mut models = BTreeMap::new();
        for (model_id, runs) in by_model {
            let summary = self.summarize_model(model_id, &runs, usage.get(model_id));
            models.insert(model_id.to_string(), summary);
        }

        Summary {
            generated_at: Utc::now(),
            attempted_runs: results.len() as u32,
            completed_runs: results.iter().filter(|r| r.is_completed()).count() as u32,
            models,
        }
    }

    fn summarize_model(
        &self,
        model_id: &str,
        runs: &[&RunResult],
        usage: Option<&UsageSnapshot>,
    ) -> ModelSummary {
        // Failed and aborted runs count against success rate but are
        // excluded from every score mean.
        let completed: Vec<&RunResult> = runs
            .iter()
            .copied()
            .filter(|r| r.is_completed())
            .collect();

        let overall_score = mean(
            completed
                .iter()
                .filter_map(|run| self.weighted_run_score(run)),
        );

        let mut evaluator_sums: BTreeMap<String, (f64, u32)> = BTreeMap::new();
        for run in &completed {
            for (name, evaluation) in &run.scores {
                let entry = evaluator_sums.entry(name.clone()).or_insert((0.0, 0));
                entry.0 += evaluation.score;
                entry.1 += 1;
            }
        }
        let evaluator_scores = evaluator_sums
            .into_iter()
            .map(|(name, (sum, count))| (name, sum / f64::from(count)))
            .collect();

        let by_category = self.categorize(runs);
        let by_scenario = self.scenario_matrix_row(&completed);
        let tool_metrics = self.tool_metrics(runs, &completed);

        ModelSummary {
            model_id: model_id.to_string(),
            overall_score,
            evaluator_scores,
            by_category,
            by_scenario,
            tool_metrics,
            success: SuccessStats::new(runs.len() as u32, completed.len() as u32),
            usage: usage.cloned().unwrap_or_default(),
        }
    }

    fn categorize(&self, runs: &[&RunResult]) -> BTreeMap<String, CategoryBreakdown> {
        let mut by_category: BTreeMap<&'static str, Vec<&RunResult>> = BTreeMap::new();
        for run in runs.iter().copied() {
            by_category.entry(run.category.key()).or_default().push(run);
        }

        let mut breakdowns = BTreeMap::new();
        for (key, cat_runs) in by_category {
            let completed: Vec<&RunResult> = cat_runs
                .iter()
                .copied()
                .filter(|r| r.is_completed())
                .collect();

            let score = mean(
                completed
                    .iter()
                    .filter_map(|run| self.weighted_run_score(run)),
            );

            let mut sums: BTreeMap<String, (f64, u32)> = BTreeMap::new();
            for run in &completed {
                for (name, evaluation) in &run.scores {
                    let entry = sums.entry(name.clone()).or_insert((0.0, 0));
                    entry.0 += evaluation.score;
                    entry.1 += 1;
                }
            }
            let evaluator_scores = sums
                .into_iter()
                .map(|(name, (sum, count))| (name, sum / f64::from(count)))
                .collect();

            breakdowns.insert(
                key.to_string(),
                CategoryBreakdown {
                    score,
                    evaluator_scores,
                    success: SuccessStats::new(cat_runs.len() as u32, completed.len() as u32),
                },
            );
        }
        breakdowns
    }

    fn scenario_matrix_row(&self, completed: &[&RunResult]) -> BTreeMap<String, f64> {
        let mut by_scenario: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        for run in completed {
            if let Some(score) = self.weighted_run_score(run) {
                by_scenario
                    .entry(run.scenario_id.clone())
                    .or_default()
                    .push(score);
            }
        }
        by_scenario
            .into_iter()
            .map(|(scenario, scores)| (scenario, mean(scores.into_iter())))
            .collect()
    }

    fn tool_metrics(&self, runs: &[&RunResult], completed: &[&RunResult]) -> ToolUsageMetrics {
        let mut total_calls = 0u64;
        let mut valid_calls = 0u64;
        let mut failed_calls = 0u64;
        let mut latency_sum = 0u64;
        for run in runs {
            for record in run.transcript.tool_invocations() {
                total_calls += 1;
                if record.valid {
                    valid_calls += 1;
                }
                if !record.success {
                    failed_calls += 1;
                }
                latency_sum += record.latency_ms;
            }
        }
        let avg_latency_ms = if total_calls > 0 {
            latency_sum as f64 / total_calls as f64
        } else {
            0.0
        };

        let mut sums: BTreeMap<String, (f64, u32)> = BTreeMap::new();
        for run in completed {
            for (evaluator, evaluation) in &run.scores {
                for (metric, value) in &evaluation.sub_metrics {
                    let entry = sums
                        .entry(format!("{evaluator}.{metric}"))
                        .or_insert((0.0, 0));
                    entry.0 += value;
                    entry.1 += 1;
                }
            }
        }
        let sub_metrics = sums
            .into_iter()
            .map(|(name, (sum, count))| (name, sum / f64::from(count)))
            .collect();

        ToolUsageMetrics {
            total_calls,
            valid_calls,
            failed_calls,
            avg_latency_ms,
            sub_metrics,
        }
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let mut sum = 0.0;
    let mut count = 0u32;
    for value in values {
        sum += value;
        count += 1;
    }
    if count > 0 { sum / f64::from(count) } else { 0.0 }
}
