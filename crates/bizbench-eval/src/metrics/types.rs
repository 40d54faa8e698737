//! Result and summary types
//!
//! A RunResult is produced by the runner for one (model, scenario, run-index)
//! triple; the Summary is the cross-unit aggregation computed once per
//! pipeline invocation.

use bizbench_core::conversation::ConversationState;
use bizbench_core::evaluator::Evaluation;
use bizbench_core::llm::UsageSnapshot;
use bizbench_core::scenario::{BusinessScenario, ScenarioCategory};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

/// Terminal status of one benchmark unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// The scripted conversation ran to completion
    Completed,
    /// A provider error terminated the conversation early
    Failed,
    /// A turn or tool-resolution cap was hit before completion
    Aborted,
}

impl RunStatus {
    /// Check if the unit completed its scripted conversation
    pub fn is_completed(&self) -> bool {
        matches!(self, RunStatus::Completed)
    }
}

/// Result of one benchmark unit.
///
/// Each result belongs to exactly one (model, scenario, run-index) triple,
/// unique within a pipeline invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    /// Unique id for this run
    pub run_id: Uuid,

    /// Model under test
    pub model_id: String,

    /// Scenario that was driven
    pub scenario_id: String,

    /// Scenario display name
    pub scenario_name: String,

    /// Scenario category
    pub category: ScenarioCategory,

    /// Zero-based repeat index
    pub run_index: u32,

    /// Terminal status
    pub status: RunStatus,

    /// Failure detail when status is not `completed`
    pub failure: Option<String>,

    /// The archived conversation, including the tool invocation log
    pub transcript: ConversationState,

    /// Per-evaluator scores, keyed by evaluator name; filled by the pipeline
    #[serde(default)]
    pub scores: HashMap<String, Evaluation>,

    /// Evaluators that failed while scoring this run, with their error detail.
    /// Their contribution is missing, not zero.
    #[serde(default)]
    pub evaluator_failures: HashMap<String, String>,

    /// When the unit started
    pub started_at: DateTime<Utc>,

    /// Wall-clock duration of the unit in milliseconds
    pub duration_ms: u64,
}

impl RunResult {
    /// Create a result shell for a unit about to execute
    pub fn new(model_id: impl Into<String>, scenario: &BusinessScenario, run_index: u32) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            model_id: model_id.into(),
            scenario_id: scenario.id.clone(),
            scenario_name: scenario.name.clone(),
            category: scenario.category,
            run_index,
            status: RunStatus::Completed,
            failure: None,
            transcript: ConversationState::new(),
            scores: HashMap::new(),
            evaluator_failures: HashMap::new(),
            started_at: Utc::now(),
            duration_ms: 0,
        }
    }

    /// Check if the unit completed
    pub fn is_completed(&self) -> bool {
        self.status.is_completed()
    }

    /// The (model, scenario, run-index) triple identifying this unit
    pub fn unit_key(&self) -> (String, String, u32) {
        (
            self.model_id.clone(),
            self.scenario_id.clone(),
            self.run_index,
        )
    }
}

/// Attempted/completed counts with the derived rate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuccessStats {
    /// Units attempted
    pub attempted: u32,
    /// Units that completed their scripted conversation
    pub completed: u32,
    /// completed / attempted
    pub rate: f64,
}

impl SuccessStats {
    /// Create stats from counts
    pub fn new(attempted: u32, completed: u32) -> Self {
        let rate = if attempted > 0 {
            f64::from(completed) / f64::from(attempted)
        } else {
            0.0
        };
        Self {
            attempted,
            completed,
            rate,
        }
    }
}

/// Per-category scores for one model
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryBreakdown {
    /// Weighted overall score within the category
    pub score: f64,
    /// Mean score per evaluator within the category
    pub evaluator_scores: BTreeMap<String, f64>,
    /// Success rate within the category
    pub success: SuccessStats,
}

/// Tool-usage metrics for one model
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolUsageMetrics {
    /// Total tool calls issued across all runs
    pub total_calls: u64,
    /// Calls judged valid (known tool, well-formed required arguments)
    pub valid_calls: u64,
    /// Calls that returned an error result (including simulated failures)
    pub failed_calls: u64,
    /// Mean resolution latency across all calls, milliseconds
    pub avg_latency_ms: f64,
    /// Mean of each named evaluator sub-metric across completed runs,
    /// keyed as "evaluator.metric"
    pub sub_metrics: BTreeMap<String, f64>,
}

/// Aggregated scores for one model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSummary {
    /// Model identifier
    pub model_id: String,
    /// Weight-normalized mean of evaluator scores across completed runs
    pub overall_score: f64,
    /// Mean score per evaluator across completed runs
    pub evaluator_scores: BTreeMap<String, f64>,
    /// Per-category breakdown, keyed by category key
    pub by_category: BTreeMap<String, CategoryBreakdown>,
    /// Per-scenario score matrix row, keyed by scenario id
    pub by_scenario: BTreeMap<String, f64>,
    /// Tool-usage metrics
    pub tool_metrics: ToolUsageMetrics,
    /// Success rate across all of this model's units
    pub success: SuccessStats,
    /// Usage accounting snapshot for this model's shared client
    #[serde(default)]
    pub usage: UsageSnapshot,
}

/// Cross-unit aggregation of one pipeline invocation; never mutated after
/// computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    /// When the summary was computed
    pub generated_at: DateTime<Utc>,
    /// Total units attempted
    pub attempted_runs: u32,
    /// Total units completed
    pub completed_runs: u32,
    /// Per-model summaries, keyed by model id
    pub models: BTreeMap<String, ModelSummary>,
}
