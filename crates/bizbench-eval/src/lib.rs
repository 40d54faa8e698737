//! Evaluation orchestration for the BizBench benchmark harness.
//!
//! The [`runner::ScenarioRunner`] drives one (model, scenario, run-index)
//! unit through its scripted conversation, resolving tool calls per turn.
//! The [`pipeline::EvaluationPipeline`] schedules the full cross-product of
//! units, applies the evaluator set, and reduces everything into a
//! [`metrics::Summary`].

pub mod evaluators;
pub mod metrics;
pub mod pipeline;
pub mod report;
pub mod runner;

pub use metrics::{RunResult, RunStatus, Summary, SummaryAggregator};
pub use pipeline::{EvaluationPipeline, PipelineBuilder, PipelineOutcome};
pub use runner::{RunnerOptions, ScenarioRunner};
