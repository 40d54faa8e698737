//! The Evaluator capability contract

use crate::conversation::ConversationState;
use crate::error::BenchResult;
use crate::scenario::BusinessScenario;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Score envelope produced by one evaluator for one transcript
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evaluation {
    /// Overall score on the 0-10 scale
    pub score: f64,
    /// Named sub-metrics; may be empty for evaluators that report none
    #[serde(default)]
    pub sub_metrics: HashMap<String, f64>,
}

impl Evaluation {
    /// Create an evaluation, clamping the score into [0, 10]
    pub fn new(score: f64) -> Self {
        Self {
            score: score.clamp(0.0, 10.0),
            sub_metrics: HashMap::new(),
        }
    }

    /// Attach a named sub-metric
    pub fn with_sub_metric(mut self, name: impl Into<String>, value: f64) -> Self {
        self.sub_metrics.insert(name.into(), value);
        self
    }
}

/// Capability contract for a scoring strategy.
///
/// Evaluators are deterministic, CPU-bound functions of the completed
/// transcript and the scenario's ground truth: re-scoring the same inputs
/// must yield the same result. An evaluator error while scoring one run is
/// recorded as missing for that run, never as a zero.
pub trait Evaluator: Send + Sync {
    /// Unique evaluator name, used to key scores and configured weights
    fn name(&self) -> &str;

    /// Relative weight in the overall score; re-normalized by the aggregator
    fn weight(&self) -> f64 {
        1.0
    }

    /// Score one completed transcript against the scenario's ground truth
    fn score(
        &self,
        transcript: &ConversationState,
        scenario: &BusinessScenario,
    ) -> BenchResult<Evaluation>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_is_clamped_to_scale() {
        assert_eq!(Evaluation::new(12.5).score, 10.0);
        assert_eq!(Evaluation::new(-1.0).score, 0.0);
        assert_eq!(Evaluation::new(7.25).score, 7.25);
    }
}
