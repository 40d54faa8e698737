//! Latency and efficiency scoring

use bizbench_core::conversation::ConversationState;
use bizbench_core::error::BenchResult;
use bizbench_core::evaluator::{Evaluation, Evaluator};
use bizbench_core::scenario::BusinessScenario;

/// Tool latency above which the latency component bottoms out
const LATENCY_FLOOR_MS: f64 = 2000.0;
/// Tool calls per turn considered reasonable before efficiency decays
const REASONABLE_CALLS_PER_TURN: f64 = 2.0;

/// Scores responsiveness: tool resolution latency and how many tool calls
/// the model needed per scripted turn.
pub struct PerformanceEvaluator {
    weight: f64,
}

impl PerformanceEvaluator {
    pub fn new() -> Self {
        Self { weight: 1.0 }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }
}

impl Default for PerformanceEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator for PerformanceEvaluator {
    fn name(&self) -> &str {
        "performance"
    }

    fn weight(&self) -> f64 {
        self.weight
    }

    fn score(
        &self,
        transcript: &ConversationState,
        _scenario: &BusinessScenario,
    ) -> BenchResult<Evaluation> {
        let invocations = transcript.tool_invocations();

        let avg_latency_ms = if invocations.is_empty() {
            0.0
        } else {
            invocations.iter().map(|r| r.latency_ms).sum::<u64>() as f64
                / invocations.len() as f64
        };
        let latency_component = 1.0 - (avg_latency_ms / LATENCY_FLOOR_MS).min(1.0);

        let turns = f64::from(transcript.turns_completed().max(1));
        let calls_per_turn = invocations.len() as f64 / turns;
        let efficiency_component = if calls_per_turn <= REASONABLE_CALLS_PER_TURN {
            1.0
        } else {
            (1.0 - (calls_per_turn - REASONABLE_CALLS_PER_TURN) / 4.0).max(0.0)
        };

        let score = 10.0 * (0.6 * latency_component + 0.4 * efficiency_component);
        Ok(Evaluation::new(score)
            .with_sub_metric("avg_tool_latency_ms", avg_latency_ms)
            .with_sub_metric("tool_calls_per_turn", calls_per_turn))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bizbench_core::conversation::ToolInvocationRecord;
    use bizbench_core::scenario::{ScenarioCategory, ScriptedTurn};
    use std::collections::HashMap;

    fn scenario() -> BusinessScenario {
        BusinessScenario::new(
            "s1",
            "Perf",
            ScenarioCategory::Sales,
            vec![ScriptedTurn::new("hi")],
        )
    }

    fn invocation(latency_ms: u64) -> ToolInvocationRecord {
        ToolInvocationRecord {
            call_id: "call_0".to_string(),
            tool_name: "pricing".to_string(),
            arguments: HashMap::new(),
            success: true,
            output: Some("{}".to_string()),
            error: None,
            latency_ms,
            valid: true,
        }
    }

    #[test]
    fn no_tool_calls_scores_full() {
        let mut transcript = ConversationState::new();
        transcript.complete_turn();
        let evaluation = PerformanceEvaluator::new()
            .score(&transcript, &scenario())
            .unwrap();
        assert!((evaluation.score - 10.0).abs() < 1e-9);
    }

    #[test]
    fn slow_tools_lower_the_score() {
        let mut transcript = ConversationState::new();
        transcript.complete_turn();
        transcript.record_invocation(invocation(2000));

        let evaluation = PerformanceEvaluator::new()
            .score(&transcript, &scenario())
            .unwrap();
        // Latency component bottoms out; efficiency stays full
        assert!((evaluation.score - 4.0).abs() < 1e-9);
    }
}
