//! Tool-usage scoring against expected tool calls

use bizbench_core::conversation::ConversationState;
use bizbench_core::error::BenchResult;
use bizbench_core::evaluator::{Evaluation, Evaluator};
use bizbench_core::scenario::{BusinessScenario, ExpectedToolUse};

/// Scores whether the model called the tools the scenario expected, with
/// the arguments the scenario expected, and whether its calls were valid.
pub struct ToolUsageEvaluator {
    weight: f64,
}

impl ToolUsageEvaluator {
    pub fn new() -> Self {
        Self { weight: 1.0 }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Whether some call to the expected tool carries all expected argument
    /// values (subset match)
    fn arguments_satisfied(transcript: &ConversationState, expected: &ExpectedToolUse) -> bool {
        transcript
            .tool_invocations()
            .iter()
            .filter(|record| record.tool_name == expected.tool)
            .any(|record| {
                expected
                    .arguments
                    .iter()
                    .all(|(key, value)| record.arguments.get(key) == Some(value))
            })
    }
}

impl Default for ToolUsageEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator for ToolUsageEvaluator {
    fn name(&self) -> &str {
        "tool_usage"
    }

    fn weight(&self) -> f64 {
        self.weight
    }

    fn score(
        &self,
        transcript: &ConversationState,
        scenario: &BusinessScenario,
    ) -> BenchResult<Evaluation> {
        let expected: Vec<&ExpectedToolUse> = scenario
            .conversation()
            .iter()
            .filter_map(|turn| turn.ground_truth.as_ref())
            .filter_map(|gt| gt.expected_tool.as_ref())
            .collect();

        let selection = if expected.is_empty() {
            1.0
        } else {
            let matched = expected
                .iter()
                .filter(|exp| {
                    transcript
                        .tool_invocations()
                        .iter()
                        .any(|record| record.tool_name == exp.tool)
                })
                .count();
            matched as f64 / expected.len() as f64
        };

        let with_arguments: Vec<&&ExpectedToolUse> = expected
            .iter()
            .filter(|exp| !exp.arguments.is_empty())
            .collect();
        let parameter_quality = if with_arguments.is_empty() {
            1.0
        } else {
            let satisfied = with_arguments
                .iter()
                .filter(|exp| Self::arguments_satisfied(transcript, exp))
                .count();
            satisfied as f64 / with_arguments.len() as f64
        };

        let calls = transcript.tool_invocations();
        let validity = if calls.is_empty() {
            1.0
        } else {
            calls.iter().filter(|record| record.valid).count() as f64 / calls.len() as f64
        };

        let score = 10.0 * (0.5 * selection + 0.3 * parameter_quality + 0.2 * validity);
        Ok(Evaluation::new(score)
            .with_sub_metric("tool_selection", selection)
            .with_sub_metric("parameter_quality", parameter_quality)
            .with_sub_metric("call_validity", validity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bizbench_core::conversation::ToolInvocationRecord;
    use bizbench_core::scenario::{ScenarioCategory, ScriptedTurn, TurnGroundTruth};
    use std::collections::HashMap;

    fn scenario_expecting_pricing() -> BusinessScenario {
        BusinessScenario::new(
            "s1",
            "Quote",
            ScenarioCategory::Sales,
            vec![ScriptedTurn::new("Quote me 10 widgets").with_ground_truth(
                TurnGroundTruth {
                    expected_facts: vec![],
                    expected_tool: Some(ExpectedToolUse {
                        tool: "pricing".to_string(),
                        arguments: HashMap::from([(
                            "product".to_string(),
                            serde_json::json!("widget"),
                        )]),
                    }),
                },
            )],
        )
    }

    fn invocation(tool: &str, arguments: HashMap<String, serde_json::Value>, valid: bool) -> ToolInvocationRecord {
        ToolInvocationRecord {
            call_id: "call_0".to_string(),
            tool_name: tool.to_string(),
            arguments,
            success: true,
            output: Some("{}".to_string()),
            error: None,
            latency_ms: 1,
            valid,
        }
    }

    #[test]
    fn exact_expected_usage_scores_full() {
        let mut transcript = ConversationState::new();
        transcript.record_invocation(invocation(
            "pricing",
            HashMap::from([("product".to_string(), serde_json::json!("widget"))]),
            true,
        ));

        let evaluation = ToolUsageEvaluator::new()
            .score(&transcript, &scenario_expecting_pricing())
            .unwrap();
        assert!((evaluation.score - 10.0).abs() < 1e-9);
        assert_eq!(evaluation.sub_metrics["tool_selection"], 1.0);
    }

    #[test]
    fn missing_expected_tool_loses_selection_and_parameters() {
        let transcript = ConversationState::new();
        let evaluation = ToolUsageEvaluator::new()
            .score(&transcript, &scenario_expecting_pricing())
            .unwrap();
        // validity stays 1.0 with no calls; selection and parameters drop out
        assert!((evaluation.score - 2.0).abs() < 1e-9);
    }

    #[test]
    fn wrong_arguments_lose_parameter_quality() {
        let mut transcript = ConversationState::new();
        transcript.record_invocation(invocation(
            "pricing",
            HashMap::from([("product".to_string(), serde_json::json!("gadget"))]),
            true,
        ));

        let evaluation = ToolUsageEvaluator::new()
            .score(&transcript, &scenario_expecting_pricing())
            .unwrap();
        assert_eq!(evaluation.sub_metrics["tool_selection"], 1.0);
        assert_eq!(evaluation.sub_metrics["parameter_quality"], 0.0);
    }
}
