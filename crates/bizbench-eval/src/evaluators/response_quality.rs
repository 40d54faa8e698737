//! Ground-truth fact coverage scoring

use bizbench_core::conversation::ConversationState;
use bizbench_core::error::BenchResult;
use bizbench_core::evaluator::{Evaluation, Evaluator};
use bizbench_core::scenario::BusinessScenario;

/// Scores how many of the scenario's expected facts appear in the
/// assistant's responses.
pub struct ResponseQualityEvaluator {
    weight: f64,
}

impl ResponseQualityEvaluator {
    pub fn new() -> Self {
        Self { weight: 1.0 }
    }

    /// Override the default weight
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }
}

impl Default for ResponseQualityEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator for ResponseQualityEvaluator {
    fn name(&self) -> &str {
        "response_quality"
    }

    fn weight(&self) -> f64 {
        self.weight
    }

    fn score(
        &self,
        transcript: &ConversationState,
        scenario: &BusinessScenario,
    ) -> BenchResult<Evaluation> {
        let expected: Vec<&str> = scenario
            .conversation()
            .iter()
            .filter_map(|turn| turn.ground_truth.as_ref())
            .flat_map(|gt| gt.expected_facts.iter().map(String::as_str))
            .collect();

        if expected.is_empty() {
            // Nothing to check against; the other evaluators carry the run
            return Ok(Evaluation::new(10.0).with_sub_metric("facts_expected", 0.0));
        }

        let text = transcript.assistant_text().to_lowercase();
        let found = expected
            .iter()
            .filter(|fact| text.contains(&fact.to_lowercase()))
            .count();
        let coverage = found as f64 / expected.len() as f64;

        Ok(Evaluation::new(10.0 * coverage)
            .with_sub_metric("fact_coverage", coverage)
            .with_sub_metric("facts_found", found as f64)
            .with_sub_metric("facts_expected", expected.len() as f64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bizbench_core::llm::ChatMessage;
    use bizbench_core::scenario::{ScenarioCategory, ScriptedTurn, TurnGroundTruth};

    fn scenario_with_facts(facts: &[&str]) -> BusinessScenario {
        BusinessScenario::new(
            "s1",
            "Facts",
            ScenarioCategory::ProductInquiry,
            vec![
                ScriptedTurn::new("What's the return policy?").with_ground_truth(TurnGroundTruth {
                    expected_facts: facts.iter().map(|f| f.to_string()).collect(),
                    expected_tool: None,
                }),
            ],
        )
    }

    #[test]
    fn partial_coverage_scores_proportionally() {
        let scenario = scenario_with_facts(&["30 days", "original packaging"]);
        let mut transcript = ConversationState::new();
        transcript.push(ChatMessage::user("What's the return policy?"));
        transcript.push(ChatMessage::assistant(
            "You can return items within 30 days of delivery.",
        ));

        let evaluation = ResponseQualityEvaluator::new()
            .score(&transcript, &scenario)
            .unwrap();
        assert!((evaluation.score - 5.0).abs() < 1e-9);
        assert!((evaluation.sub_metrics["fact_coverage"] - 0.5).abs() < 1e-9);
    }

    #[test]
    fn rescoring_is_deterministic() {
        let scenario = scenario_with_facts(&["30 days"]);
        let mut transcript = ConversationState::new();
        transcript.push(ChatMessage::assistant("Returns are accepted for 30 days."));

        let evaluator = ResponseQualityEvaluator::new();
        let first = evaluator.score(&transcript, &scenario).unwrap();
        let second = evaluator.score(&transcript, &scenario).unwrap();
        assert_eq!(first.score, second.score);
    }
}
