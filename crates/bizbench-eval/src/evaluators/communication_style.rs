//! Communication style heuristics

use bizbench_core::conversation::ConversationState;
use bizbench_core::error::BenchResult;
use bizbench_core::evaluator::{Evaluation, Evaluator};
use bizbench_core::llm::MessageRole;
use bizbench_core::scenario::BusinessScenario;

const COURTESY_MARKERS: &[&str] = &["please", "thank", "happy to", "glad to", "welcome"];
const MIN_SUBSTANTIVE_CHARS: usize = 40;
const MAX_REASONABLE_CHARS: usize = 1200;

/// Scores tone and proportion of the assistant's responses.
pub struct CommunicationStyleEvaluator {
    weight: f64,
}

impl CommunicationStyleEvaluator {
    pub fn new() -> Self {
        Self { weight: 1.0 }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }
}

impl Default for CommunicationStyleEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator for CommunicationStyleEvaluator {
    fn name(&self) -> &str {
        "communication_style"
    }

    fn weight(&self) -> f64 {
        self.weight
    }

    fn score(
        &self,
        transcript: &ConversationState,
        _scenario: &BusinessScenario,
    ) -> BenchResult<Evaluation> {
        let responses: Vec<&str> = transcript
            .messages()
            .iter()
            .filter(|m| m.role == MessageRole::Assistant && !m.content.trim().is_empty())
            .map(|m| m.content.as_str())
            .collect();

        if responses.is_empty() {
            return Ok(Evaluation::new(0.0));
        }

        let total = responses.len() as f64;
        let substantive = responses
            .iter()
            .filter(|r| r.len() >= MIN_SUBSTANTIVE_CHARS)
            .count() as f64
            / total;
        let proportionate = responses
            .iter()
            .filter(|r| r.len() <= MAX_REASONABLE_CHARS)
            .count() as f64
            / total;
        let courteous = responses
            .iter()
            .filter(|r| {
                let lower = r.to_lowercase();
                COURTESY_MARKERS.iter().any(|marker| lower.contains(marker))
            })
            .count() as f64
            / total;
        // One courteous message out of two is already good manners
        let courtesy = (courteous * 2.0).min(1.0);

        let avg_chars =
            responses.iter().map(|r| r.len()).sum::<usize>() as f64 / total;

        let score = 10.0 * (0.4 * substantive + 0.3 * proportionate + 0.3 * courtesy);
        Ok(Evaluation::new(score)
            .with_sub_metric("avg_response_chars", avg_chars)
            .with_sub_metric("courtesy_ratio", courteous))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bizbench_core::llm::ChatMessage;
    use bizbench_core::scenario::{ScenarioCategory, ScriptedTurn};

    fn scenario() -> BusinessScenario {
        BusinessScenario::new(
            "s1",
            "Style",
            ScenarioCategory::CustomerSupport,
            vec![ScriptedTurn::new("hi")],
        )
    }

    #[test]
    fn polite_substantive_responses_score_high() {
        let mut transcript = ConversationState::new();
        transcript.push(ChatMessage::assistant(
            "Thank you for reaching out! I'd be happy to help with your order today.",
        ));

        let evaluation = CommunicationStyleEvaluator::new()
            .score(&transcript, &scenario())
            .unwrap();
        assert!(evaluation.score > 9.0);
    }

    #[test]
    fn empty_transcript_scores_zero() {
        let transcript = ConversationState::new();
        let evaluation = CommunicationStyleEvaluator::new()
            .score(&transcript, &scenario())
            .unwrap();
        assert_eq!(evaluation.score, 0.0);
    }
}
