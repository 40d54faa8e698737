//! End-to-end tests driving the pipeline with scripted models and the
//! built-in business tools.

use std::collections::HashMap;
use std::sync::Arc;

use bizbench_core::conversation::ConversationState;
use bizbench_core::error::{BenchError, BenchResult};
use bizbench_core::evaluator::{Evaluation, Evaluator};
use bizbench_core::llm::providers::ScriptedModel;
use bizbench_core::llm::{MessageRole, ModelResponse, ProviderError};
use bizbench_core::scenario::{BusinessScenario, ScenarioCategory, ScriptedTurn};
use bizbench_core::tools::{ToolCall, ToolMap};
use bizbench_core::ExecutionMode;
use bizbench_eval::runner::{RunnerOptions, ScenarioRunner};
use bizbench_eval::{EvaluationPipeline, RunStatus};
use bizbench_tools::default_tools;

struct FixedEvaluator {
    name: &'static str,
    score: f64,
}

impl Evaluator for FixedEvaluator {
    fn name(&self) -> &str {
        self.name
    }
    fn score(
        &self,
        _transcript: &ConversationState,
        _scenario: &BusinessScenario,
    ) -> BenchResult<Evaluation> {
        Ok(Evaluation::new(self.score))
    }
}

struct FailingEvaluator;

impl Evaluator for FailingEvaluator {
    fn name(&self) -> &str {
        "failing"
    }
    fn score(
        &self,
        _transcript: &ConversationState,
        _scenario: &BusinessScenario,
    ) -> BenchResult<Evaluation> {
        Err(BenchError::evaluator("failing", "intentional test failure"))
    }
}

struct PanickingEvaluator;

impl Evaluator for PanickingEvaluator {
    fn name(&self) -> &str {
        "panicking"
    }
    fn score(
        &self,
        _transcript: &ConversationState,
        _scenario: &BusinessScenario,
    ) -> BenchResult<Evaluation> {
        panic!("intentional test panic");
    }
}

fn fixed(name: &'static str, score: f64) -> Arc<dyn Evaluator> {
    Arc::new(FixedEvaluator { name, score })
}

fn two_turn_scenario() -> BusinessScenario {
    BusinessScenario::new(
        "quote-flow",
        "Quote flow",
        ScenarioCategory::Sales,
        vec![
            ScriptedTurn::new("How much are 120 standard widgets?"),
            ScriptedTurn::new("Thanks, please email me the quote."),
        ],
    )
}

fn pricing_call(id: &str, product: &str, quantity: u64) -> ToolCall {
    ToolCall::new(
        id,
        "pricing",
        HashMap::from([
            ("product".to_string(), serde_json::json!(product)),
            ("quantity".to_string(), serde_json::json!(quantity)),
        ]),
    )
}

#[tokio::test]
async fn completed_transcript_pairs_tool_messages_with_calls() {
    let model = ScriptedModel::new("m1")
        .with_reply(ModelResponse::with_tool_calls(
            "Let me look that up.",
            vec![pricing_call("call_a", "standard widget", 120)],
        ))
        .with_reply(ModelResponse::new(
            "120 standard widgets come to 2040 dollars after the volume discount.",
        ))
        .with_reply(ModelResponse::new("Done! The quote is on its way."));

    let scenario = two_turn_scenario();
    let tools = default_tools(0.0, 0);
    let result = ScenarioRunner::new().run(&model, &scenario, &tools, 0).await;

    assert_eq!(result.status, RunStatus::Completed);
    assert!(result.transcript.turns_completed() as usize <= scenario.effective_turns());

    // Every tool-role message must be preceded by an assistant message
    // carrying a matching tool-call id.
    let messages = result.transcript.messages();
    for (index, message) in messages.iter().enumerate() {
        if message.role != MessageRole::Tool {
            continue;
        }
        let call_id = message.tool_call_id.as_deref().unwrap();
        let issued_before = messages[..index].iter().any(|earlier| {
            earlier.role == MessageRole::Assistant
                && earlier
                    .tool_calls
                    .as_ref()
                    .is_some_and(|calls| calls.iter().any(|call| call.id == call_id))
        });
        assert!(issued_before, "tool message {call_id} has no originating call");
    }

    // The pricing tool really ran
    let invocation = &result.transcript.tool_invocations()[0];
    assert!(invocation.valid);
    assert!(invocation.output.as_deref().unwrap().contains("2040"));
}

#[tokio::test]
async fn unknown_tool_typo_is_answered_not_raised() {
    let model = ScriptedModel::new("m1")
        .with_reply(ModelResponse::with_tool_calls(
            "",
            vec![ToolCall::new("call_a", "scheudler", HashMap::new())],
        ))
        .with_reply(ModelResponse::new("Apologies, I could not reach the calendar."))
        .with_reply(ModelResponse::new("Anything else?"));

    let tools = default_tools(0.0, 0); // includes scheduler and knowledge_base
    let result = ScenarioRunner::new()
        .run(&model, &two_turn_scenario(), &tools, 0)
        .await;

    assert_eq!(result.status, RunStatus::Completed);

    let tool_message = result
        .transcript
        .messages()
        .iter()
        .find(|m| m.role == MessageRole::Tool)
        .unwrap();
    assert!(tool_message.content.contains("not found"));

    let record = &result.transcript.tool_invocations()[0];
    assert_eq!(record.tool_name, "scheudler");
    assert!(!record.valid);
}

#[tokio::test]
async fn tool_loop_hits_round_cap_and_aborts() {
    // The fallback response always asks for a nonexistent tool, so the model
    // would loop forever without the round cap.
    let model = ScriptedModel::new("looper").with_fallback(ModelResponse::with_tool_calls(
        "",
        vec![ToolCall::new("", "nonexistent", HashMap::new())],
    ));

    let runner =
        ScenarioRunner::new().with_options(RunnerOptions::new().with_max_tool_rounds(3));
    let result = runner
        .run(&model, &two_turn_scenario(), &ToolMap::new(), 0)
        .await;

    assert_eq!(result.status, RunStatus::Aborted);
    assert!(result.failure.as_deref().unwrap().contains("round cap"));
    assert_eq!(result.transcript.tool_invocations().len(), 3);
}

#[tokio::test]
async fn provider_failure_feeds_success_rate_but_not_scores() {
    // First unit's first call fails at the provider level; the two repeat
    // runs complete normally.
    let model = ScriptedModel::new("flaky")
        .with_error(ProviderError::Api {
            status: 500,
            message: "upstream unavailable".to_string(),
        })
        .with_fallback(ModelResponse::new("Happy to help with that."));

    let scenario = BusinessScenario::new(
        "greeting",
        "Greeting",
        ScenarioCategory::CustomerSupport,
        vec![ScriptedTurn::new("Hello!")],
    );

    let pipeline = EvaluationPipeline::builder()
        .model(Arc::new(model))
        .scenario(scenario)
        .evaluator(fixed("quality", 8.0))
        .runs_per_scenario(3)
        .build()
        .unwrap();

    let outcome = pipeline.run().await.unwrap();
    assert_eq!(outcome.results.len(), 3);

    let failed: Vec<_> = outcome.results.iter().filter(|r| !r.is_completed()).collect();
    assert_eq!(failed.len(), 1);
    assert!(failed[0].failure.as_deref().unwrap().contains("500"));

    let model_summary = &outcome.summary.models["flaky"];
    assert!((model_summary.success.rate - 2.0 / 3.0).abs() < 1e-9);
    // Score mean uses only the two completed runs
    assert!((model_summary.overall_score - 8.0).abs() < 1e-9);
    let category = &model_summary.by_category["customer_support"];
    assert_eq!(category.success.attempted, 3);
    assert_eq!(category.success.completed, 2);
}

#[tokio::test]
async fn parallel_runs_do_not_share_conversation_state() {
    let model = Arc::new(
        ScriptedModel::new("shared").with_fallback(ModelResponse::new("Understood.")),
    );

    let scenario = two_turn_scenario();
    let expected_users: Vec<String> = scenario
        .conversation()
        .iter()
        .map(|turn| turn.user_message.clone())
        .collect();

    let pipeline = EvaluationPipeline::builder()
        .model(model)
        .scenario(scenario)
        .evaluator(fixed("quality", 5.0))
        .runs_per_scenario(8)
        .mode(ExecutionMode::Concurrent { workers: 4 })
        .build()
        .unwrap();

    let outcome = pipeline.run().await.unwrap();
    assert_eq!(outcome.results.len(), 8);

    for result in &outcome.results {
        assert_eq!(result.status, RunStatus::Completed);
        let messages = result.transcript.messages();
        // user + assistant per scripted turn, nothing leaked from siblings
        assert_eq!(messages.len(), 4);
        let users: Vec<&str> = messages
            .iter()
            .filter(|m| m.role == MessageRole::User)
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(users, expected_users.iter().map(String::as_str).collect::<Vec<_>>());
        assert!(messages
            .iter()
            .filter(|m| m.role == MessageRole::Assistant)
            .all(|m| m.content == "Understood."));
    }

    // All eight units share one run-index space per scenario: triples unique
    let mut keys: Vec<_> = outcome.results.iter().map(|r| r.unit_key()).collect();
    keys.sort();
    keys.dedup();
    assert_eq!(keys.len(), 8);
}

#[tokio::test]
async fn evaluator_failures_are_missing_not_zero() {
    let model =
        ScriptedModel::new("m1").with_fallback(ModelResponse::new("Certainly, one moment."));

    let pipeline = EvaluationPipeline::builder()
        .model(Arc::new(model))
        .scenario(two_turn_scenario())
        .evaluator(fixed("quality", 6.0))
        .evaluator(Arc::new(FailingEvaluator))
        .evaluator(Arc::new(PanickingEvaluator))
        .build()
        .unwrap();

    let outcome = pipeline.run().await.unwrap();
    let result = &outcome.results[0];

    assert_eq!(result.status, RunStatus::Completed);
    assert!(result.scores.contains_key("quality"));
    assert!(!result.scores.contains_key("failing"));
    assert!(result.evaluator_failures.contains_key("failing"));
    assert!(result.evaluator_failures.contains_key("panicking"));

    // Missing contributions renormalize: the overall is quality's 6.0,
    // not 6.0 diluted by zeros.
    assert!((outcome.summary.models["m1"].overall_score - 6.0).abs() < 1e-9);
}

#[tokio::test]
async fn zero_turn_scenarios_are_skipped_not_fatal() {
    let pipeline = EvaluationPipeline::builder()
        .model(Arc::new(ScriptedModel::new("m1")))
        .scenario(BusinessScenario::new(
            "empty",
            "Empty",
            ScenarioCategory::Sales,
            Vec::new(),
        ))
        .scenario(two_turn_scenario())
        .evaluator(fixed("quality", 5.0))
        .build()
        .unwrap();

    // Only the valid scenario contributes units
    assert_eq!(pipeline.unit_count(), 1);
}

#[test]
fn builder_rejects_incomplete_configuration() {
    let no_models = EvaluationPipeline::builder()
        .scenario(two_turn_scenario())
        .evaluator(fixed("quality", 5.0))
        .build();
    assert!(matches!(no_models, Err(BenchError::Config(_))));

    let no_evaluators = EvaluationPipeline::builder()
        .model(Arc::new(ScriptedModel::new("m1")))
        .scenario(two_turn_scenario())
        .build();
    assert!(matches!(no_evaluators, Err(BenchError::Config(_))));

    let only_invalid_scenarios = EvaluationPipeline::builder()
        .model(Arc::new(ScriptedModel::new("m1")))
        .scenario(BusinessScenario::new(
            "empty",
            "Empty",
            ScenarioCategory::Sales,
            Vec::new(),
        ))
        .evaluator(fixed("quality", 5.0))
        .build();
    assert!(matches!(only_invalid_scenarios, Err(BenchError::Config(_))));
}
