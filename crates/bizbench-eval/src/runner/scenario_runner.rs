//! The conversation-turn state machine
//!
//! Drives one (model, scenario, run-index) unit through its scripted
//! conversation, resolving tool-call requests as they occur, and produces a
//! RunResult. The runner owns the unit's ConversationState for the whole
//! execution; nothing is shared with sibling units.

use std::sync::Arc;
use std::time::Instant;

use bizbench_core::conversation::{ConversationState, ToolInvocationRecord};
use bizbench_core::llm::{
    ChatMessage, LanguageModel, StructuredExtractor, ToolCallExtractor,
};
use bizbench_core::scenario::BusinessScenario;
use bizbench_core::tools::{tool_schemas, ToolCall, ToolMap, ToolResult};
use tracing::{debug, info, warn};

use super::options::RunnerOptions;
use crate::metrics::{RunResult, RunStatus};

/// Executes one scripted conversation against one model
pub struct ScenarioRunner {
    options: RunnerOptions,
    extractor: Arc<dyn ToolCallExtractor>,
}

impl ScenarioRunner {
    /// Create a runner with default options and structured extraction
    pub fn new() -> Self {
        Self {
            options: RunnerOptions::default(),
            extractor: Arc::new(StructuredExtractor),
        }
    }

    /// Override the runner options
    pub fn with_options(mut self, options: RunnerOptions) -> Self {
        self.options = options;
        self
    }

    /// Override the tool-call extraction strategy
    pub fn with_extractor(mut self, extractor: Arc<dyn ToolCallExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Drive one unit to its terminal status.
    ///
    /// Provider errors terminate the conversation early with status `failed`;
    /// hitting the turn or round caps before the script completes yields
    /// `aborted`. Tool-level problems never fail the unit: they are
    /// synthesized into the conversation as tool-error messages so the model
    /// under test is scored on its recovery.
    pub async fn run(
        &self,
        model: &dyn LanguageModel,
        scenario: &BusinessScenario,
        tools: &ToolMap,
        run_index: u32,
    ) -> RunResult {
        let started = Instant::now();
        let mut result = RunResult::new(model.id(), scenario, run_index);

        if let Err(err) = scenario.validate() {
            warn!(scenario = %scenario.id, error = %err, "refusing to run invalid scenario");
            result.status = RunStatus::Failed;
            result.failure = Some(err.to_string());
            result.duration_ms = started.elapsed().as_millis() as u64;
            return result;
        }

        let schemas = tool_schemas(tools);
        let mut state = ConversationState::new();
        // Ordinal source for synthesized ids when a model omits them
        let mut call_counter: usize = 0;

        debug!(
            model = %model.id(),
            scenario = %scenario.id,
            run_index,
            turns = scenario.effective_turns(),
            "starting unit"
        );

        'turns: for turn in scenario.conversation().iter().take(scenario.effective_turns()) {
            state.push(ChatMessage::user(&turn.user_message));

            let mut rounds = 0u32;
            loop {
                let response = match model.generate_response(state.messages(), &schemas).await {
                    Ok(response) => response,
                    Err(err) => {
                        // Provider failure ends this unit; no in-turn retry,
                        // and siblings are unaffected.
                        warn!(model = %model.id(), scenario = %scenario.id, error = %err,
                            "provider error terminated unit");
                        result.status = RunStatus::Failed;
                        result.failure = Some(err.to_string());
                        break 'turns;
                    }
                };

                let mut calls = self.extractor.extract(&response);
                for call in &mut calls {
                    if call.id.trim().is_empty() {
                        call.id = format!("call_{call_counter}");
                    }
                    call_counter += 1;
                }

                if calls.is_empty() {
                    state.push(ChatMessage::assistant(response.content));
                    break;
                }

                state.push(ChatMessage::assistant_with_tools(
                    response.content,
                    calls.clone(),
                ));

                for call in &calls {
                    let (message, record) = resolve_call(call, tools).await;
                    state.record_invocation(record);
                    state.push(message);
                }

                rounds += 1;
                if rounds >= self.options.max_tool_rounds {
                    info!(
                        model = %model.id(),
                        scenario = %scenario.id,
                        rounds,
                        "tool-resolution round cap reached"
                    );
                    result.status = RunStatus::Aborted;
                    result.failure = Some(format!(
                        "tool-resolution round cap ({}) reached on turn {}",
                        self.options.max_tool_rounds,
                        state.turns_completed() + 1
                    ));
                    break 'turns;
                }
                // Loop: re-invoke the model with the tool results appended
            }

            state.complete_turn();
        }

        result.transcript = state;
        result.duration_ms = started.elapsed().as_millis() as u64;
        result
    }
}

impl Default for ScenarioRunner {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve one tool-call request into a tool-role message and a log record.
///
/// Unknown tools and malformed arguments never reach a tool body; they are
/// answered with synthesized error results. A tool's own failure (simulated
/// or real) is appended as its result content, exactly as a production tool
/// failure would be.
async fn resolve_call(call: &ToolCall, tools: &ToolMap) -> (ChatMessage, ToolInvocationRecord) {
    let started = Instant::now();

    let (tool_result, valid) = match tools.get(&call.name) {
        None => (
            ToolResult::error(
                &call.id,
                &call.name,
                format!("tool '{}' not found", call.name),
            ),
            false,
        ),
        Some(_) if !call.arguments_parsed() => (
            ToolResult::error(
                &call.id,
                &call.name,
                "invalid arguments: payload is not a JSON object",
            ),
            false,
        ),
        Some(tool) => {
            let missing: Vec<String> = tool
                .schema()
                .required_params()
                .into_iter()
                .filter(|param| !call.arguments.contains_key(param))
                .collect();

            if !missing.is_empty() {
                (
                    ToolResult::error(
                        &call.id,
                        &call.name,
                        format!(
                            "invalid arguments: missing required parameter(s): {}",
                            missing.join(", ")
                        ),
                    ),
                    false,
                )
            } else {
                match tool.call(&call.arguments).await {
                    Ok(value) => (
                        ToolResult::success(&call.id, &call.name, value.to_string()),
                        true,
                    ),
                    Err(err) => (
                        ToolResult::error(&call.id, &call.name, err.to_string()),
                        true,
                    ),
                }
            }
        }
    };

    let latency_ms = started.elapsed().as_millis() as u64;
    let tool_result = tool_result.with_latency(latency_ms);

    let record = ToolInvocationRecord {
        call_id: call.id.clone(),
        tool_name: call.name.clone(),
        arguments: call.arguments.clone(),
        success: tool_result.success,
        output: tool_result.output.clone(),
        error: tool_result.error.clone(),
        latency_ms,
        valid,
    };

    let message = ChatMessage::tool(tool_result.to_message_content(), &call.id, &call.name);
    (message, record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bizbench_core::llm::providers::ScriptedModel;
    use bizbench_core::llm::ModelResponse;
    use bizbench_core::scenario::{ScenarioCategory, ScriptedTurn};
    use std::collections::HashMap;

    fn one_turn_scenario() -> BusinessScenario {
        BusinessScenario::new(
            "s1",
            "One turn",
            ScenarioCategory::Sales,
            vec![ScriptedTurn::new("How much is a widget?")],
        )
    }

    #[tokio::test]
    async fn synthesizes_ordinal_ids_for_anonymous_calls() {
        let model = ScriptedModel::new("m1")
            .with_reply(ModelResponse::with_tool_calls(
                "",
                vec![
                    ToolCall::new("", "missing_tool", HashMap::new()),
                    ToolCall::new("", "missing_tool", HashMap::new()),
                ],
            ))
            .with_reply(ModelResponse::new("No tool available, sorry."));

        let result = ScenarioRunner::new()
            .run(&model, &one_turn_scenario(), &ToolMap::new(), 0)
            .await;

        assert_eq!(result.status, RunStatus::Completed);
        let records = result.transcript.tool_invocations();
        assert_eq!(records[0].call_id, "call_0");
        assert_eq!(records[1].call_id, "call_1");
    }

    #[tokio::test]
    async fn malformed_arguments_never_reach_the_tool() {
        use async_trait::async_trait;
        use bizbench_core::tools::{BusinessTool, ToolError, ToolSchema};
        use std::sync::atomic::{AtomicU32, Ordering};
        use std::sync::Arc;

        #[derive(Default)]
        struct CountingTool {
            calls: AtomicU32,
        }

        #[async_trait]
        impl BusinessTool for CountingTool {
            fn name(&self) -> &str {
                "pricing"
            }
            fn description(&self) -> &str {
                "test"
            }
            fn schema(&self) -> ToolSchema {
                ToolSchema::new("pricing", "test", vec![])
            }
            async fn call(
                &self,
                _arguments: &HashMap<String, serde_json::Value>,
            ) -> Result<serde_json::Value, ToolError> {
                self.calls.fetch_add(1, Ordering::SeqCst);
                Ok(serde_json::json!({}))
            }
        }

        let counting = Arc::new(CountingTool::default());
        let mut tools = ToolMap::new();
        tools.insert("pricing".to_string(), counting.clone());

        let model = ScriptedModel::new("m1")
            .with_reply(ModelResponse::with_tool_calls(
                "",
                vec![ToolCall::malformed("c1", "pricing", "{broken")],
            ))
            .with_reply(ModelResponse::new("Something went wrong with the lookup."));

        let result = ScenarioRunner::new()
            .run(&model, &one_turn_scenario(), &tools, 0)
            .await;

        assert_eq!(result.status, RunStatus::Completed);
        assert_eq!(counting.calls.load(Ordering::SeqCst), 0);
        let record = &result.transcript.tool_invocations()[0];
        assert!(!record.valid);
        assert!(record.error.as_deref().unwrap().contains("invalid arguments"));
    }
}
