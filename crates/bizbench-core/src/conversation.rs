//! Conversation state owned by a single runner execution

use crate::llm::ChatMessage;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Record of one resolved tool-call request.
///
/// Immutable once appended to the conversation's log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInvocationRecord {
    /// Id of the tool call this record resolves
    pub call_id: String,
    /// Requested tool name (which may not exist)
    pub tool_name: String,
    /// Parsed arguments as requested
    pub arguments: HashMap<String, serde_json::Value>,
    /// Whether the invocation produced a result payload
    pub success: bool,
    /// Result payload, when successful
    pub output: Option<String>,
    /// Error detail, when not
    pub error: Option<String>,
    /// Resolution latency in milliseconds
    pub latency_ms: u64,
    /// Whether the call was judged valid: known tool, parsed arguments,
    /// required parameters present
    pub valid: bool,
}

/// The ordered, append-only message history of one benchmark unit.
///
/// Created at the start of a runner execution, mutated only by that runner,
/// and archived into the RunResult at completion. Never shared across
/// parallel executions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationState {
    messages: Vec<ChatMessage>,
    turns_completed: u32,
    tool_log: Vec<ToolInvocationRecord>,
}

impl ConversationState {
    /// Create an empty conversation
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message
    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Record a resolved tool invocation
    pub fn record_invocation(&mut self, record: ToolInvocationRecord) {
        self.tool_log.push(record);
    }

    /// Mark one scripted turn as completed
    pub fn complete_turn(&mut self) {
        self.turns_completed += 1;
    }

    /// The full ordered message history
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Number of scripted turns completed
    pub fn turns_completed(&self) -> u32 {
        self.turns_completed
    }

    /// The log of tool invocations issued during the run
    pub fn tool_invocations(&self) -> &[ToolInvocationRecord] {
        &self.tool_log
    }

    /// Concatenated content of all assistant messages
    pub fn assistant_text(&self) -> String {
        self.messages
            .iter()
            .filter(|m| m.role == crate::llm::MessageRole::Assistant)
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_turns_and_invocations() {
        let mut state = ConversationState::new();
        state.push(ChatMessage::user("hello"));
        state.push(ChatMessage::assistant("hi there"));
        state.complete_turn();
        state.record_invocation(ToolInvocationRecord {
            call_id: "call_0".to_string(),
            tool_name: "pricing".to_string(),
            arguments: HashMap::new(),
            success: true,
            output: Some("{}".to_string()),
            error: None,
            latency_ms: 3,
            valid: true,
        });

        assert_eq!(state.messages().len(), 2);
        assert_eq!(state.turns_completed(), 1);
        assert_eq!(state.tool_invocations().len(), 1);
        assert_eq!(state.assistant_text(), "hi there");
    }
}
