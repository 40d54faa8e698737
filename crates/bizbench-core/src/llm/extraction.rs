//! Pluggable tool-call extraction strategies
//!
//! Providers differ in how tool calls arrive: hosted APIs return structured
//! fields, while locally-hosted models often emit a tagged format inside the
//! generated text. The runner's resolution loop only ever sees the stable
//! [`ToolCall`] shape produced here.

use crate::llm::messages::ModelResponse;
use crate::tools::ToolCall;
use std::collections::HashMap;

/// Strategy for extracting tool-call requests from a model response
pub trait ToolCallExtractor: Send + Sync {
    /// Name of the strategy, for diagnostics
    fn name(&self) -> &str;

    /// Extract tool calls from a response; an empty vec means none
    fn extract(&self, response: &ModelResponse) -> Vec<ToolCall>;
}

/// Extractor for providers that return structured tool-call fields
#[derive(Debug, Default)]
pub struct StructuredExtractor;

impl ToolCallExtractor for StructuredExtractor {
    fn name(&self) -> &str {
        "structured"
    }

    fn extract(&self, response: &ModelResponse) -> Vec<ToolCall> {
        response.tool_calls.clone()
    }
}

/// Extractor that scans generated text for `<tool_call>{json}</tool_call>`
/// blocks, as emitted by locally-hosted models without native tool support.
///
/// Each block is expected to hold a JSON object with `name`, optional `id`,
/// and optional `arguments`. Blocks that fail to parse are skipped rather
/// than surfaced as harness faults.
#[derive(Debug)]
pub struct TaggedTextExtractor {
    open_tag: String,
    close_tag: String,
}

impl TaggedTextExtractor {
    /// Create an extractor for the default `<tool_call>` tags
    pub fn new() -> Self {
        Self {
            open_tag: "<tool_call>".to_string(),
            close_tag: "</tool_call>".to_string(),
        }
    }

    /// Create an extractor for custom tags
    pub fn with_tags(open_tag: impl Into<String>, close_tag: impl Into<String>) -> Self {
        Self {
            open_tag: open_tag.into(),
            close_tag: close_tag.into(),
        }
    }

    fn parse_block(&self, block: &str) -> Option<ToolCall> {
        let value: serde_json::Value = match serde_json::from_str(block.trim()) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(error = %err, "skipping unparseable tool_call block");
                return None;
            }
        };

        let name = value.get("name")?.as_str()?.to_string();
        let id = value
            .get("id")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        let arguments: HashMap<String, serde_json::Value> = match value.get("arguments") {
            None => HashMap::new(),
            Some(serde_json::Value::Object(map)) => {
                map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
            }
            // Some local models double-encode arguments as a JSON string
            Some(serde_json::Value::String(raw)) => match serde_json::from_str(raw) {
                Ok(serde_json::Value::Object(map)) => {
                    map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
                }
                _ => return Some(ToolCall::malformed(id, name, raw.clone())),
            },
            Some(other) => return Some(ToolCall::malformed(id, name, other.to_string())),
        };

        Some(ToolCall::new(id, name, arguments))
    }
}

impl Default for TaggedTextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolCallExtractor for TaggedTextExtractor {
    fn name(&self) -> &str {
        "tagged_text"
    }

    fn extract(&self, response: &ModelResponse) -> Vec<ToolCall> {
        // Structured fields win when the provider supplied them
        if !response.tool_calls.is_empty() {
            return response.tool_calls.clone();
        }

        let mut calls = Vec::new();
        let mut rest = response.content.as_str();
        while let Some(start) = rest.find(&self.open_tag) {
            let after_open = &rest[start + self.open_tag.len()..];
            let Some(end) = after_open.find(&self.close_tag) else {
                break;
            };
            if let Some(call) = self.parse_block(&after_open[..end]) {
                calls.push(call);
            }
            rest = &after_open[end + self.close_tag.len()..];
        }
        calls
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structured_extractor_passes_through() {
        let response = ModelResponse::with_tool_calls(
            "",
            vec![ToolCall::new("call_1", "pricing", HashMap::new())],
        );
        let calls = StructuredExtractor.extract(&response);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name, "pricing");
    }

    #[test]
    fn tagged_extractor_parses_multiple_blocks() {
        let content = concat!(
            "Let me check that for you.\n",
            "<tool_call>{\"name\": \"knowledge_base\", \"arguments\": {\"query\": \"returns\"}}</tool_call>\n",
            "<tool_call>{\"name\": \"pricing\", \"id\": \"c2\", \"arguments\": {\"product\": \"basic\"}}</tool_call>",
        );
        let calls = TaggedTextExtractor::new().extract(&ModelResponse::new(content));

        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].name, "knowledge_base");
        assert!(calls[0].id.is_empty());
        assert_eq!(calls[1].id, "c2");
        assert_eq!(
            calls[1].get_argument::<String>("product").as_deref(),
            Some("basic")
        );
    }

    #[test]
    fn tagged_extractor_skips_garbage_blocks() {
        let content = "<tool_call>not json at all</tool_call> done";
        let calls = TaggedTextExtractor::new().extract(&ModelResponse::new(content));
        assert!(calls.is_empty());
    }

    #[test]
    fn tagged_extractor_flags_double_encoded_garbage_as_malformed() {
        let content =
            "<tool_call>{\"name\": \"pricing\", \"arguments\": \"{broken\"}</tool_call>";
        let calls = TaggedTextExtractor::new().extract(&ModelResponse::new(content));
        assert_eq!(calls.len(), 1);
        assert!(!calls[0].arguments_parsed());
    }
}
