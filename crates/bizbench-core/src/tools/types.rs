//! Tool-related type definitions

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A tool-call request emitted by a model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Identifier for this tool call; may be empty if the provider omitted
    /// one, in which case the runner synthesizes a stable ordinal id
    pub id: String,
    /// Name of the tool to call
    pub name: String,
    /// Parsed arguments
    pub arguments: HashMap<String, serde_json::Value>,
    /// The unparsed argument payload, kept when structured parsing failed.
    /// A call with `raw_arguments` set must not reach a tool body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_arguments: Option<String>,
}

impl ToolCall {
    /// Create a new tool call with parsed arguments
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: HashMap<String, serde_json::Value>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
            raw_arguments: None,
        }
    }

    /// Create a tool call whose argument payload could not be parsed
    pub fn malformed(
        id: impl Into<String>,
        name: impl Into<String>,
        raw_arguments: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: HashMap::new(),
            raw_arguments: Some(raw_arguments.into()),
        }
    }

    /// Whether the argument payload parsed into structured form
    pub fn arguments_parsed(&self) -> bool {
        self.raw_arguments.is_none()
    }

    /// Get a typed argument value
    pub fn get_argument<T>(&self, key: &str) -> Option<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        self.arguments
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }
}

/// Result of resolving one tool call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Tool call ID this result corresponds to
    pub call_id: String,
    /// Name of the tool that was invoked (or requested, for unknown tools)
    pub tool_name: String,
    /// Whether the invocation produced a result payload
    pub success: bool,
    /// Result payload (if successful)
    pub output: Option<String>,
    /// Error message (if failed)
    pub error: Option<String>,
    /// Invocation latency in milliseconds
    pub latency_ms: Option<u64>,
}

impl ToolResult {
    /// Create a successful tool result
    pub fn success(
        call_id: impl Into<String>,
        tool_name: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        Self {
            call_id: call_id.into(),
            tool_name: tool_name.into(),
            success: true,
            output: Some(output.into()),
            error: None,
            latency_ms: None,
        }
    }

    /// Create a failed tool result
    pub fn error(
        call_id: impl Into<String>,
        tool_name: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            call_id: call_id.into(),
            tool_name: tool_name.into(),
            success: false,
            output: None,
            error: Some(error.into()),
            latency_ms: None,
        }
    }

    /// Add invocation latency
    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = Some(latency_ms);
        self
    }

    /// Render this result as the content of a tool-role message
    pub fn to_message_content(&self) -> String {
        if self.success {
            self.output.clone().unwrap_or_default()
        } else {
            serde_json::json!({
                "error": self.error.clone().unwrap_or_default(),
            })
            .to_string()
        }
    }
}

/// Parameter definition for a tool schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolParameter {
    /// Parameter name
    pub name: String,
    /// Parameter description
    pub description: String,
    /// Parameter type (string, number, boolean)
    pub param_type: String,
    /// Whether this parameter is required
    pub required: bool,
    /// Default value (if any)
    pub default: Option<serde_json::Value>,
}

impl ToolParameter {
    /// Create a required string parameter
    pub fn string(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            param_type: "string".to_string(),
            required: true,
            default: None,
        }
    }

    /// Create a required number parameter
    pub fn number(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            param_type: "number".to_string(),
            required: true,
            default: None,
        }
    }

    /// Create a required boolean parameter
    pub fn boolean(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            param_type: "boolean".to_string(),
            required: true,
            default: None,
        }
    }

    /// Make parameter optional
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Set default value
    pub fn with_default<V: Into<serde_json::Value>>(mut self, default: V) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// JSON schema describing a tool to the model under test
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSchema {
    /// Tool name
    pub name: String,
    /// Tool description
    pub description: String,
    /// Input parameters schema (JSON Schema object)
    pub parameters: serde_json::Value,
}

impl ToolSchema {
    /// Build a schema from a parameter list
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Vec<ToolParameter>,
    ) -> Self {
        let mut properties = serde_json::Map::new();
        let mut required = Vec::new();

        for param in parameters {
            if param.required {
                required.push(param.name.clone());
            }

            let mut param_schema = serde_json::Map::new();
            param_schema.insert("type".to_string(), param.param_type.into());
            param_schema.insert("description".to_string(), param.description.into());

            if let Some(default) = param.default {
                param_schema.insert("default".to_string(), default);
            }

            properties.insert(param.name, param_schema.into());
        }

        let parameters_schema = serde_json::json!({
            "type": "object",
            "properties": properties,
            "required": required
        });

        Self {
            name: name.into(),
            description: description.into(),
            parameters: parameters_schema,
        }
    }

    /// Names of the required parameters declared in this schema
    pub fn required_params(&self) -> Vec<String> {
        self.parameters
            .get("required")
            .and_then(|v| v.as_array())
            .map(|names| {
                names
                    .iter()
                    .filter_map(|n| n.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_collects_required_params() {
        let schema = ToolSchema::new(
            "pricing",
            "Compute a quote",
            vec![
                ToolParameter::string("product", "Product name"),
                ToolParameter::number("quantity", "Units requested").optional(),
            ],
        );

        assert_eq!(schema.required_params(), vec!["product".to_string()]);
    }

    #[test]
    fn malformed_call_keeps_raw_payload() {
        let call = ToolCall::malformed("call_0", "pricing", "{not json");
        assert!(!call.arguments_parsed());
        assert!(call.arguments.is_empty());
    }
}
