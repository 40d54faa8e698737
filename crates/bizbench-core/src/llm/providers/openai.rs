//! OpenAI-compatible chat-completions provider
//!
//! Speaks the `/chat/completions` dialect shared by OpenAI, Azure, OpenRouter,
//! and most self-hosted gateways, which keeps the harness down to a single
//! HTTP client for hosted models.

use crate::llm::messages::{ChatMessage, MessageRole, ModelResponse, TokenUsage};
use crate::llm::model::{LanguageModel, ProviderError};
use crate::llm::usage::{UsageSnapshot, UsageStats};
use crate::tools::{ToolCall, ToolSchema};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// A model under test reached through an OpenAI-compatible endpoint.
///
/// Configuration is immutable after construction; the usage counters are the
/// only mutable state and sit behind atomics so the instance can be shared
/// across concurrent benchmark units.
pub struct OpenAiCompatibleModel {
    id: String,
    model: String,
    base_url: String,
    api_key: String,
    temperature: Option<f64>,
    max_tokens: Option<u32>,
    input_cost_per_million: f64,
    output_cost_per_million: f64,
    request_timeout: Duration,
    http: Client,
    usage: UsageStats,
}

impl OpenAiCompatibleModel {
    /// Create a new client for the given benchmark id and provider model name
    pub fn new(
        id: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ProviderError::Http(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            id: id.into(),
            model: model.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            temperature: None,
            max_tokens: None,
            input_cost_per_million: 0.0,
            output_cost_per_million: 0.0,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            http,
            usage: UsageStats::new(),
        })
    }

    /// Point the client at a non-default endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the sampling temperature
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the completion token limit
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set per-million-token pricing used for cost accounting
    pub fn with_pricing(mut self, input_per_million: f64, output_per_million: f64) -> Self {
        self.input_cost_per_million = input_per_million;
        self.output_cost_per_million = output_per_million;
        self
    }

    /// Set the per-request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    fn serialize_message(message: &ChatMessage) -> Value {
        let mut out = json!({
            "role": message.role.to_string(),
            "content": message.content,
        });

        if let Some(calls) = &message.tool_calls {
            if !calls.is_empty() {
                let calls: Vec<Value> = calls
                    .iter()
                    .map(|call| {
                        json!({
                            "id": call.id,
                            "type": "function",
                            "function": {
                                "name": call.name,
                                "arguments": serde_json::to_string(&call.arguments)
                                    .unwrap_or_else(|_| "{}".to_string()),
                            },
                        })
                    })
                    .collect();
                out["tool_calls"] = Value::Array(calls);
            }
        }

        if message.role == MessageRole::Tool {
            if let Some(call_id) = &message.tool_call_id {
                out["tool_call_id"] = json!(call_id);
            }
            if let Some(name) = &message.name {
                out["name"] = json!(name);
            }
        }

        out
    }

    fn build_request(&self, messages: &[ChatMessage], tools: &[ToolSchema]) -> Value {
        let mut body = json!({
            "model": self.model,
            "messages": messages.iter().map(Self::serialize_message).collect::<Vec<_>>(),
        });

        if !tools.is_empty() {
            let tools: Vec<Value> = tools
                .iter()
                .map(|schema| {
                    json!({
                        "type": "function",
                        "function": {
                            "name": schema.name,
                            "description": schema.description,
                            "parameters": schema.parameters,
                        },
                    })
                })
                .collect();
            body["tools"] = Value::Array(tools);
        }
        if let Some(temperature) = self.temperature {
            body["temperature"] = json!(temperature);
        }
        if let Some(max_tokens) = self.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }

        body
    }

    fn parse_tool_calls(message: &Value) -> Vec<ToolCall> {
        let Some(calls) = message["tool_calls"].as_array() else {
            return Vec::new();
        };

        calls
            .iter()
            .filter_map(|call| {
                let function = call["function"].as_object()?;
                let id = call["id"].as_str().unwrap_or_default().to_string();
                let name = function
                    .get("name")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string();
                let raw = function
                    .get("arguments")
                    .and_then(|v| v.as_str())
                    .unwrap_or("{}");

                match serde_json::from_str::<HashMap<String, Value>>(raw) {
                    Ok(arguments) => Some(ToolCall::new(id, name, arguments)),
                    Err(err) => {
                        // The malformed payload travels with the call so the
                        // runner can synthesize an invalid-arguments result
                        warn!(tool = %name, error = %err, "tool-call arguments failed to parse");
                        Some(ToolCall::malformed(id, name, raw))
                    }
                }
            })
            .collect()
    }

    fn parse_response(&self, body: Value) -> Result<ModelResponse, ProviderError> {
        let choice = body["choices"]
            .as_array()
            .and_then(|choices| choices.first())
            .ok_or_else(|| {
                ProviderError::MalformedResponse("response contains no choices".to_string())
            })?;
        let message = &choice["message"];

        let usage = body["usage"].as_object().map(|usage| {
            TokenUsage::new(
                usage
                    .get("prompt_tokens")
                    .and_then(|v| v.as_u64())
                    .unwrap_or(0) as u32,
                usage
                    .get("completion_tokens")
                    .and_then(|v| v.as_u64())
                    .unwrap_or(0) as u32,
            )
        });

        Ok(ModelResponse {
            content: message["content"].as_str().unwrap_or_default().to_string(),
            tool_calls: Self::parse_tool_calls(message),
            usage,
            model: body["model"].as_str().map(String::from),
            finish_reason: choice["finish_reason"].as_str().map(String::from),
        })
    }

    fn cost_micro_usd(&self, usage: Option<&TokenUsage>) -> u64 {
        let Some(usage) = usage else { return 0 };
        let micro = f64::from(usage.prompt_tokens) * self.input_cost_per_million
            + f64::from(usage.completion_tokens) * self.output_cost_per_million;
        micro.max(0.0) as u64
    }
}

#[async_trait]
impl LanguageModel for OpenAiCompatibleModel {
    fn id(&self) -> &str {
        &self.id
    }

    async fn generate_response(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolSchema],
    ) -> Result<ModelResponse, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let body = self.build_request(messages, tools);

        debug!(model = %self.model, messages = messages.len(), "sending chat completion request");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .timeout(self.request_timeout)
            .json(&body)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    ProviderError::Timeout {
                        seconds: self.request_timeout.as_secs(),
                    }
                } else {
                    ProviderError::Http(err.to_string())
                }
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| ProviderError::Http(err.to_string()))?;

        if !status.is_success() {
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message: text.chars().take(500).collect(),
            });
        }

        let body: Value = serde_json::from_str(&text)
            .map_err(|err| ProviderError::MalformedResponse(err.to_string()))?;
        let parsed = self.parse_response(body)?;

        self.usage
            .record_call(parsed.usage.as_ref(), self.cost_micro_usd(parsed.usage.as_ref()));

        Ok(parsed)
    }

    fn usage(&self) -> UsageSnapshot {
        self.usage.snapshot()
    }
}
