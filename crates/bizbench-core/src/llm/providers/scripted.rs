//! Deterministic scripted model for tests and offline smoke runs

use crate::llm::messages::{ChatMessage, ModelResponse, TokenUsage};
use crate::llm::model::{LanguageModel, ProviderError};
use crate::llm::usage::{UsageSnapshot, UsageStats};
use crate::tools::ToolSchema;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;

/// One scripted turn of a [`ScriptedModel`]
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    /// A normal model response
    Response(ModelResponse),
    /// A provider-level failure
    Error(ProviderError),
}

/// A model that replays a fixed sequence of responses.
///
/// Once the script is exhausted the fallback response is returned for every
/// further call, which makes the model safe to share across units whose call
/// counts are not known in advance.
pub struct ScriptedModel {
    id: String,
    replies: Mutex<VecDeque<ScriptedReply>>,
    fallback: ModelResponse,
    usage: UsageStats,
}

impl ScriptedModel {
    /// Create a scripted model with an empty script and a plain fallback
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            replies: Mutex::new(VecDeque::new()),
            fallback: ModelResponse::new("Understood."),
            usage: UsageStats::new(),
        }
    }

    /// Append a scripted response
    pub fn with_reply(self, response: ModelResponse) -> Self {
        self.replies.lock().push_back(ScriptedReply::Response(response));
        self
    }

    /// Append a scripted provider failure
    pub fn with_error(self, error: ProviderError) -> Self {
        self.replies.lock().push_back(ScriptedReply::Error(error));
        self
    }

    /// Replace the response returned once the script is exhausted
    pub fn with_fallback(mut self, fallback: ModelResponse) -> Self {
        self.fallback = fallback;
        self
    }

    /// Number of scripted replies not yet consumed
    pub fn remaining(&self) -> usize {
        self.replies.lock().len()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    fn id(&self) -> &str {
        &self.id
    }

    async fn generate_response(
        &self,
        messages: &[ChatMessage],
        _tools: &[ToolSchema],
    ) -> Result<ModelResponse, ProviderError> {
        let reply = self
            .replies
            .lock()
            .pop_front()
            .unwrap_or_else(|| ScriptedReply::Response(self.fallback.clone()));

        match reply {
            ScriptedReply::Response(mut response) => {
                let prompt_tokens: u32 = messages
                    .iter()
                    .map(|m| self.count_tokens(&m.content))
                    .sum();
                let usage =
                    TokenUsage::new(prompt_tokens, self.count_tokens(&response.content));
                self.usage.record_call(Some(&usage), 0);
                response.usage = Some(usage);
                response.model = Some(self.id.clone());
                Ok(response)
            }
            ScriptedReply::Error(error) => {
                self.usage.record_call(None, 0);
                Err(error)
            }
        }
    }

    fn usage(&self) -> UsageSnapshot {
        self.usage.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replays_script_then_fallback() {
        let model = ScriptedModel::new("scripted")
            .with_reply(ModelResponse::new("first"))
            .with_error(ProviderError::Http("connection reset".to_string()));

        let first = model.generate_response(&[], &[]).await.unwrap();
        assert_eq!(first.content, "first");

        let second = model.generate_response(&[], &[]).await;
        assert!(second.is_err());

        let third = model.generate_response(&[], &[]).await.unwrap();
        assert_eq!(third.content, "Understood.");

        assert_eq!(model.usage().api_calls, 3);
    }
}
