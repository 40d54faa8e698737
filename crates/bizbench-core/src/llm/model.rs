//! The Model capability contract

use crate::llm::messages::{ChatMessage, ModelResponse};
use crate::llm::usage::UsageSnapshot;
use crate::tools::ToolSchema;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured error returned by a model provider.
///
/// Provider failures are data, not faults: the runner checks this result and
/// marks the unit failed instead of unwinding through the pipeline.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum ProviderError {
    /// Transport-level failure (connection refused, TLS, DNS)
    #[error("HTTP error: {0}")]
    Http(String),

    /// The provider answered with a non-success status
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The request did not complete in time
    #[error("Request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// The provider answered 2xx but the body was not understood
    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),
}

/// Capability contract for a conversational model under test.
///
/// One instance per configured model; the same instance is shared across all
/// concurrent units benchmarking that model, so implementations must keep any
/// mutable usage counters behind atomics or a lock (see [`UsageStats`]).
///
/// [`UsageStats`]: crate::llm::usage::UsageStats
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Stable identifier for this model, used to key results and summaries
    fn id(&self) -> &str;

    /// Generate the next assistant response for the given message history.
    ///
    /// `tools` carries the schemas of every tool available in the scenario.
    /// This is the sole potentially slow call per conversation turn.
    async fn generate_response(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolSchema],
    ) -> Result<ModelResponse, ProviderError>;

    /// Estimate the token count of a piece of text.
    ///
    /// The default is the usual four-characters-per-token approximation;
    /// providers with a real tokenizer should override it.
    fn count_tokens(&self, text: &str) -> u32 {
        (text.len() / 4) as u32
    }

    /// Snapshot of accumulated usage (api calls, tokens, cost)
    fn usage(&self) -> UsageSnapshot;
}
