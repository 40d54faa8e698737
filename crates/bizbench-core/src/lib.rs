//! Capability contracts and data model for the BizBench benchmark harness.
//!
//! This crate defines the interfaces the orchestration core depends on —
//! [`LanguageModel`], [`BusinessTool`], [`Evaluator`] — together with the
//! conversation, scenario, and configuration types shared by every layer.
//! The scheduling and scoring logic lives in `bizbench-eval`.

pub mod config;
pub mod conversation;
pub mod error;
pub mod evaluator;
pub mod llm;
pub mod scenario;
pub mod tools;

pub use config::{BenchConfig, ExecutionMode, ModelConfig};
pub use conversation::{ConversationState, ToolInvocationRecord};
pub use error::{BenchError, BenchResult};
pub use evaluator::{Evaluation, Evaluator};
pub use llm::{
    ChatMessage, LanguageModel, MessageRole, ModelResponse, ProviderError, TokenUsage,
    UsageSnapshot, UsageStats,
};
pub use scenario::{BusinessScenario, ScenarioCategory, ScenarioLoader, ScriptedTurn};
pub use tools::{BusinessTool, ToolCall, ToolError, ToolMap, ToolResult, ToolSchema};
