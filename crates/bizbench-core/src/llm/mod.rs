//! Model capability contract, message types, and provider clients

pub mod extraction;
pub mod messages;
pub mod model;
pub mod providers;
pub mod usage;

pub use extraction::{StructuredExtractor, TaggedTextExtractor, ToolCallExtractor};
pub use messages::{ChatMessage, MessageRole, ModelResponse, TokenUsage};
pub use model::{LanguageModel, ProviderError};
pub use usage::{UsageSnapshot, UsageStats};
