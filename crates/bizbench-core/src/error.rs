//! Error types for the BizBench harness

use thiserror::Error;

/// Result type alias for BizBench operations
pub type BenchResult<T> = Result<T, BenchError>;

/// Main error type for the BizBench harness
#[derive(Error, Debug, Clone)]
pub enum BenchError {
    /// Configuration related errors; these are the only pipeline-fatal errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Model provider errors
    #[error("Provider error: {0}")]
    Provider(String),

    /// Tool related errors
    #[error("Tool error: {tool_name}: {message}")]
    Tool { tool_name: String, message: String },

    /// Scenario definition or loading errors
    #[error("Scenario error: {0}")]
    Scenario(String),

    /// Evaluator scoring errors
    #[error("Evaluator error: {evaluator}: {message}")]
    Evaluator { evaluator: String, message: String },

    /// IO errors
    #[error("IO error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// YAML deserialization errors
    #[error("YAML error: {0}")]
    Yaml(String),
}

impl BenchError {
    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a new provider error
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider(message.into())
    }

    /// Create a new tool error
    pub fn tool(tool_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Tool {
            tool_name: tool_name.into(),
            message: message.into(),
        }
    }

    /// Create a new scenario error
    pub fn scenario(message: impl Into<String>) -> Self {
        Self::Scenario(message.into())
    }

    /// Create a new evaluator error
    pub fn evaluator(evaluator: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Evaluator {
            evaluator: evaluator.into(),
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for BenchError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

impl From<serde_json::Error> for BenchError {
    fn from(error: serde_json::Error) -> Self {
        Self::Json(error.to_string())
    }
}

impl From<serde_yaml::Error> for BenchError {
    fn from(error: serde_yaml::Error) -> Self {
        Self::Yaml(error.to_string())
    }
}
