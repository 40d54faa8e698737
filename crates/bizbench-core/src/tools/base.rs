//! The Tool capability contract

use crate::tools::types::ToolSchema;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Error type for tool invocations.
///
/// A tool error is never a harness fault: the runner appends it to the
/// conversation as the tool's result so the model under test is scored on
/// how it recovers.
#[derive(Error, Debug)]
pub enum ToolError {
    /// Arguments were missing or of the wrong shape
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// The tool body could not produce a result
    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    /// Injected failure from the tool's configured error rate
    #[error("Simulated failure: {0}")]
    Simulated(String),
}

/// Capability contract for an external business tool.
///
/// Instances are shared read-only across concurrent units; any mutable
/// internal state (booking ledgers, fault-injection RNGs) must be
/// synchronized by the implementation.
#[async_trait]
pub trait BusinessTool: Send + Sync {
    /// The tool's unique name, matched against tool-call requests
    fn name(&self) -> &str;

    /// Description included in the tool definitions sent to the model
    fn description(&self) -> &str;

    /// JSON schema for the tool's input parameters
    fn schema(&self) -> ToolSchema;

    /// Invoke the tool with parsed arguments
    async fn call(
        &self,
        arguments: &HashMap<String, serde_json::Value>,
    ) -> Result<serde_json::Value, ToolError>;

    /// Probability in [0, 1] that a call is answered with a simulated failure
    fn error_rate(&self) -> f64 {
        0.0
    }
}

/// Mapping of tool name to tool capability, shared across all units
pub type ToolMap = HashMap<String, Arc<dyn BusinessTool>>;

/// Collect the schemas of every tool in a map, sorted by name so the
/// definitions sent to the model are stable across runs
pub fn tool_schemas(tools: &ToolMap) -> Vec<ToolSchema> {
    let mut schemas: Vec<ToolSchema> = tools.values().map(|tool| tool.schema()).collect();
    schemas.sort_by(|a, b| a.name.cmp(&b.name));
    schemas
}
