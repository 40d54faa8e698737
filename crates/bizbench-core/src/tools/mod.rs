//! Tool capability contract and tool-related types

pub mod base;
pub mod types;

pub use base::{tool_schemas, BusinessTool, ToolError, ToolMap};
pub use types::{ToolCall, ToolParameter, ToolResult, ToolSchema};
