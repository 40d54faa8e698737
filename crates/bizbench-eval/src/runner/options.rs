//! Runner policy knobs

/// Bounds applied to every unit the runner drives.
///
/// Together with a scenario's own `max_turns` these bound worst-case runtime
/// per unit, standing in for explicit cancellation.
#[derive(Debug, Clone, Copy)]
pub struct RunnerOptions {
    /// Cap on model re-invocations with tool results within one scripted
    /// turn; guarantees termination even if a model loops on tool calls
    pub max_tool_rounds: u32,
}

impl RunnerOptions {
    /// Create options with the default bounds
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the tool-resolution round cap
    pub fn with_max_tool_rounds(mut self, max_tool_rounds: u32) -> Self {
        self.max_tool_rounds = max_tool_rounds;
        self
    }
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self { max_tool_rounds: 3 }
    }
}
