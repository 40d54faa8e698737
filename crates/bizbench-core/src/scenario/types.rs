//! Business scenario definitions
//!
//! Scenarios are authored externally, loaded once per benchmark invocation,
//! and read-only thereafter.

use crate::error::{BenchError, BenchResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Category of business scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioCategory {
    /// Customer support conversations
    CustomerSupport,
    /// Sales and quoting conversations
    Sales,
    /// Appointment and calendar conversations
    Scheduling,
    /// Billing and account conversations
    Billing,
    /// Product information conversations
    ProductInquiry,
}

impl ScenarioCategory {
    /// Stable identifier used in summaries and file names
    pub fn key(&self) -> &'static str {
        match self {
            ScenarioCategory::CustomerSupport => "customer_support",
            ScenarioCategory::Sales => "sales",
            ScenarioCategory::Scheduling => "scheduling",
            ScenarioCategory::Billing => "billing",
            ScenarioCategory::ProductInquiry => "product_inquiry",
        }
    }

    /// Display name
    pub fn display_name(&self) -> &'static str {
        match self {
            ScenarioCategory::CustomerSupport => "Customer Support",
            ScenarioCategory::Sales => "Sales",
            ScenarioCategory::Scheduling => "Scheduling",
            ScenarioCategory::Billing => "Billing",
            ScenarioCategory::ProductInquiry => "Product Inquiry",
        }
    }
}

impl std::fmt::Display for ScenarioCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Tool usage the scenario author expects for a turn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpectedToolUse {
    /// Name of the tool that should be called
    pub tool: String,
    /// Argument values the call should contain (subset match)
    #[serde(default)]
    pub arguments: HashMap<String, serde_json::Value>,
}

/// Ground truth for one scripted turn
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TurnGroundTruth {
    /// Facts the assistant response should contain
    #[serde(default)]
    pub expected_facts: Vec<String>,
    /// Tool usage expected for this turn
    #[serde(default)]
    pub expected_tool: Option<ExpectedToolUse>,
}

/// One scripted user turn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptedTurn {
    /// The user message sent to the model
    pub user_message: String,
    /// Optional ground truth for scoring this turn
    #[serde(default)]
    pub ground_truth: Option<TurnGroundTruth>,
}

impl ScriptedTurn {
    /// Create a turn without ground truth
    pub fn new(user_message: impl Into<String>) -> Self {
        Self {
            user_message: user_message.into(),
            ground_truth: None,
        }
    }

    /// Attach ground truth to this turn
    pub fn with_ground_truth(mut self, ground_truth: TurnGroundTruth) -> Self {
        self.ground_truth = Some(ground_truth);
        self
    }
}

fn default_max_turns() -> u32 {
    10
}

/// An immutable scripted business conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessScenario {
    /// Unique identifier
    pub id: String,

    /// Human-readable name
    pub name: String,

    /// Scenario category
    pub category: ScenarioCategory,

    /// Ordered scripted user turns
    pub turns: Vec<ScriptedTurn>,

    /// Upper bound on conversation turns, applied even when the script is longer
    #[serde(default = "default_max_turns")]
    pub max_turns: u32,
}

impl BusinessScenario {
    /// Create a new scenario
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: ScenarioCategory,
        turns: Vec<ScriptedTurn>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category,
            turns,
            max_turns: default_max_turns(),
        }
    }

    /// Override the turn cap
    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns;
        self
    }

    /// The ordered scripted conversation
    pub fn conversation(&self) -> &[ScriptedTurn] {
        &self.turns
    }

    /// Ground truth for a given zero-based turn index
    pub fn turn_ground_truth(&self, turn_index: usize) -> Option<&TurnGroundTruth> {
        self.turns
            .get(turn_index)
            .and_then(|turn| turn.ground_truth.as_ref())
    }

    /// Number of turns the runner will actually drive
    pub fn effective_turns(&self) -> usize {
        self.turns.len().min(self.max_turns as usize)
    }

    /// Validate the scenario definition.
    ///
    /// A scenario with zero scripted turns is a configuration error: the
    /// pipeline reports and skips it rather than crashing mid-benchmark.
    pub fn validate(&self) -> BenchResult<()> {
        if self.id.trim().is_empty() {
            return Err(BenchError::scenario("scenario id must not be empty"));
        }
        if self.turns.is_empty() {
            return Err(BenchError::scenario(format!(
                "scenario '{}' has no scripted turns",
                self.id
            )));
        }
        if self.max_turns == 0 {
            return Err(BenchError::scenario(format!(
                "scenario '{}' has max_turns of zero",
                self.id
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_scenario_fails_validation() {
        let scenario =
            BusinessScenario::new("s1", "Empty", ScenarioCategory::Sales, Vec::new());
        assert!(scenario.validate().is_err());
    }

    #[test]
    fn effective_turns_respects_cap() {
        let turns = (0..6).map(|i| ScriptedTurn::new(format!("turn {i}"))).collect();
        let scenario = BusinessScenario::new("s1", "Long", ScenarioCategory::Sales, turns)
            .with_max_turns(4);
        assert_eq!(scenario.effective_turns(), 4);
    }
}
