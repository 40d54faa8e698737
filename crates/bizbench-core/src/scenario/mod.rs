//! Scenario data model and loading

pub mod loader;
pub mod types;

pub use loader::ScenarioLoader;
pub use types::{
    BusinessScenario, ExpectedToolUse, ScenarioCategory, ScriptedTurn, TurnGroundTruth,
};
