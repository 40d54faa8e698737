//! Scenario loading from files and the built-in set

use crate::error::{BenchError, BenchResult};
use crate::scenario::types::{
    BusinessScenario, ExpectedToolUse, ScenarioCategory, ScriptedTurn, TurnGroundTruth,
};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Loader for benchmark scenarios
pub struct ScenarioLoader;

impl ScenarioLoader {
    /// Load one scenario from a JSON or YAML file
    pub fn load_file(path: &Path) -> BenchResult<BusinessScenario> {
        let content = std::fs::read_to_string(path)?;
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();

        let scenario: BusinessScenario = match extension {
            "json" => serde_json::from_str(&content)?,
            "yaml" | "yml" => serde_yaml::from_str(&content)?,
            other => {
                return Err(BenchError::scenario(format!(
                    "unsupported scenario file extension '{other}' for {}",
                    path.display()
                )));
            }
        };

        scenario.validate()?;
        Ok(scenario)
    }

    /// Load every scenario file in a directory, sorted by file name
    pub fn load_dir(dir: &Path) -> BenchResult<Vec<BusinessScenario>> {
        let mut paths: Vec<_> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                matches!(
                    path.extension().and_then(|ext| ext.to_str()),
                    Some("json") | Some("yaml") | Some("yml")
                )
            })
            .collect();
        paths.sort();

        let mut scenarios = Vec::with_capacity(paths.len());
        for path in paths {
            debug!(path = %path.display(), "loading scenario");
            scenarios.push(Self::load_file(&path)?);
        }
        Ok(scenarios)
    }

    /// The built-in scenario set, used when no scenario directory is configured
    pub fn builtin() -> Vec<BusinessScenario> {
        vec![
            Self::product_inquiry(),
            Self::pricing_quote(),
            Self::appointment_booking(),
        ]
    }

    fn product_inquiry() -> BusinessScenario {
        BusinessScenario::new(
            "retail-product-inquiry",
            "Retail product inquiry",
            ScenarioCategory::ProductInquiry,
            vec![
                ScriptedTurn::new("Hi, what's your return policy for online orders?")
                    .with_ground_truth(TurnGroundTruth {
                        expected_facts: vec![
                            "30 days".to_string(),
                            "original packaging".to_string(),
                        ],
                        expected_tool: Some(ExpectedToolUse {
                            tool: "knowledge_base".to_string(),
                            arguments: HashMap::new(),
                        }),
                    }),
                ScriptedTurn::new("Thanks. Do you ship internationally, and how long does it take?")
                    .with_ground_truth(TurnGroundTruth {
                        expected_facts: vec![
                            "international".to_string(),
                            "15 business days".to_string(),
                        ],
                        expected_tool: Some(ExpectedToolUse {
                            tool: "knowledge_base".to_string(),
                            arguments: HashMap::new(),
                        }),
                    }),
            ],
        )
    }

    fn pricing_quote() -> BusinessScenario {
        BusinessScenario::new(
            "widget-volume-quote",
            "Volume pricing quote",
            ScenarioCategory::Sales,
            vec![
                ScriptedTurn::new(
                    "How much would 120 units of the standard widget cost with any volume discount?",
                )
                .with_ground_truth(TurnGroundTruth {
                    expected_facts: vec!["2040".to_string()],
                    expected_tool: Some(ExpectedToolUse {
                        tool: "pricing".to_string(),
                        arguments: HashMap::from([(
                            "product".to_string(),
                            serde_json::json!("standard widget"),
                        )]),
                    }),
                }),
                ScriptedTurn::new("And what would just 10 units come to?").with_ground_truth(
                    TurnGroundTruth {
                        expected_facts: vec!["190".to_string()],
                        expected_tool: Some(ExpectedToolUse {
                            tool: "pricing".to_string(),
                            arguments: HashMap::from([(
                                "product".to_string(),
                                serde_json::json!("standard widget"),
                            )]),
                        }),
                    },
                ),
            ],
        )
    }

    fn appointment_booking() -> BusinessScenario {
        BusinessScenario::new(
            "consultation-booking",
            "Consultation booking",
            ScenarioCategory::Scheduling,
            vec![
                ScriptedTurn::new(
                    "I'd like to book a consultation on 2026-03-10 at 14:00. My name is Dana Reyes.",
                )
                .with_ground_truth(TurnGroundTruth {
                    expected_facts: vec!["14:00".to_string()],
                    expected_tool: Some(ExpectedToolUse {
                        tool: "scheduler".to_string(),
                        arguments: HashMap::from([
                            ("date".to_string(), serde_json::json!("2026-03-10")),
                            ("time".to_string(), serde_json::json!("14:00")),
                        ]),
                    }),
                }),
                ScriptedTurn::new("Can you confirm the date and time once more?").with_ground_truth(
                    TurnGroundTruth {
                        expected_facts: vec!["2026-03-10".to_string(), "14:00".to_string()],
                        expected_tool: None,
                    },
                ),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_scenarios_are_valid() {
        let scenarios = ScenarioLoader::builtin();
        assert_eq!(scenarios.len(), 3);
        for scenario in &scenarios {
            scenario.validate().unwrap();
        }
    }

    #[test]
    fn builtin_ids_are_unique() {
        let scenarios = ScenarioLoader::builtin();
        let mut ids: Vec<_> = scenarios.iter().map(|s| s.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), scenarios.len());
    }
}
