//! Built-in simulated business tools for the BizBench harness.
//!
//! Each tool implements the [`BusinessTool`] capability contract and carries
//! a configurable error rate through a seeded [`FaultInjector`], so simulated
//! failures are reproducible across benchmark invocations.

pub mod fault;
pub mod knowledge_base;
pub mod pricing;
pub mod scheduler;

pub use fault::FaultInjector;
pub use knowledge_base::KnowledgeBaseTool;
pub use pricing::PricingTool;
pub use scheduler::SchedulerTool;

use bizbench_core::tools::{BusinessTool, ToolMap};
use std::sync::Arc;

/// Build the default tool set.
///
/// Each tool gets its own injector derived from the base seed, so one tool's
/// call pattern does not perturb another's failure sequence.
pub fn default_tools(error_rate: f64, seed: u64) -> ToolMap {
    let tools: Vec<Arc<dyn BusinessTool>> = vec![
        Arc::new(KnowledgeBaseTool::new(FaultInjector::new(
            error_rate,
            seed.wrapping_add(1),
        ))),
        Arc::new(PricingTool::new(FaultInjector::new(
            error_rate,
            seed.wrapping_add(2),
        ))),
        Arc::new(SchedulerTool::new(FaultInjector::new(
            error_rate,
            seed.wrapping_add(3),
        ))),
    ];

    tools
        .into_iter()
        .map(|tool| (tool.name().to_string(), tool))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bizbench_core::tools::tool_schemas;

    #[test]
    fn default_set_is_keyed_by_tool_name() {
        let tools = default_tools(0.0, 0);
        assert_eq!(tools.len(), 3);
        for (name, tool) in &tools {
            assert_eq!(name, tool.name());
        }
    }

    #[test]
    fn schemas_declare_required_params() {
        let tools = default_tools(0.0, 0);
        for schema in tool_schemas(&tools) {
            assert!(!schema.name.is_empty());
            assert!(schema.parameters["properties"].is_object());
        }
    }
}
