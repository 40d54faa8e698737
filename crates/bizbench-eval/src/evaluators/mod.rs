//! Built-in scoring strategies behind the Evaluator contract

pub mod communication_style;
pub mod performance;
pub mod response_quality;
pub mod tool_usage;

pub use communication_style::CommunicationStyleEvaluator;
pub use performance::PerformanceEvaluator;
pub use response_quality::ResponseQualityEvaluator;
pub use tool_usage::ToolUsageEvaluator;

use bizbench_core::evaluator::Evaluator;
use std::sync::Arc;

/// The default evaluator set
pub fn default_evaluators() -> Vec<Arc<dyn Evaluator>> {
    vec![
        Arc::new(ResponseQualityEvaluator::new()),
        Arc::new(CommunicationStyleEvaluator::new()),
        Arc::new(ToolUsageEvaluator::new()),
        Arc::new(PerformanceEvaluator::new()),
    ]
}
