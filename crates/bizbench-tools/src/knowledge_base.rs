//! Knowledge base lookup tool

use crate::fault::FaultInjector;
use async_trait::async_trait;
use bizbench_core::tools::{BusinessTool, ToolError, ToolParameter, ToolSchema};
use serde_json::{json, Value};
use std::collections::HashMap;

/// Built-in article set: (title, body)
const ARTICLES: &[(&str, &str)] = &[
    (
        "Return policy",
        "Items bought online can be returned within 30 days of delivery. \
         Products must be unused and in their original packaging. Refunds are \
         issued to the original payment method within 5 business days.",
    ),
    (
        "International shipping",
        "We ship internationally to over 40 countries. International orders \
         arrive within 15 business days and include tracking. Customs duties \
         are the responsibility of the recipient.",
    ),
    (
        "Warranty coverage",
        "All hardware carries a 12 month limited warranty covering \
         manufacturing defects. Accidental damage is not covered.",
    ),
    (
        "Business hours",
        "Support is available Monday through Friday, 9:00 to 18:00 local \
         time. Chat support is available around the clock.",
    ),
];

/// Keyword lookup over a small built-in article set
pub struct KnowledgeBaseTool {
    injector: FaultInjector,
}

impl KnowledgeBaseTool {
    /// Create the tool with the given fault injector
    pub fn new(injector: FaultInjector) -> Self {
        Self { injector }
    }

    fn search(query: &str) -> Vec<Value> {
        let terms: Vec<String> = query
            .to_lowercase()
            .split_whitespace()
            .map(String::from)
            .collect();

        let mut scored: Vec<(usize, &(&str, &str))> = ARTICLES
            .iter()
            .map(|article| {
                let haystack = format!("{} {}", article.0, article.1).to_lowercase();
                let hits = terms.iter().filter(|term| haystack.contains(*term)).count();
                (hits, article)
            })
            .filter(|(hits, _)| *hits > 0)
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0).then(a.1 .0.cmp(b.1 .0)));

        scored
            .into_iter()
            .take(2)
            .map(|(_, (title, body))| json!({"title": title, "content": body}))
            .collect()
    }
}

#[async_trait]
impl BusinessTool for KnowledgeBaseTool {
    fn name(&self) -> &str {
        "knowledge_base"
    }

    fn description(&self) -> &str {
        "Search the company knowledge base for policies, shipping, warranty, and support information"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new(
            self.name(),
            self.description(),
            vec![ToolParameter::string(
                "query",
                "Search terms describing the information needed",
            )],
        )
    }

    async fn call(&self, arguments: &HashMap<String, Value>) -> Result<Value, ToolError> {
        let query = arguments
            .get("query")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ToolError::InvalidArguments("'query' must be a string".to_string()))?;

        if self.injector.should_fail() {
            return Err(ToolError::Simulated(
                "knowledge base is temporarily unavailable".to_string(),
            ));
        }

        let articles = Self::search(query);
        tracing::debug!(query, hits = articles.len(), "knowledge base lookup");

        Ok(json!({
            "query": query,
            "articles": articles,
        }))
    }

    fn error_rate(&self) -> f64 {
        self.injector.error_rate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn finds_return_policy() {
        let tool = KnowledgeBaseTool::new(FaultInjector::disabled());
        let args = HashMap::from([("query".to_string(), json!("return policy online order"))]);

        let result = tool.call(&args).await.unwrap();
        let articles = result["articles"].as_array().unwrap();
        assert!(!articles.is_empty());
        assert_eq!(articles[0]["title"], "Return policy");
    }

    #[tokio::test]
    async fn missing_query_is_invalid() {
        let tool = KnowledgeBaseTool::new(FaultInjector::disabled());
        let err = tool.call(&HashMap::new()).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[tokio::test]
    async fn full_error_rate_simulates_failure() {
        let tool = KnowledgeBaseTool::new(FaultInjector::new(1.0, 0));
        let args = HashMap::from([("query".to_string(), json!("warranty"))]);
        let err = tool.call(&args).await.unwrap_err();
        assert!(matches!(err, ToolError::Simulated(_)));
    }
}
