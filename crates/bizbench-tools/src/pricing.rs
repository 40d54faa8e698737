//! Quote calculation tool with tiered volume discounts

use crate::fault::FaultInjector;
use async_trait::async_trait;
use bizbench_core::tools::{BusinessTool, ToolError, ToolParameter, ToolSchema};
use serde_json::{json, Value};
use std::collections::HashMap;

/// Unit prices by product name, USD
const PRICE_LIST: &[(&str, f64)] = &[
    ("standard widget", 20.0),
    ("premium widget", 45.0),
    ("service plan", 120.0),
    ("installation kit", 35.0),
];

fn discount_pct(quantity: u64) -> f64 {
    match quantity {
        0..=9 => 0.0,
        10..=49 => 5.0,
        50..=99 => 10.0,
        _ => 15.0,
    }
}

/// Computes quotes from the built-in price list
pub struct PricingTool {
    injector: FaultInjector,
}

impl PricingTool {
    /// Create the tool with the given fault injector
    pub fn new(injector: FaultInjector) -> Self {
        Self { injector }
    }
}

#[async_trait]
impl BusinessTool for PricingTool {
    fn name(&self) -> &str {
        "pricing"
    }

    fn description(&self) -> &str {
        "Compute a price quote for a product and quantity, applying volume discounts"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new(
            self.name(),
            self.description(),
            vec![
                ToolParameter::string("product", "Product name exactly as listed in the catalog"),
                ToolParameter::number("quantity", "Number of units requested")
                    .optional()
                    .with_default(1),
            ],
        )
    }

    async fn call(&self, arguments: &HashMap<String, Value>) -> Result<Value, ToolError> {
        let product = arguments
            .get("product")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ToolError::InvalidArguments("'product' must be a string".to_string()))?;
        let quantity = match arguments.get("quantity") {
            None => 1,
            Some(value) => value.as_u64().ok_or_else(|| {
                ToolError::InvalidArguments("'quantity' must be a positive integer".to_string())
            })?,
        };
        if quantity == 0 {
            return Err(ToolError::InvalidArguments(
                "'quantity' must be at least 1".to_string(),
            ));
        }

        if self.injector.should_fail() {
            return Err(ToolError::Simulated(
                "pricing service did not respond".to_string(),
            ));
        }

        let normalized = product.trim().to_lowercase();
        let unit_price = PRICE_LIST
            .iter()
            .find(|(name, _)| *name == normalized)
            .map(|(_, price)| *price)
            .ok_or_else(|| {
                ToolError::ExecutionFailed(format!("unknown product '{product}'"))
            })?;

        let discount = discount_pct(quantity);
        let total = unit_price * quantity as f64 * (1.0 - discount / 100.0);

        Ok(json!({
            "product": normalized,
            "unit_price": unit_price,
            "quantity": quantity,
            "discount_pct": discount,
            "total": (total * 100.0).round() / 100.0,
        }))
    }

    fn error_rate(&self) -> f64 {
        self.injector.error_rate()
    }
}
