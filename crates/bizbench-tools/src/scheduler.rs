//! Appointment scheduling tool

use crate::fault::FaultInjector;
use async_trait::async_trait;
use bizbench_core::tools::{BusinessTool, ToolError, ToolParameter, ToolSchema};
use chrono::{NaiveDate, NaiveTime};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::collections::HashSet;

/// Books appointment slots, rejecting double bookings.
///
/// The booking ledger is shared mutable state behind a lock: the same tool
/// instance serves every concurrent benchmark unit.
pub struct SchedulerTool {
    injector: FaultInjector,
    booked: Mutex<HashSet<(NaiveDate, NaiveTime)>>,
    confirmations: Mutex<u32>,
}

impl SchedulerTool {
    /// Create the tool with the given fault injector
    pub fn new(injector: FaultInjector) -> Self {
        Self {
            injector,
            booked: Mutex::new(HashSet::new()),
            confirmations: Mutex::new(0),
        }
    }
}

#[async_trait]
impl BusinessTool for SchedulerTool {
    fn name(&self) -> &str {
        "scheduler"
    }

    fn description(&self) -> &str {
        "Book an appointment slot for a customer on a given date and time"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new(
            self.name(),
            self.description(),
            vec![
                ToolParameter::string("date", "Appointment date in YYYY-MM-DD format"),
                ToolParameter::string("time", "Appointment time in HH:MM format"),
                ToolParameter::string("customer_name", "Name of the customer"),
            ],
        )
    }

    async fn call(&self, arguments: &HashMap<String, Value>) -> Result<Value, ToolError> {
        let date = arguments
            .get("date")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ToolError::InvalidArguments("'date' must be a string".to_string()))?;
        let time = arguments
            .get("time")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ToolError::InvalidArguments("'time' must be a string".to_string()))?;
        let customer = arguments
            .get("customer_name")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                ToolError::InvalidArguments("'customer_name' must be a string".to_string())
            })?;

        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| {
            ToolError::InvalidArguments(format!("'{date}' is not a valid YYYY-MM-DD date"))
        })?;
        let time = NaiveTime::parse_from_str(time, "%H:%M").map_err(|_| {
            ToolError::InvalidArguments(format!("'{time}' is not a valid HH:MM time"))
        })?;

        if self.injector.should_fail() {
            return Err(ToolError::Simulated(
                "calendar backend timed out".to_string(),
            ));
        }

        if !self.booked.lock().insert((date, time)) {
            return Err(ToolError::ExecutionFailed(format!(
                "slot {date} {} is already booked",
                time.format("%H:%M")
            )));
        }

        let confirmation = {
            let mut counter = self.confirmations.lock();
            *counter += 1;
            format!("APT-{:04}", *counter)
        };
        tracing::debug!(%confirmation, customer, "booked appointment slot");

        Ok(json!({
            "confirmation_id": confirmation,
            "customer_name": customer,
            "date": date.format("%Y-%m-%d").to_string(),
            "time": time.format("%H:%M").to_string(),
        }))
    }

    fn error_rate(&self) -> f64 {
        self.injector.error_rate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(date: &str, time: &str) -> HashMap<String, Value> {
        HashMap::from([
            ("date".to_string(), json!(date)),
            ("time".to_string(), json!(time)),
            ("customer_name".to_string(), json!("Dana Reyes")),
        ])
    }

    #[tokio::test]
    async fn books_and_rejects_double_booking() {
        let tool = SchedulerTool::new(FaultInjector::disabled());

        let booking = tool.call(&args("2026-03-10", "14:00")).await.unwrap();
        assert_eq!(booking["confirmation_id"], "APT-0001");

        let err = tool.call(&args("2026-03-10", "14:00")).await.unwrap_err();
        assert!(matches!(err, ToolError::ExecutionFailed(_)));

        // A different slot still books fine
        tool.call(&args("2026-03-10", "15:00")).await.unwrap();
    }

    #[tokio::test]
    async fn rejects_malformed_date() {
        let tool = SchedulerTool::new(FaultInjector::disabled());
        let err = tool.call(&args("March 10th", "14:00")).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }
}
