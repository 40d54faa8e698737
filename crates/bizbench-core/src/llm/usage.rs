//! Usage accounting for shared model instances
//!
//! A single model client is commonly reused across many concurrent benchmark
//! units. Configuration stays immutable on the client; the mutable usage
//! counters live here, updated through atomics so parallel units can record
//! calls without a lock.

use crate::llm::TokenUsage;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic usage accumulator shared across concurrent units
#[derive(Debug, Default)]
pub struct UsageStats {
    api_calls: AtomicU64,
    prompt_tokens: AtomicU64,
    completion_tokens: AtomicU64,
    /// Cost is tracked in micro-USD so it can live in an atomic counter
    cost_micro_usd: AtomicU64,
}

impl UsageStats {
    /// Create a new, zeroed accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one completed API call and its token usage
    pub fn record_call(&self, usage: Option<&TokenUsage>, cost_micro_usd: u64) {
        self.api_calls.fetch_add(1, Ordering::Relaxed);
        if let Some(usage) = usage {
            self.prompt_tokens
                .fetch_add(u64::from(usage.prompt_tokens), Ordering::Relaxed);
            self.completion_tokens
                .fetch_add(u64::from(usage.completion_tokens), Ordering::Relaxed);
        }
        if cost_micro_usd > 0 {
            self.cost_micro_usd.fetch_add(cost_micro_usd, Ordering::Relaxed);
        }
    }

    /// Take a consistent-enough snapshot of the counters
    pub fn snapshot(&self) -> UsageSnapshot {
        let prompt_tokens = self.prompt_tokens.load(Ordering::Relaxed);
        let completion_tokens = self.completion_tokens.load(Ordering::Relaxed);
        UsageSnapshot {
            api_calls: self.api_calls.load(Ordering::Relaxed),
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
            total_cost_usd: self.cost_micro_usd.load(Ordering::Relaxed) as f64 / 1_000_000.0,
        }
    }
}

/// Serializable view of a usage accumulator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageSnapshot {
    /// Number of API calls made
    pub api_calls: u64,
    /// Total prompt tokens
    pub prompt_tokens: u64,
    /// Total completion tokens
    pub completion_tokens: u64,
    /// Total tokens (prompt + completion)
    pub total_tokens: u64,
    /// Accumulated cost in USD
    pub total_cost_usd: f64,
}
