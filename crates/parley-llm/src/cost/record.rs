//! Usage Records and Totals

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Usage of one completed blocking exchange
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    /// Input tokens
    pub input_tokens: u32,
    /// Output tokens
    pub output_tokens: u32,
    /// Input plus output
    pub total_tokens: u32,
    /// Model the exchange ran against
    pub model: String,
    /// Estimated cost (USD)
    pub estimated_cost: f64,
    /// Priced with the default row because the model was unknown
    #[serde(default)]
    pub fallback_pricing: bool,
    /// When the record was created
    pub timestamp: DateTime<Utc>,
}

/// Session-level usage counters.
///
/// Every field only grows until [`reset`](UsageTotals::reset).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageTotals {
    /// Total input tokens
    pub total_input_tokens: u64,
    /// Total output tokens
    pub total_output_tokens: u64,
    /// Total estimated cost (USD)
    pub total_cost: f64,
    /// Completed blocking exchanges
    pub exchange_count: u64,
}

impl UsageTotals {
    /// Fold one record in
    pub fn add(&mut self, record: &UsageRecord) {
        self.total_input_tokens += u64::from(record.input_tokens);
        self.total_output_tokens += u64::from(record.output_tokens);
        self.total_cost += record.estimated_cost;
        self.exchange_count += 1;
    }

    /// Zero every counter
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Input plus output tokens
    #[must_use]
    pub fn total_tokens(&self) -> u64 {
        self.total_input_tokens + self.total_output_tokens
    }

    /// No exchange recorded since creation or the last reset
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.exchange_count == 0
    }
}
