//! Cost Estimator - token counts to dollars

use super::global::global_pricing;
use super::pricing::{PricingSource, PricingTable};
use super::record::UsageRecord;
use crate::completion::TokenUsage;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Result of pricing one exchange
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostEstimate {
    /// Estimated cost (USD), unrounded
    pub cost: f64,
    /// Model whose row was used
    pub priced_as: String,
    /// Whether the row was a fallback
    pub source: PricingSource,
}

/// Pure cost estimator over a shared pricing table
#[derive(Debug, Clone)]
pub struct CostEstimator {
    table: Arc<PricingTable>,
}

impl Default for CostEstimator {
    fn default() -> Self {
        Self::new(global_pricing())
    }
}

impl CostEstimator {
    /// Create an estimator over a pricing table
    #[must_use]
    pub fn new(table: Arc<PricingTable>) -> Self {
        Self { table }
    }

    /// The table prices are read from
    #[must_use]
    pub fn table(&self) -> &PricingTable {
        &self.table
    }

    /// Estimate cost for a request
    #[must_use]
    pub fn estimate(&self, model: &str, input_tokens: u32, output_tokens: u32) -> f64 {
        self.estimate_detailed(model, input_tokens, output_tokens).cost
    }

    /// Estimate cost and report which row priced it
    #[must_use]
    pub fn estimate_detailed(
        &self,
        model: &str,
        input_tokens: u32,
        output_tokens: u32,
    ) -> CostEstimate {
        let (pricing, source) = self.table.lookup(model);
        let cost = pricing.calculate_cost(input_tokens, output_tokens);

        match source {
            PricingSource::Table => {
                debug!(model, cost, pricing = "table", "Estimated exchange cost");
            }
            PricingSource::Fallback => {
                warn!(
                    model,
                    fallback_model = %pricing.model,
                    cost,
                    pricing = "fallback",
                    "No pricing for model, using default row"
                );
            }
        }

        CostEstimate {
            cost,
            priced_as: pricing.model.clone(),
            source,
        }
    }

    /// Build the usage record for a completed blocking exchange
    #[must_use]
    pub fn usage_record(&self, model: &str, usage: &TokenUsage) -> UsageRecord {
        let estimate = self.estimate_detailed(model, usage.input_tokens, usage.output_tokens);
        UsageRecord {
            input_tokens: usage.input_tokens,
            output_tokens: usage.output_tokens,
            total_tokens: usage.total_tokens(),
            model: model.to_string(),
            estimated_cost: estimate.cost,
            fallback_pricing: estimate.source == PricingSource::Fallback,
            timestamp: Utc::now(),
        }
    }
}
