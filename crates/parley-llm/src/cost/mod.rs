//! Cost Tracking - token usage and cost estimation
//!
//! # Module Structure
//!
//! - `pricing`: Model pricing rows and the pricing table
//! - `estimator`: CostEstimator (pure token-to-cost mapping)
//! - `record`: Usage records and session totals
//! - `report`: Human-readable usage formatting
//! - `global`: Built-in pricing table singleton

mod estimator;
mod global;
mod pricing;
mod record;
mod report;


// Re-export public types
pub use estimator::{CostEstimate, CostEstimator};
pub use global::global_pricing;
pub use pricing::{
    default_pricing, ModelPricing, PricingSource, PricingTable, DEFAULT_PRICING_MODEL,
};
pub use record::{UsageRecord, UsageTotals};
pub use report::{format_totals, format_usage_line, format_usage_stats};
