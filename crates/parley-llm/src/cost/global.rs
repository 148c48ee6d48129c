//! Process-wide default pricing table

use super::pricing::PricingTable;
use std::sync::Arc;

lazy_static::lazy_static! {
    /// Built-in table, shared by every estimator created with `Default`
    static ref GLOBAL_PRICING: Arc<PricingTable> = Arc::new(PricingTable::default());
}

/// Get the built-in pricing table
#[must_use]
pub fn global_pricing() -> Arc<PricingTable> {
    Arc::clone(&GLOBAL_PRICING)
}
