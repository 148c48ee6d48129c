//! Usage reporting
//!
//! Rounding happens here and nowhere else; records and totals keep full
//! precision.

use super::record::{UsageRecord, UsageTotals};
use crate::util::{group_digits, pluralize};

/// Multi-line stats block for one exchange
#[must_use]
pub fn format_usage_stats(record: &UsageRecord) -> String {
    let mut output = String::new();

    output.push_str("📊 Token Usage Stats:\n");
    output.push_str(&format!("   Model: {}\n", record.model));
    output.push_str(&format!(
        "   Input tokens: {}\n",
        group_digits(u64::from(record.input_tokens))
    ));
    output.push_str(&format!(
        "   Output tokens: {}\n",
        group_digits(u64::from(record.output_tokens))
    ));
    output.push_str(&format!(
        "   Total tokens: {}\n",
        group_digits(u64::from(record.total_tokens))
    ));
    output.push_str(&format!("   Estimated cost: ${:.6}", record.estimated_cost));
    if record.fallback_pricing {
        output.push_str(" (default pricing)");
    }

    output
}

/// One-line usage tag for one exchange
#[must_use]
pub fn format_usage_line(record: &UsageRecord) -> String {
    format!(
        "[Tokens: {} in, {} out, ${:.4}]",
        group_digits(u64::from(record.input_tokens)),
        group_digits(u64::from(record.output_tokens)),
        record.estimated_cost
    )
}

/// Digest of session totals
#[must_use]
pub fn format_totals(totals: &UsageTotals) -> String {
    format!(
        "{}, {} input + {} output tokens ({} total), ${:.4}",
        pluralize(totals.exchange_count, "exchange", "exchanges"),
        group_digits(totals.total_input_tokens),
        group_digits(totals.total_output_tokens),
        group_digits(totals.total_tokens()),
        totals.total_cost
    )
}
