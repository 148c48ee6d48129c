//! Model Pricing - per-model token rates
//!
//! The table is configuration data: it is built once at start-up (defaults
//! plus overrides) and shared read-only afterwards.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Model whose row prices any identifier missing from the table
pub const DEFAULT_PRICING_MODEL: &str = "gpt-4o";

// ============================================================================
// Model Pricing Constants (per 1M tokens, USD)
// ============================================================================

// OpenAI
/// GPT-4o input cost per 1M tokens
pub const GPT4O_INPUT_COST: f64 = 2.50;
/// GPT-4o output cost per 1M tokens
pub const GPT4O_OUTPUT_COST: f64 = 10.00;
/// GPT-4o-mini input cost per 1M tokens
pub const GPT4O_MINI_INPUT_COST: f64 = 0.15;
/// GPT-4o-mini output cost per 1M tokens
pub const GPT4O_MINI_OUTPUT_COST: f64 = 0.60;
/// GPT-4 Turbo input cost per 1M tokens
pub const GPT4_TURBO_INPUT_COST: f64 = 10.00;
/// GPT-4 Turbo output cost per 1M tokens
pub const GPT4_TURBO_OUTPUT_COST: f64 = 30.00;
/// GPT-4 input cost per 1M tokens
pub const GPT4_INPUT_COST: f64 = 30.00;
/// GPT-4 output cost per 1M tokens
pub const GPT4_OUTPUT_COST: f64 = 60.00;
/// GPT-3.5 Turbo input cost per 1M tokens
pub const GPT35_TURBO_INPUT_COST: f64 = 0.50;
/// GPT-3.5 Turbo output cost per 1M tokens
pub const GPT35_TURBO_OUTPUT_COST: f64 = 1.50;
/// o1 input cost per 1M tokens
pub const O1_INPUT_COST: f64 = 15.00;
/// o1 output cost per 1M tokens
pub const O1_OUTPUT_COST: f64 = 60.00;
/// o1-mini input cost per 1M tokens
pub const O1_MINI_INPUT_COST: f64 = 1.10;
/// o1-mini output cost per 1M tokens
pub const O1_MINI_OUTPUT_COST: f64 = 4.40;

// Anthropic
/// Claude Opus 4 input cost per 1M tokens
pub const CLAUDE_OPUS4_INPUT_COST: f64 = 15.00;
/// Claude Opus 4 output cost per 1M tokens
pub const CLAUDE_OPUS4_OUTPUT_COST: f64 = 75.00;
/// Claude Sonnet (4, 3.7, 3.5) input cost per 1M tokens
pub const CLAUDE_SONNET_INPUT_COST: f64 = 3.00;
/// Claude Sonnet (4, 3.7, 3.5) output cost per 1M tokens
pub const CLAUDE_SONNET_OUTPUT_COST: f64 = 15.00;
/// Claude 3.5 Haiku input cost per 1M tokens
pub const CLAUDE_HAIKU35_INPUT_COST: f64 = 0.80;
/// Claude 3.5 Haiku output cost per 1M tokens
pub const CLAUDE_HAIKU35_OUTPUT_COST: f64 = 4.00;
/// Claude 3 Haiku input cost per 1M tokens
pub const CLAUDE_HAIKU3_INPUT_COST: f64 = 0.25;
/// Claude 3 Haiku output cost per 1M tokens
pub const CLAUDE_HAIKU3_OUTPUT_COST: f64 = 1.25;

// ============================================================================
// Cost Models
// ============================================================================

/// Pricing information for a model (per 1M tokens)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelPricing {
    /// Model name
    pub model: String,
    /// Provider name
    #[serde(default)]
    pub provider: String,
    /// Cost per 1M input tokens (USD)
    pub input_cost_per_million: f64,
    /// Cost per 1M output tokens (USD)
    pub output_cost_per_million: f64,
}

impl ModelPricing {
    /// Create a pricing row
    #[must_use]
    pub fn new(
        model: impl Into<String>,
        provider: impl Into<String>,
        input_cost_per_million: f64,
        output_cost_per_million: f64,
    ) -> Self {
        Self {
            model: model.into(),
            provider: provider.into(),
            input_cost_per_million,
            output_cost_per_million,
        }
    }

    /// Calculate cost for given token counts. No rounding.
    #[must_use]
    pub fn calculate_cost(&self, input_tokens: u32, output_tokens: u32) -> f64 {
        let input_cost = (input_tokens as f64 / 1_000_000.0) * self.input_cost_per_million;
        let output_cost = (output_tokens as f64 / 1_000_000.0) * self.output_cost_per_million;
        input_cost + output_cost
    }

    fn validate(&self) -> Result<()> {
        let valid = |price: f64| price.is_finite() && price >= 0.0;
        if valid(self.input_cost_per_million) && valid(self.output_cost_per_million) {
            Ok(())
        } else {
            Err(Error::Configuration(format!(
                "pricing for '{}' must be finite and non-negative",
                self.model
            )))
        }
    }
}

/// How a model's price was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PricingSource {
    /// The model has its own row
    Table,
    /// Unknown model, priced with the default row
    Fallback,
}

/// Read-only mapping from model identifier to pricing, with an explicit
/// default row for unknown identifiers.
#[derive(Debug, Clone)]
pub struct PricingTable {
    entries: HashMap<String, ModelPricing>,
    default_model: String,
}

impl PricingTable {
    /// Build a table; `default_model` must have a row
    pub fn new(
        entries: HashMap<String, ModelPricing>,
        default_model: impl Into<String>,
    ) -> Result<Self> {
        let default_model = default_model.into();
        for pricing in entries.values() {
            pricing.validate()?;
        }
        if !entries.contains_key(&default_model) {
            return Err(Error::Configuration(format!(
                "default pricing model '{}' has no pricing row",
                default_model
            )));
        }
        Ok(Self {
            entries,
            default_model,
        })
    }

    /// Add or replace a row
    pub fn with_override(mut self, model: impl Into<String>, pricing: ModelPricing) -> Result<Self> {
        pricing.validate()?;
        self.entries.insert(model.into(), pricing);
        Ok(self)
    }

    /// Switch the fallback row
    pub fn with_default_model(mut self, model: impl Into<String>) -> Result<Self> {
        let model = model.into();
        if !self.entries.contains_key(&model) {
            return Err(Error::Configuration(format!(
                "default pricing model '{}' has no pricing row",
                model
            )));
        }
        self.default_model = model;
        Ok(self)
    }

    /// Exact lookup, no fallback
    #[must_use]
    pub fn get(&self, model: &str) -> Option<&ModelPricing> {
        self.entries.get(model)
    }

    /// Resolve a model's pricing, falling back to the default row
    #[must_use]
    pub fn lookup(&self, model: &str) -> (&ModelPricing, PricingSource) {
        match self.entries.get(model) {
            Some(pricing) => (pricing, PricingSource::Table),
            None => (self.default_pricing(), PricingSource::Fallback),
        }
    }

    /// The row used for unknown models
    #[must_use]
    pub fn default_pricing(&self) -> &ModelPricing {
        // Presence of the default row is checked by every constructor.
        &self.entries[&self.default_model]
    }

    /// Identifier of the fallback row
    #[must_use]
    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    /// Known model identifiers, sorted
    #[must_use]
    pub fn models(&self) -> Vec<&str> {
        let mut models: Vec<_> = self.entries.keys().map(String::as_str).collect();
        models.sort_unstable();
        models
    }

    /// Number of rows
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no rows (never true for a constructed table)
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for PricingTable {
    fn default() -> Self {
        Self {
            entries: default_pricing(),
            default_model: DEFAULT_PRICING_MODEL.to_string(),
        }
    }
}

/// Default pricing for the supported OpenAI and Anthropic models
#[must_use]
pub fn default_pricing() -> HashMap<String, ModelPricing> {
    let rows = [
        // OpenAI
        ("gpt-4o", "openai", GPT4O_INPUT_COST, GPT4O_OUTPUT_COST),
        ("gpt-4o-mini", "openai", GPT4O_MINI_INPUT_COST, GPT4O_MINI_OUTPUT_COST),
        ("gpt-4-turbo", "openai", GPT4_TURBO_INPUT_COST, GPT4_TURBO_OUTPUT_COST),
        ("gpt-4", "openai", GPT4_INPUT_COST, GPT4_OUTPUT_COST),
        ("gpt-3.5-turbo", "openai", GPT35_TURBO_INPUT_COST, GPT35_TURBO_OUTPUT_COST),
        ("o1", "openai", O1_INPUT_COST, O1_OUTPUT_COST),
        ("o1-mini", "openai", O1_MINI_INPUT_COST, O1_MINI_OUTPUT_COST),
        // Anthropic
        (
            "claude-opus-4-20250514",
            "anthropic",
            CLAUDE_OPUS4_INPUT_COST,
            CLAUDE_OPUS4_OUTPUT_COST,
        ),
        (
            "claude-sonnet-4-20250514",
            "anthropic",
            CLAUDE_SONNET_INPUT_COST,
            CLAUDE_SONNET_OUTPUT_COST,
        ),
        (
            "claude-3-7-sonnet-20250219",
            "anthropic",
            CLAUDE_SONNET_INPUT_COST,
            CLAUDE_SONNET_OUTPUT_COST,
        ),
        (
            "claude-3-5-sonnet-20241022",
            "anthropic",
            CLAUDE_SONNET_INPUT_COST,
            CLAUDE_SONNET_OUTPUT_COST,
        ),
        (
            "claude-3-5-haiku-20241022",
            "anthropic",
            CLAUDE_HAIKU35_INPUT_COST,
            CLAUDE_HAIKU35_OUTPUT_COST,
        ),
        (
            "claude-3-haiku-20240307",
            "anthropic",
            CLAUDE_HAIKU3_INPUT_COST,
            CLAUDE_HAIKU3_OUTPUT_COST,
        ),
    ];

    rows.into_iter()
        .map(|(model, provider, input, output)| {
            (
                model.to_string(),
                ModelPricing::new(model, provider, input, output),
            )
        })
        .collect()
}
