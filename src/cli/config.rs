//! Application configuration types
//!
//! Values come from the layers assembled in [`super::loader`]; command-line
//! flags are applied last with [`AppConfig::apply_cli`].

use super::Cli;
use parley_llm::{
    ChatBackend, ChatSession, CostEstimator, DeliveryMode, EchoBackend, Error, ModelPricing,
    PricingTable, Result, SessionConfig, DEFAULT_MAX_HISTORY, DEFAULT_PRICING_MODEL,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Name of the built-in offline backend
pub const ECHO_BACKEND: &str = "echo";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_backend")]
    pub backend: String,
    pub model: String,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub stream: bool,
    #[serde(default)]
    pub show_stats: bool,
    #[serde(default)]
    pub conversation: ConversationConfig,
    #[serde(default)]
    pub pricing: PricingConfig,
}

fn default_backend() -> String {
    ECHO_BACKEND.to_string()
}

/// History settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationConfig {
    #[serde(default = "default_max_history")]
    pub max_history: usize,
    #[serde(default = "default_memory")]
    pub memory: bool,
}

fn default_max_history() -> usize {
    DEFAULT_MAX_HISTORY
}

fn default_memory() -> bool {
    true
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            max_history: default_max_history(),
            memory: default_memory(),
        }
    }
}

/// Pricing settings, merged over the built-in table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    #[serde(default = "default_pricing_model")]
    pub default_model: String,
    #[serde(default)]
    pub models: HashMap<String, PriceOverride>,
}

fn default_pricing_model() -> String {
    DEFAULT_PRICING_MODEL.to_string()
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            default_model: default_pricing_model(),
            models: HashMap::new(),
        }
    }
}

/// One configured pricing row (USD per 1M tokens)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceOverride {
    #[serde(default = "default_provider")]
    pub provider: String,
    pub input_cost_per_million: f64,
    pub output_cost_per_million: f64,
}

fn default_provider() -> String {
    "custom".to_string()
}

impl AppConfig {
    /// Apply command-line flags on top of the loaded layers
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(model) = &cli.model {
            self.model = model.clone();
        }
        if let Some(backend) = &cli.backend {
            self.backend = backend.clone();
        }
        if cli.max_tokens.is_some() {
            self.max_tokens = cli.max_tokens;
        }
        if let Some(max_history) = cli.max_history {
            self.conversation.max_history = max_history;
        }
        if cli.no_memory {
            self.conversation.memory = false;
        }
        self.stream |= cli.stream;
        self.show_stats |= cli.stats;
    }

    /// Delivery mode for every exchange
    pub fn delivery_mode(&self) -> DeliveryMode {
        DeliveryMode::from_stream_flag(self.stream)
    }

    /// Per-session settings
    pub fn session_config(&self) -> SessionConfig {
        let mut config =
            SessionConfig::new(&self.model).with_max_history(self.conversation.max_history);
        config.max_tokens = self.max_tokens;
        config
    }

    /// Built-in pricing with configured rows merged in
    pub fn pricing_table(&self) -> Result<PricingTable> {
        let mut table = PricingTable::default();
        for (model, row) in &self.pricing.models {
            let pricing = ModelPricing::new(
                model.clone(),
                row.provider.clone(),
                row.input_cost_per_million,
                row.output_cost_per_million,
            );
            table = table.with_override(model.clone(), pricing)?;
        }
        table.with_default_model(self.pricing.default_model.clone())
    }

    /// Instantiate the configured backend
    pub fn build_backend(&self) -> Result<Arc<dyn ChatBackend>> {
        match self.backend.as_str() {
            ECHO_BACKEND => Ok(Arc::new(EchoBackend::new())),
            other => Err(Error::Configuration(format!(
                "unknown backend '{}' (available: {})",
                other, ECHO_BACKEND
            ))),
        }
    }
}

/// Opens sessions that share one backend and one pricing table
pub struct SessionFactory {
    backend: Arc<dyn ChatBackend>,
    estimator: CostEstimator,
    session_config: SessionConfig,
}

impl SessionFactory {
    /// Validate the configuration and build the shared parts
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let session_config = config.session_config();
        session_config.validate()?;

        let table = config.pricing_table()?;
        debug!(
            models = table.len(),
            default_model = table.default_model(),
            "Pricing table loaded"
        );

        Ok(Self {
            backend: config.build_backend()?,
            estimator: CostEstimator::new(Arc::new(table)),
            session_config,
        })
    }

    /// Swap in another backend
    #[cfg(test)]
    pub fn with_backend(mut self, backend: Arc<dyn ChatBackend>) -> Self {
        self.backend = backend;
        self
    }

    /// A fresh session with empty history
    pub fn open(&self) -> Result<ChatSession> {
        Ok(
            ChatSession::new(Arc::clone(&self.backend), self.session_config.clone())?
                .with_estimator(self.estimator.clone()),
        )
    }

    /// Configured model
    pub fn model(&self) -> &str {
        &self.session_config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::loader::load_from_str;
    use clap::Parser;
    use parley_llm::{BackendError, PricingSource};

    fn defaults() -> AppConfig {
        load_from_str("").unwrap()
    }

    #[test]
    fn test_cli_overrides_config() {
        let mut config = defaults();
        let cli = Cli::parse_from([
            "parley",
            "--model",
            "claude-3-haiku-20240307",
            "--stats",
            "--no-memory",
            "--max-tokens",
            "64",
            "hi",
        ]);

        config.apply_cli(&cli);

        assert_eq!(config.model, "claude-3-haiku-20240307");
        assert!(config.show_stats);
        assert!(!config.conversation.memory);
        assert_eq!(config.max_tokens, Some(64));
        assert_eq!(config.delivery_mode(), DeliveryMode::Blocking);
    }

    #[test]
    fn test_flags_do_not_clear_config() {
        let mut config = load_from_str("stream = true\nshow_stats = true").unwrap();
        config.apply_cli(&Cli::parse_from(["parley", "hi"]));

        assert!(config.stream);
        assert!(config.show_stats);
        assert_eq!(config.delivery_mode(), DeliveryMode::Streaming);
    }

    #[test]
    fn test_session_config_from_app_config() {
        let config = load_from_str("max_tokens = 300\n[conversation]\nmax_history = 6").unwrap();
        let session = config.session_config();

        assert_eq!(session.model, config.model);
        assert_eq!(session.max_history, 6);
        assert_eq!(session.max_tokens, Some(300));
    }

    #[test]
    fn test_pricing_overrides_merged() {
        let config = load_from_str(
            r#"
            [pricing]
            default_model = "house"

            [pricing.models.house]
            provider = "local"
            input_cost_per_million = 1.0
            output_cost_per_million = 2.0
            "#,
        )
        .unwrap();

        let table = config.pricing_table().unwrap();
        assert_eq!(table.default_model(), "house");
        assert_eq!(table.get("house").unwrap().provider, "local");
        // Built-in rows survive
        assert!(table.get("gpt-4o-mini").is_some());

        let (pricing, source) = table.lookup("never-heard-of-it");
        assert_eq!(pricing.model, "house");
        assert_eq!(source, PricingSource::Fallback);
    }

    #[test]
    fn test_missing_default_row_rejected() {
        let config = load_from_str("[pricing]\ndefault_model = \"nope\"").unwrap();
        assert!(matches!(config.pricing_table(), Err(Error::Configuration(_))));
        assert!(SessionFactory::from_config(&config).is_err());
    }

    #[test]
    fn test_negative_price_rejected() {
        let config = load_from_str(
            "[pricing.models.bad]\ninput_cost_per_million = -1.0\noutput_cost_per_million = 1.0",
        )
        .unwrap();
        assert!(matches!(config.pricing_table(), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let config = load_from_str("backend = \"carrier-pigeon\"").unwrap();
        let err = SessionFactory::from_config(&config).err().unwrap();
        assert!(err.to_string().contains("carrier-pigeon"));
    }

    #[test]
    fn test_zero_max_tokens_rejected() {
        let config = load_from_str("max_tokens = 0").unwrap();
        let err = SessionFactory::from_config(&config).err().unwrap();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[tokio::test]
    async fn test_factory_opens_independent_sessions() {
        let factory = SessionFactory::from_config(&defaults()).unwrap();
        let first = factory.open().unwrap();
        let second = factory.open().unwrap();

        first
            .exchange("hello", DeliveryMode::Blocking)
            .await
            .unwrap();

        assert_eq!(first.snapshot().await.len(), 2);
        assert!(second.snapshot().await.is_empty());
        assert_eq!(first.backend_name(), ECHO_BACKEND);
        assert_eq!(factory.model(), "gpt-4o-mini");
    }

    #[tokio::test]
    async fn test_factory_with_backend() {
        let backend = Arc::new(parley_llm::MockBackend::new());
        backend.push_error(BackendError::Timeout(5_000));
        let factory = SessionFactory::from_config(&defaults())
            .unwrap()
            .with_backend(backend.clone());

        let session = factory.open().unwrap();
        let err = session
            .exchange("hi", DeliveryMode::Blocking)
            .await
            .unwrap_err();
        assert!(matches!(err.backend(), Some(BackendError::Timeout(5_000))));
    }
}
