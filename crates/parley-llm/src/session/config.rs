//! Session configuration

use crate::conversation::DEFAULT_MAX_HISTORY;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Settings for one chat session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Model requests are sent to and priced as
    pub model: String,
    /// History bound, in messages
    #[serde(default = "default_max_history")]
    pub max_history: usize,
    /// Maximum tokens to generate per reply
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

fn default_max_history() -> usize {
    DEFAULT_MAX_HISTORY
}

impl SessionConfig {
    /// Create a config for a model with default limits
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            max_history: DEFAULT_MAX_HISTORY,
            max_tokens: None,
        }
    }

    /// Set the history bound
    #[must_use]
    pub fn with_max_history(mut self, max_history: usize) -> Self {
        self.max_history = max_history;
        self
    }

    /// Set max tokens
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Reject settings no backend could serve
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(Error::Configuration("model must not be empty".to_string()));
        }
        if self.max_tokens == Some(0) {
            return Err(Error::Configuration(
                "max_tokens must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = SessionConfig::new("gpt-4o-mini")
            .with_max_history(8)
            .with_max_tokens(256);

        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.max_history, 8);
        assert_eq!(config.max_tokens, Some(256));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_model_rejected() {
        let err = SessionConfig::new("  ").validate().unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_zero_max_tokens_rejected() {
        let err = SessionConfig::new("gpt-4o")
            .with_max_tokens(0)
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("max_tokens"));
    }

    #[test]
    fn test_deserialize_defaults() {
        let config: SessionConfig = serde_json::from_str(r#"{"model":"gpt-4o"}"#).unwrap();
        assert_eq!(config.max_history, DEFAULT_MAX_HISTORY);
        assert_eq!(config.max_tokens, None);
    }
}
