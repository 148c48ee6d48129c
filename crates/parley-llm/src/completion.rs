//! Request and reply types exchanged with a chat backend

use crate::error::BackendResult;
use crate::message::Message;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Token counts reported by the provider for one blocking reply
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Prompt tokens
    pub input_tokens: u32,
    /// Completion tokens
    pub output_tokens: u32,
}

impl TokenUsage {
    /// Create from provider counts
    #[must_use]
    pub const fn new(input_tokens: u32, output_tokens: u32) -> Self {
        Self {
            input_tokens,
            output_tokens,
        }
    }

    /// Input plus output, saturating
    #[must_use]
    pub fn total_tokens(&self) -> u32 {
        self.input_tokens.saturating_add(self.output_tokens)
    }
}

/// How the reply should be delivered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMode {
    /// Whole reply plus usage in one result
    #[default]
    Blocking,
    /// Reply delivered as text fragments, no usage available
    Streaming,
}

impl DeliveryMode {
    /// Returns the string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blocking => "blocking",
            Self::Streaming => "streaming",
        }
    }

    /// Pick a mode from a "stream?" flag
    #[must_use]
    pub fn from_stream_flag(stream: bool) -> Self {
        if stream {
            Self::Streaming
        } else {
            Self::Blocking
        }
    }
}

impl fmt::Display for DeliveryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Chat request handed to a backend
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatRequest {
    /// Model to use (provider-specific)
    pub model: String,
    /// Conversation so far, oldest first
    pub messages: Vec<Message>,
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
}

impl ChatRequest {
    /// Create a new chat request
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    /// Add messages
    #[must_use]
    pub fn with_messages(mut self, messages: Vec<Message>) -> Self {
        self.messages.extend(messages);
        self
    }

    /// Set max tokens
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Most recent user message, if any
    #[must_use]
    pub fn last_user_message(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.is_user())
    }
}

/// Lazy, finite, single-consumer sequence of reply fragments.
///
/// Dropping it closes the underlying response.
pub type FragmentStream = BoxStream<'static, BackendResult<String>>;

/// What a backend hands back for one request
pub enum BackendReply {
    /// Blocking delivery: full text with provider usage
    Complete {
        /// Reply text
        text: String,
        /// Provider-reported token counts
        usage: TokenUsage,
    },
    /// Streaming delivery: fragments only
    Stream(FragmentStream),
}

impl BackendReply {
    /// Delivery mode this reply corresponds to
    #[must_use]
    pub fn mode(&self) -> DeliveryMode {
        match self {
            Self::Complete { .. } => DeliveryMode::Blocking,
            Self::Stream(_) => DeliveryMode::Streaming,
        }
    }
}

impl fmt::Debug for BackendReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Complete { text, usage } => f
                .debug_struct("Complete")
                .field("text", text)
                .field("usage", usage)
                .finish(),
            Self::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_request_builder() {
        let request = ChatRequest::new("gpt-4o")
            .with_messages(vec![
                Message::user("Hello"),
                Message::assistant("Hi"),
                Message::user("Again"),
            ])
            .with_max_tokens(Some(100));

        assert_eq!(request.model, "gpt-4o");
        assert_eq!(request.messages.len(), 3);
        assert_eq!(request.max_tokens, Some(100));
        assert_eq!(
            request.last_user_message().map(|m| m.content.as_str()),
            Some("Again")
        );
    }

    #[test]
    fn test_token_usage_total() {
        assert_eq!(TokenUsage::new(12, 6).total_tokens(), 18);
        assert_eq!(TokenUsage::new(u32::MAX, 1).total_tokens(), u32::MAX);
    }

    #[test]
    fn test_delivery_mode_flag() {
        assert_eq!(DeliveryMode::from_stream_flag(true), DeliveryMode::Streaming);
        assert_eq!(DeliveryMode::from_stream_flag(false), DeliveryMode::Blocking);
        assert_eq!(DeliveryMode::default().to_string(), "blocking");
    }

    #[test]
    fn test_backend_reply_mode() {
        let reply = BackendReply::Complete {
            text: "ok".to_string(),
            usage: TokenUsage::default(),
        };
        assert_eq!(reply.mode(), DeliveryMode::Blocking);

        let reply = BackendReply::Stream(Box::pin(futures::stream::empty()));
        assert_eq!(reply.mode(), DeliveryMode::Streaming);
        assert_eq!(format!("{reply:?}"), "Stream(..)");
    }
}
