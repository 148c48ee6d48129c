//! Offline echo backend
//!
//! Answers locally by repeating the latest user message. Usage is a
//! client-side token estimate, so blocking exchanges still produce realistic
//! accounting without any provider.

use super::ChatBackend;
use crate::completion::{BackendReply, ChatRequest, DeliveryMode, TokenUsage};
use crate::error::{BackendError, BackendResult};
use crate::token::{count_message_tokens, count_tokens, to_u32};
use futures::stream::{self, StreamExt};
use tracing::debug;

/// Default text put in front of the echoed message
pub const DEFAULT_ECHO_PREFIX: &str = "You said: ";

/// Backend that echoes the last user message
#[derive(Debug, Clone)]
pub struct EchoBackend {
    prefix: String,
}

impl Default for EchoBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl EchoBackend {
    /// Create with the default prefix
    #[must_use]
    pub fn new() -> Self {
        Self {
            prefix: DEFAULT_ECHO_PREFIX.to_string(),
        }
    }

    /// Set the prefix
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    fn reply_for(&self, request: &ChatRequest) -> BackendResult<String> {
        let last = request.last_user_message().ok_or_else(|| {
            BackendError::InvalidRequest("conversation has no user message".to_string())
        })?;

        let reply = format!("{}{}", self.prefix, last.content);
        Ok(match request.max_tokens {
            Some(limit) => truncate_to_tokens(&reply, limit as usize),
            None => reply,
        })
    }
}

/// Longest word-aligned prefix of `text` within `limit` tokens.
///
/// Each word is tokenized once; the joined prefix is checked at the end.
fn truncate_to_tokens(text: &str, limit: usize) -> String {
    let mut ends = Vec::new();
    let mut used = 0;
    let mut end = 0;
    for word in text.split_inclusive(' ') {
        used += count_tokens(word);
        if used > limit {
            break;
        }
        end += word.len();
        ends.push(end);
    }

    // Word counts do not always add up to the count of the joined text
    while let Some(&end) = ends.last() {
        if count_tokens(&text[..end]) <= limit {
            return text[..end].to_string();
        }
        ends.pop();
    }
    String::new()
}

#[async_trait::async_trait]
impl ChatBackend for EchoBackend {
    fn name(&self) -> &str {
        "echo"
    }

    async fn send(&self, request: ChatRequest, mode: DeliveryMode) -> BackendResult<BackendReply> {
        let reply = self.reply_for(&request)?;

        debug!(
            model = %request.model,
            messages = request.messages.len(),
            mode = %mode,
            "Echo backend answering"
        );

        match mode {
            DeliveryMode::Blocking => {
                let usage = TokenUsage::new(
                    to_u32(count_message_tokens(&request.messages)),
                    to_u32(count_tokens(&reply)),
                );
                Ok(BackendReply::Complete { text: reply, usage })
            }
            DeliveryMode::Streaming => {
                let fragments: Vec<BackendResult<String>> = reply
                    .split_inclusive(' ')
                    .map(|word| Ok(word.to_string()))
                    .collect();
                Ok(BackendReply::Stream(stream::iter(fragments).boxed()))
            }
        }
    }
}
