//! Client-side token estimation
//!
//! Uses tiktoken's cl100k_base encoding. The engine itself never estimates
//! usage for real providers (streaming exchanges report none); this is only
//! for offline backends that have to synthesize provider-like counts.

use crate::message::Message;
use std::sync::LazyLock;
use tiktoken_rs::{cl100k_base, CoreBPE};

/// Role marker and separators added per message
const MESSAGE_OVERHEAD: usize = 4;

/// Reply priming added once per conversation
const CONVERSATION_OVERHEAD: usize = 3;

/// Global tokenizer instance (initialized once, thread-safe)
static TOKENIZER: LazyLock<Option<CoreBPE>> = LazyLock::new(|| cl100k_base().ok());

/// Count tokens in a string
///
/// Falls back to a four-characters-per-token estimate if the encoder
/// could not be loaded.
#[must_use]
pub fn count_tokens(text: &str) -> usize {
    match TOKENIZER.as_ref() {
        Some(bpe) => bpe.encode_with_special_tokens(text).len(),
        None => text.chars().count().div_ceil(4),
    }
}

/// Count tokens for a whole outbound conversation
#[must_use]
pub fn count_message_tokens(messages: &[Message]) -> usize {
    messages
        .iter()
        .map(|m| count_tokens(&m.content) + MESSAGE_OVERHEAD)
        .sum::<usize>()
        + CONVERSATION_OVERHEAD
}

/// Saturating conversion for usage reporting
#[must_use]
pub fn to_u32(count: usize) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX)
}
