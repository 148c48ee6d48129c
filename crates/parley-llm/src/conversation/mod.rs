//! Conversation - bounded message history and usage totals

mod store;

#[cfg(test)]
mod tests;

pub use store::{
    ConversationStore, DEFAULT_MAX_HISTORY, EMPTY_HISTORY_SUMMARY, NO_ACTIVITY_SUMMARY,
};
