//! Bounded conversation history with usage totals

use crate::cost::{format_totals, UsageRecord, UsageTotals};
use crate::message::{Message, MessageRole};
use crate::util::pluralize;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default number of messages kept in history
pub const DEFAULT_MAX_HISTORY: usize = 20;

/// Returned by [`ConversationStore::summary`] when there is no history
pub const EMPTY_HISTORY_SUMMARY: &str = "No conversation history";

/// Returned by [`ConversationStore::usage_summary`] before any exchange
pub const NO_ACTIVITY_SUMMARY: &str = "No usage recorded yet";

/// Ordered message history plus session usage counters.
///
/// History never holds more than `max_history` messages. Trimming runs after
/// every append and removes from the oldest end in user/assistant pairs, so a
/// question is not separated from its answer and the history does not open
/// with an orphaned assistant reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationStore {
    history: Vec<Message>,
    max_history: usize,
    totals: UsageTotals,
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY)
    }
}

impl ConversationStore {
    /// Create an empty store
    #[must_use]
    pub fn new(max_history: usize) -> Self {
        Self {
            history: Vec::new(),
            max_history,
            totals: UsageTotals::default(),
        }
    }

    /// Add a user message
    pub fn append_user(&mut self, content: impl Into<String>) {
        self.append(Message::user(content));
    }

    /// Add an assistant message
    pub fn append_assistant(&mut self, content: impl Into<String>) {
        self.append(Message::assistant(content));
    }

    fn append(&mut self, message: Message) {
        self.history.push(message);
        self.trim_if_needed();
    }

    /// Copy of the history, oldest first
    #[must_use]
    pub fn snapshot(&self) -> Vec<Message> {
        self.history.clone()
    }

    /// Fold a completed exchange's usage into the totals
    pub fn record_usage(&mut self, record: &UsageRecord) {
        self.totals.add(record);
        debug!(
            exchange_count = self.totals.exchange_count,
            total_cost = self.totals.total_cost,
            "Recorded exchange usage"
        );
    }

    /// Empty the history; usage totals are kept
    pub fn clear(&mut self) {
        self.history.clear();
    }

    /// Zero the usage totals; history is kept
    pub fn reset_usage(&mut self) {
        self.totals.reset();
    }

    /// Human-readable digest of the history
    #[must_use]
    pub fn summary(&self) -> String {
        if self.history.is_empty() {
            return EMPTY_HISTORY_SUMMARY.to_string();
        }

        format!(
            "{} ({} from user)",
            pluralize(self.history.len() as u64, "message", "messages"),
            self.user_message_count()
        )
    }

    /// Human-readable digest of the usage totals
    #[must_use]
    pub fn usage_summary(&self) -> String {
        if self.totals.is_empty() {
            return NO_ACTIVITY_SUMMARY.to_string();
        }
        format_totals(&self.totals)
    }

    /// Current usage totals
    #[must_use]
    pub fn totals(&self) -> UsageTotals {
        self.totals
    }

    /// Message count
    #[must_use]
    pub fn len(&self) -> usize {
        self.history.len()
    }

    /// Whether history is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Messages written by the user
    #[must_use]
    pub fn user_message_count(&self) -> usize {
        self.history.iter().filter(|m| m.is_user()).count()
    }

    /// History bound
    #[must_use]
    pub fn max_history(&self) -> usize {
        self.max_history
    }

    /// Trim oldest messages once the bound is exceeded.
    ///
    /// With `max_history >= 2`, removal happens in whole pairs
    /// (`ceil(excess / 2) * 2` messages) when that cut lands on a user turn.
    /// Otherwise the cut moves to the first user turn at or after `excess`,
    /// so the history still opens with a question. Below 2 there is no pair
    /// to keep, so only the excess is dropped.
    fn trim_if_needed(&mut self) {
        let len = self.history.len();
        if len <= self.max_history {
            return;
        }

        let excess = len - self.max_history;
        let remove = if self.max_history < 2 {
            excess
        } else {
            let paired = excess.div_ceil(2) * 2;
            if self.starts_user_turn(paired) {
                paired
            } else {
                // A failed exchange leaves a lone user turn, which shifts the
                // pair boundary onto an assistant reply.
                (excess..len)
                    .find(|&cut| self.starts_user_turn(cut))
                    .unwrap_or(excess)
            }
        };

        self.history.drain(..remove);

        debug!(
            removed = remove,
            remaining = self.history.len(),
            max_history = self.max_history,
            "Trimmed conversation history"
        );
    }

    fn starts_user_turn(&self, index: usize) -> bool {
        self.history
            .get(index)
            .is_some_and(|message| message.role == MessageRole::User)
    }
}
