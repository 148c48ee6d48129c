//! Tests for conversation module

use super::*;
use crate::cost::{UsageRecord, UsageTotals};
use crate::message::{Message, MessageRole};
use chrono::Utc;
use proptest::prelude::*;

fn contents(store: &ConversationStore) -> Vec<String> {
    store.snapshot().into_iter().map(|m| m.content).collect()
}

fn usage(input: u32, output: u32, cost: f64) -> UsageRecord {
    UsageRecord {
        input_tokens: input,
        output_tokens: output,
        total_tokens: input + output,
        model: "gpt-4o".to_string(),
        estimated_cost: cost,
        fallback_pricing: false,
        timestamp: Utc::now(),
    }
}

#[test]
fn test_store_starts_empty() {
    let store = ConversationStore::default();
    assert!(store.is_empty());
    assert_eq!(store.max_history(), DEFAULT_MAX_HISTORY);
    assert_eq!(store.summary(), EMPTY_HISTORY_SUMMARY);
    assert_eq!(store.usage_summary(), NO_ACTIVITY_SUMMARY);
}

#[test]
fn test_trim_removes_oldest_pair() {
    let mut store = ConversationStore::new(4);
    store.append_user("A1");
    store.append_assistant("B1");
    store.append_user("A2");
    store.append_assistant("B2");
    assert_eq!(store.len(), 4);

    store.append_user("A3");

    assert_eq!(contents(&store), vec!["A2", "B2", "A3"]);
}

#[test]
fn test_trim_keeps_alternation_over_many_exchanges() {
    let mut store = ConversationStore::new(6);
    for i in 0..25 {
        store.append_user(format!("Q{}", i));
        store.append_assistant(format!("R{}", i));
    }

    let history = store.snapshot();
    assert_eq!(history.len(), 6);
    assert_eq!(history[0].content, "Q22");
    for (idx, message) in history.iter().enumerate() {
        let expected = if idx % 2 == 0 {
            MessageRole::User
        } else {
            MessageRole::Assistant
        };
        assert_eq!(message.role, expected);
    }
}

#[test]
fn test_trim_with_odd_bound_removes_whole_pair() {
    let mut store = ConversationStore::new(3);
    store.append_user("A1");
    store.append_assistant("B1");
    store.append_user("A2");
    store.append_assistant("B2");

    // 4 > 3: one pair goes, not a single message
    assert_eq!(contents(&store), vec!["A2", "B2"]);
}

#[test]
fn test_trim_never_leaves_leading_assistant() {
    let mut store = ConversationStore::new(4);
    // A1 never got an answer
    store.append_user("A1");
    store.append_user("A2");
    store.append_assistant("B2");
    store.append_user("A3");
    store.append_assistant("B3");

    let history = store.snapshot();
    assert_eq!(history.first().map(|m| m.role), Some(MessageRole::User));
    // Only the unanswered turn goes; the A2/B2 pair survives
    assert_eq!(contents(&store), vec!["A2", "B2", "A3", "B3"]);
}

#[test]
fn test_dangling_user_turn_at_bound_two() {
    let mut store = ConversationStore::new(2);
    store.append_user("U1");
    store.append_user("U2");
    store.append_assistant("A2");

    assert_eq!(contents(&store), vec!["U2", "A2"]);

    store.append_user("U3");
    assert_eq!(contents(&store), vec!["U3"]);
    store.append_assistant("A3");
    assert_eq!(contents(&store), vec!["U3", "A3"]);
}

#[test]
fn test_bound_of_one_drops_single_messages() {
    let mut store = ConversationStore::new(1);
    store.append_user("A1");
    assert_eq!(contents(&store), vec!["A1"]);

    store.append_assistant("B1");
    assert_eq!(contents(&store), vec!["B1"]);

    store.append_user("A2");
    assert_eq!(contents(&store), vec!["A2"]);
}

#[test]
fn test_bound_of_zero_keeps_nothing() {
    let mut store = ConversationStore::new(0);
    store.append_user("A1");
    assert!(store.is_empty());
    store.append_assistant("B1");
    assert!(store.is_empty());
}

#[test]
fn test_snapshot_is_a_copy() {
    let mut store = ConversationStore::new(10);
    store.append_user("original");

    let mut snapshot = store.snapshot();
    snapshot[0].content = "tampered".to_string();
    snapshot.push(Message::assistant("injected"));

    assert_eq!(contents(&store), vec!["original"]);
}

#[test]
fn test_summary_counts_messages() {
    let mut store = ConversationStore::new(10);
    store.append_user("Hello");
    assert_eq!(store.summary(), "1 message (1 from user)");

    store.append_assistant("Hi");
    store.append_user("How are you?");
    store.append_assistant("Fine");
    assert_eq!(store.summary(), "4 messages (2 from user)");
    assert_eq!(store.user_message_count(), 2);
}

#[test]
fn test_record_usage_accumulates() {
    let mut store = ConversationStore::default();
    store.record_usage(&usage(100, 40, 0.001));
    store.record_usage(&usage(50, 10, 0.0005));

    let totals = store.totals();
    assert_eq!(totals.total_input_tokens, 150);
    assert_eq!(totals.total_output_tokens, 50);
    assert_eq!(totals.exchange_count, 2);
    assert!((totals.total_cost - 0.0015).abs() < 1e-12);
    assert!(store.usage_summary().starts_with("2 exchanges"));
}

#[test]
fn test_clear_keeps_usage() {
    let mut store = ConversationStore::default();
    store.append_user("Q");
    store.append_assistant("A");
    store.record_usage(&usage(10, 5, 0.01));

    store.clear();

    assert!(store.is_empty());
    assert_eq!(store.totals().exchange_count, 1);
}

#[test]
fn test_reset_usage_keeps_history() {
    let mut store = ConversationStore::default();
    store.append_user("Q");
    store.append_assistant("A");
    store.record_usage(&usage(10, 5, 0.01));
    store.record_usage(&usage(7, 3, 0.02));

    store.reset_usage();

    assert_eq!(store.totals(), UsageTotals::default());
    assert_eq!(store.usage_summary(), NO_ACTIVITY_SUMMARY);
    assert_eq!(store.len(), 2);
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #[test]
    fn prop_history_never_exceeds_bound(
        max_history in 0usize..12,
        roles in proptest::collection::vec(any::<bool>(), 0..60),
    ) {
        let mut store = ConversationStore::new(max_history);
        let mut appended = Vec::new();

        for (idx, is_user) in roles.into_iter().enumerate() {
            let content = format!("m{}", idx);
            if is_user {
                store.append_user(content.clone());
            } else {
                store.append_assistant(content.clone());
            }
            appended.push(content);

            prop_assert!(store.len() <= max_history);
            if max_history > 0 {
                prop_assert!(!store.is_empty());
            }

            // Trimming only ever removes from the front
            let kept = contents(&store);
            prop_assert_eq!(&appended[appended.len() - kept.len()..], kept.as_slice());
        }
    }

    #[test]
    fn prop_paired_appends_stay_paired(
        half_bound in 1usize..8,
        exchanges in 0usize..40,
    ) {
        let max_history = half_bound * 2;
        let mut store = ConversationStore::new(max_history);

        for i in 0..exchanges {
            store.append_user(format!("Q{}", i));
            prop_assert_eq!(store.snapshot()[0].role, MessageRole::User);

            store.append_assistant(format!("R{}", i));
            prop_assert_eq!(store.len() % 2, 0);
            prop_assert_eq!(store.snapshot()[0].role, MessageRole::User);
        }
    }

    #[test]
    fn prop_unanswered_turns_keep_user_first(
        max_history in prop_oneof![Just(2usize), Just(4usize)],
        answered in proptest::collection::vec(any::<bool>(), 1..40),
    ) {
        let mut store = ConversationStore::new(max_history);

        for (i, has_reply) in answered.into_iter().enumerate() {
            store.append_user(format!("Q{}", i));
            prop_assert!(store.len() <= max_history);
            prop_assert_eq!(store.snapshot()[0].role, MessageRole::User);

            if has_reply {
                store.append_assistant(format!("R{}", i));
                prop_assert!(store.len() <= max_history);
                let history = store.snapshot();
                prop_assert_eq!(history[0].role, MessageRole::User);
                // The newest reply keeps its question
                prop_assert_eq!(&history[history.len() - 2].content, &format!("Q{}", i));
            }
        }
    }
}
