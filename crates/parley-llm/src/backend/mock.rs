//! Mock chat backend for testing
//!
//! Replies are queued ahead of time and handed out in order. Every request is
//! recorded, and each stream it opens holds a lease so tests can check that
//! the stream was released.

use super::ChatBackend;
use crate::completion::{BackendReply, ChatRequest, DeliveryMode, TokenUsage};
use crate::error::{BackendError, BackendResult};
use futures::stream::{self, StreamExt};

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Reply used when the queue is empty
const DEFAULT_REPLY: &str = "mock response";

enum MockReply {
    Text { text: String, usage: TokenUsage },
    Fragments(Vec<String>),
    Interrupted { fragments: Vec<String>, error: BackendError },
    Fail(BackendError),
}

/// Counts a stream as open until dropped
struct StreamLease(Arc<AtomicUsize>);

impl StreamLease {
    fn acquire(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(counter))
    }
}

impl Drop for StreamLease {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// A mock backend that returns queued replies or a default one.
#[derive(Default)]
pub struct MockBackend {
    replies: Mutex<VecDeque<MockReply>>,
    requests: Mutex<Vec<(ChatRequest, DeliveryMode)>>,
    open_streams: Arc<AtomicUsize>,
}

impl MockBackend {
    /// Create a new mock backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply with usage. Streamed word by word in streaming mode.
    pub fn push_reply(&self, text: impl Into<String>, input_tokens: u32, output_tokens: u32) {
        self.push(MockReply::Text {
            text: text.into(),
            usage: TokenUsage::new(input_tokens, output_tokens),
        });
    }

    /// Queue explicit fragments. Joined, with zero usage, in blocking mode.
    pub fn push_fragments<I, S>(&self, fragments: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push(MockReply::Fragments(
            fragments.into_iter().map(Into::into).collect(),
        ));
    }

    /// Queue a stream that fails after yielding `fragments`
    pub fn push_interrupted<I, S>(&self, fragments: I, error: BackendError)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push(MockReply::Interrupted {
            fragments: fragments.into_iter().map(Into::into).collect(),
            error,
        });
    }

    /// Queue a failure
    pub fn push_error(&self, error: BackendError) {
        self.push(MockReply::Fail(error));
    }

    /// Every request received, in order
    #[must_use]
    pub fn requests(&self) -> Vec<(ChatRequest, DeliveryMode)> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Number of requests received
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Streams handed out and not yet dropped
    #[must_use]
    pub fn open_streams(&self) -> usize {
        self.open_streams.load(Ordering::SeqCst)
    }

    fn push(&self, reply: MockReply) {
        self.replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(reply);
    }

    fn next_reply(&self) -> MockReply {
        self.replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or_else(|| MockReply::Text {
                text: DEFAULT_REPLY.to_string(),
                usage: TokenUsage::default(),
            })
    }

    fn stream_of(&self, items: Vec<BackendResult<String>>) -> BackendReply {
        let lease = StreamLease::acquire(&self.open_streams);
        let fragments = stream::iter(items).map(move |item| {
            let _held = &lease;
            item
        });
        BackendReply::Stream(fragments.boxed())
    }
}

/// Split text into word fragments, keeping the whitespace
fn split_words(text: &str) -> Vec<String> {
    text.split_inclusive(' ').map(str::to_string).collect()
}

#[async_trait::async_trait]
impl ChatBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    async fn send(&self, request: ChatRequest, mode: DeliveryMode) -> BackendResult<BackendReply> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((request, mode));

        match (self.next_reply(), mode) {
            (MockReply::Fail(error), _) => Err(error),
            (MockReply::Text { text, usage }, DeliveryMode::Blocking) => {
                Ok(BackendReply::Complete { text, usage })
            }
            (MockReply::Text { text, .. }, DeliveryMode::Streaming) => {
                Ok(self.stream_of(split_words(&text).into_iter().map(Ok).collect()))
            }
            (MockReply::Fragments(fragments), DeliveryMode::Blocking) => {
                Ok(BackendReply::Complete {
                    text: fragments.concat(),
                    usage: TokenUsage::default(),
                })
            }
            (MockReply::Fragments(fragments), DeliveryMode::Streaming) => {
                Ok(self.stream_of(fragments.into_iter().map(Ok).collect()))
            }
            (MockReply::Interrupted { error, .. }, DeliveryMode::Blocking) => Err(error),
            (MockReply::Interrupted { fragments, error }, DeliveryMode::Streaming) => {
                let mut items: Vec<_> = fragments.into_iter().map(Ok).collect();
                items.push(Err(error));
                Ok(self.stream_of(items))
            }
        }
    }
}
