//! Exchange results
//!
//! Blocking and streaming exchanges share one result type. A streaming
//! result carries an [`ExchangeStream`], which owns the session's store until
//! it finishes: the reply is committed as a single assistant message once the
//! last fragment has been consumed, and nothing is committed if the stream
//! errors or is dropped early.

use crate::completion::FragmentStream;
use crate::conversation::ConversationStore;
use crate::cost::UsageRecord;
use crate::error::{Error, Result};
use futures::stream::{FusedStream, Stream, StreamExt};
use std::fmt;
use std::pin::Pin;
use std::task::{ready, Context, Poll};
use tokio::sync::OwnedMutexGuard;
use tracing::{debug, warn};

/// Outcome of one exchange
#[derive(Debug)]
pub struct ExchangeResult {
    /// Reply content
    pub content: ExchangeContent,
    /// Usage, only for blocking exchanges
    pub usage: Option<UsageRecord>,
}

impl ExchangeResult {
    /// Whether the content still has to be streamed
    #[must_use]
    pub fn is_streaming(&self) -> bool {
        self.content.is_streaming()
    }

    /// Full reply text, draining the stream if there is one
    pub async fn into_text(self) -> Result<String> {
        match self.content {
            ExchangeContent::Text(text) => Ok(text),
            ExchangeContent::Stream(mut stream) => {
                let mut text = String::new();
                while let Some(fragment) = stream.next().await {
                    text.push_str(&fragment?);
                }
                Ok(text)
            }
        }
    }
}

/// Reply content
pub enum ExchangeContent {
    /// Complete reply (blocking)
    Text(String),
    /// Fragments still to come (streaming)
    Stream(ExchangeStream),
}

impl ExchangeContent {
    /// Whether this is a stream
    #[must_use]
    pub fn is_streaming(&self) -> bool {
        matches!(self, Self::Stream(_))
    }
}

impl fmt::Debug for ExchangeContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Stream(stream) => f.debug_tuple("Stream").field(stream).finish(),
        }
    }
}

/// Streamed reply that commits itself to history when exhausted
pub struct ExchangeStream {
    fragments: FragmentStream,
    buffer: String,
    received: usize,
    store: Option<OwnedMutexGuard<ConversationStore>>,
    finished: bool,
}

impl ExchangeStream {
    pub(crate) fn new(fragments: FragmentStream, store: OwnedMutexGuard<ConversationStore>) -> Self {
        Self {
            fragments,
            buffer: String::new(),
            received: 0,
            store: Some(store),
            finished: false,
        }
    }

    /// Fragments yielded so far
    #[must_use]
    pub fn fragments_received(&self) -> usize {
        self.received
    }

    /// Close the transport stream and release the store.
    fn finish(&mut self) {
        self.finished = true;
        self.fragments = futures::stream::empty().boxed();
        self.store = None;
    }
}

impl Stream for ExchangeStream {
    type Item = Result<String>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.finished {
            return Poll::Ready(None);
        }

        match ready!(this.fragments.poll_next_unpin(cx)) {
            Some(Ok(fragment)) => {
                this.received += 1;
                this.buffer.push_str(&fragment);
                Poll::Ready(Some(Ok(fragment)))
            }
            Some(Err(err)) => {
                warn!(
                    error = %err,
                    fragments = this.received,
                    "Stream failed, assistant turn not committed"
                );
                this.finish();
                Poll::Ready(Some(Err(Error::Backend(err))))
            }
            None => {
                if let Some(store) = this.store.as_mut() {
                    store.append_assistant(std::mem::take(&mut this.buffer));
                    debug!(
                        fragments = this.received,
                        history = store.len(),
                        "Streamed reply committed"
                    );
                }
                this.finish();
                Poll::Ready(None)
            }
        }
    }
}

impl FusedStream for ExchangeStream {
    fn is_terminated(&self) -> bool {
        self.finished
    }
}

impl Drop for ExchangeStream {
    fn drop(&mut self) {
        if !self.finished {
            debug!(
                fragments = self.received,
                "Stream abandoned, assistant turn not committed"
            );
        }
    }
}

impl fmt::Debug for ExchangeStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExchangeStream")
            .field("received", &self.received)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}
