//! Chat backends
//!
//! A backend is the boundary with vendor transport and credentials: it takes
//! an ordered message list and returns either a complete reply with usage or
//! a stream of text fragments. The engine never talks to a network itself.
//!
//! # Module Structure
//!
//! - `mock`: Scripted backend for tests
//! - `echo`: Offline backend that answers locally

mod echo;
mod mock;

pub use echo::{EchoBackend, DEFAULT_ECHO_PREFIX};
pub use mock::MockBackend;

use crate::completion::{BackendReply, ChatRequest, DeliveryMode};
use crate::error::BackendResult;

/// Trait for chat backends
#[async_trait::async_trait]
pub trait ChatBackend: Send + Sync {
    /// Backend name, for logs
    fn name(&self) -> &str {
        "backend"
    }

    /// Submit a conversation.
    ///
    /// For [`DeliveryMode::Blocking`] this must return
    /// [`BackendReply::Complete`]; for [`DeliveryMode::Streaming`],
    /// [`BackendReply::Stream`].
    async fn send(&self, request: ChatRequest, mode: DeliveryMode) -> BackendResult<BackendReply>;
}
