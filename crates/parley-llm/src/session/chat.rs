//! Chat session - one conversation against one backend

use super::config::SessionConfig;
use super::exchange::{ExchangeContent, ExchangeResult, ExchangeStream};
use crate::backend::ChatBackend;
use crate::completion::{BackendReply, ChatRequest, DeliveryMode};
use crate::conversation::ConversationStore;
use crate::cost::{CostEstimator, UsageTotals};
use crate::error::{BackendError, Result};
use crate::message::Message;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// Runs exchanges against a backend while keeping history and usage.
///
/// Exchanges are strictly sequential. Each one holds the store for its
/// whole lifetime, including while a streamed reply is being consumed, so a
/// concurrent `exchange` waits for the previous one to finish or be dropped.
/// The async inspection and reset methods wait the same way, so calling
/// them from the task that holds an undrained stream never returns. Each has
/// a non-blocking `try_*` counterpart for that case.
pub struct ChatSession {
    backend: Arc<dyn ChatBackend>,
    estimator: CostEstimator,
    config: SessionConfig,
    store: Arc<Mutex<ConversationStore>>,
}

impl ChatSession {
    /// Create a session; fails on invalid configuration
    pub fn new(backend: Arc<dyn ChatBackend>, config: SessionConfig) -> Result<Self> {
        config.validate()?;
        let store = ConversationStore::new(config.max_history);
        Ok(Self {
            backend,
            estimator: CostEstimator::default(),
            config,
            store: Arc::new(Mutex::new(store)),
        })
    }

    /// Price exchanges with a specific estimator
    #[must_use]
    pub fn with_estimator(mut self, estimator: CostEstimator) -> Self {
        self.estimator = estimator;
        self
    }

    /// Active model
    #[must_use]
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Backend name
    #[must_use]
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Session settings
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Send `prompt` and fold the reply back into history.
    ///
    /// The prompt is appended (and history trimmed) before the backend is
    /// called; on failure it stays in history and no assistant message or
    /// usage is recorded. Blocking replies are committed before returning.
    /// Streamed replies are committed when the returned stream is exhausted.
    pub async fn exchange(
        &self,
        prompt: impl Into<String>,
        mode: DeliveryMode,
    ) -> Result<ExchangeResult> {
        let mut store = Arc::clone(&self.store).lock_owned().await;

        store.append_user(prompt);
        let request = ChatRequest::new(&self.config.model)
            .with_messages(store.snapshot())
            .with_max_tokens(self.config.max_tokens);

        debug!(
            backend = self.backend.name(),
            model = %self.config.model,
            mode = %mode,
            messages = request.messages.len(),
            "Starting exchange"
        );

        let reply = match self.backend.send(request, mode).await {
            Ok(reply) => reply,
            Err(err) => {
                warn!(
                    backend = self.backend.name(),
                    error = %err,
                    "Backend request failed"
                );
                return Err(err.into());
            }
        };

        match (mode, reply) {
            (DeliveryMode::Blocking, BackendReply::Complete { text, usage }) => {
                let record = self.estimator.usage_record(&self.config.model, &usage);
                store.append_assistant(text.clone());
                store.record_usage(&record);

                info!(
                    model = %record.model,
                    input_tokens = record.input_tokens,
                    output_tokens = record.output_tokens,
                    cost = record.estimated_cost,
                    "Exchange completed"
                );

                Ok(ExchangeResult {
                    content: ExchangeContent::Text(text),
                    usage: Some(record),
                })
            }
            (DeliveryMode::Streaming, BackendReply::Stream(fragments)) => Ok(ExchangeResult {
                content: ExchangeContent::Stream(ExchangeStream::new(fragments, store)),
                usage: None,
            }),
            (expected, reply) => {
                let err = BackendError::InvalidResponse(format!(
                    "expected a {} reply, got {}",
                    expected,
                    reply.mode()
                ));
                warn!(backend = self.backend.name(), error = %err, "Backend reply mismatch");
                Err(err.into())
            }
        }
    }

    /// Copy of the history.
    ///
    /// Waits for any in-flight exchange, including an undrained stream held
    /// by the caller; see [`try_snapshot`](Self::try_snapshot).
    pub async fn snapshot(&self) -> Vec<Message> {
        self.store.lock().await.snapshot()
    }

    /// Copy of the history, or `None` while an exchange holds the store
    #[must_use]
    pub fn try_snapshot(&self) -> Option<Vec<Message>> {
        self.try_store().map(|store| store.snapshot())
    }

    /// History digest. Waits like [`snapshot`](Self::snapshot).
    pub async fn summary(&self) -> String {
        self.store.lock().await.summary()
    }

    /// History digest, or `None` while an exchange holds the store
    #[must_use]
    pub fn try_summary(&self) -> Option<String> {
        self.try_store().map(|store| store.summary())
    }

    /// Usage digest. Waits like [`snapshot`](Self::snapshot).
    pub async fn usage_summary(&self) -> String {
        self.store.lock().await.usage_summary()
    }

    /// Usage digest, or `None` while an exchange holds the store
    #[must_use]
    pub fn try_usage_summary(&self) -> Option<String> {
        self.try_store().map(|store| store.usage_summary())
    }

    /// Usage totals. Waits like [`snapshot`](Self::snapshot).
    pub async fn totals(&self) -> UsageTotals {
        self.store.lock().await.totals()
    }

    /// Usage totals, or `None` while an exchange holds the store
    #[must_use]
    pub fn try_totals(&self) -> Option<UsageTotals> {
        self.try_store().map(|store| store.totals())
    }

    /// Empty the history; usage is kept.
    ///
    /// Waits for any in-flight exchange, including an undrained stream held
    /// by the caller; see [`try_clear`](Self::try_clear).
    pub async fn clear(&self) {
        self.store.lock().await.clear();
        debug!("Conversation history cleared");
    }

    /// Empty the history unless an exchange holds the store.
    /// Returns whether anything was cleared.
    pub fn try_clear(&self) -> bool {
        let Some(mut store) = self.try_store() else {
            return false;
        };
        store.clear();
        debug!("Conversation history cleared");
        true
    }

    /// Zero usage totals; history is kept. Waits like [`clear`](Self::clear).
    pub async fn reset_usage(&self) {
        self.store.lock().await.reset_usage();
        debug!("Usage totals reset");
    }

    /// Zero usage totals unless an exchange holds the store.
    /// Returns whether the totals were reset.
    pub fn try_reset_usage(&self) -> bool {
        let Some(mut store) = self.try_store() else {
            return false;
        };
        store.reset_usage();
        debug!("Usage totals reset");
        true
    }

    fn try_store(&self) -> Option<MutexGuard<'_, ConversationStore>> {
        self.store.try_lock().ok()
    }
}
