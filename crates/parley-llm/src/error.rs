//! Error types for parley-llm

use thiserror::Error;

/// Failure reported by a [`ChatBackend`](crate::backend::ChatBackend).
///
/// The engine never retries or swallows these; they reach the caller of
/// [`ChatSession::exchange`](crate::session::ChatSession::exchange) wrapped in
/// [`Error::Backend`], either directly or through a stream's error item.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// Credentials rejected by the provider
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Rate limit exceeded
    #[error("rate limit exceeded")]
    RateLimit {
        /// Seconds until retry is allowed
        retry_after: Option<u64>,
    },

    /// Provider refused the request as malformed
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Provider answered with something the engine cannot use
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Network error
    #[error("network error: {0}")]
    Network(String),

    /// Timeout
    #[error("timeout after {0}ms")]
    Timeout(u64),

    /// Any other provider-side failure
    #[error("provider error: {0}")]
    Provider(String),
}

/// Engine error type
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid model selection, pricing table or session settings.
    /// Always raised before a backend is contacted.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The chat backend failed
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
}

impl Error {
    /// Underlying backend failure, if this is one
    #[must_use]
    pub fn backend(&self) -> Option<&BackendError> {
        match self {
            Self::Backend(err) => Some(err),
            Self::Configuration(_) => None,
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Result type returned by backends
pub type BackendResult<T> = std::result::Result<T, BackendError>;
