//! Parley LLM - conversation engine
//!
//! This crate provides the conversation core for Parley:
//! - Conversation: bounded, pair-aligned message history with usage totals
//! - Session: blocking and streaming exchanges against a pluggable backend
//! - Cost: per-model pricing table and deterministic cost estimation
//! - Backend: the transport trait, an offline echo backend and a scripted mock
//! - Token: local token estimates for backends that report no usage

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod backend;
pub mod completion;
pub mod conversation;
pub mod cost;
pub mod error;
pub mod message;
pub mod session;
pub mod token;
pub mod util;

pub use backend::{ChatBackend, EchoBackend, MockBackend, DEFAULT_ECHO_PREFIX};
pub use completion::{BackendReply, ChatRequest, DeliveryMode, FragmentStream, TokenUsage};
pub use conversation::{ConversationStore, DEFAULT_MAX_HISTORY};
pub use cost::{
    global_pricing, CostEstimate, CostEstimator, ModelPricing, PricingSource, PricingTable,
    UsageRecord, UsageTotals, DEFAULT_PRICING_MODEL,
};
pub use error::{BackendError, BackendResult, Error, Result};
pub use message::{Message, MessageRole};
pub use session::{ChatSession, ExchangeContent, ExchangeResult, ExchangeStream, SessionConfig};
pub use token::{count_message_tokens, count_tokens};
