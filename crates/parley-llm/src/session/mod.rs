//! Session - exchange orchestration
//!
//! # Module Structure
//!
//! - `config`: SessionConfig
//! - `chat`: ChatSession
//! - `exchange`: ExchangeResult and the committing ExchangeStream

mod chat;
mod config;
mod exchange;


pub use chat::ChatSession;
pub use config::SessionConfig;
pub use exchange::{ExchangeContent, ExchangeResult, ExchangeStream};
