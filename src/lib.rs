//! Facebook Comment Auto-Responder Library
//!
//! This library provides tools to:
//! - Poll a Facebook post for new comments via the Graph API
//! - Generate short replies with Gemini, falling back across model tiers
//! - Remember replied comments in MySQL (or in memory when MySQL is down)
//! - Expose liveness, recent logs and Prometheus metrics over HTTP

pub mod config;
pub mod error;
pub mod integrations;
pub mod log_buffer;
pub mod metrics;
pub mod prompts;
pub mod responder;
pub mod status;
pub mod store;

// Re-export common types
pub use config::Config;
pub use error::{Error, Result};
pub use integrations::{Comment, GeminiClient, GraphClient};
pub use log_buffer::LogBuffer;
pub use prompts::{load_prompt, ReplyPrompt};
pub use responder::{CycleReport, GeneratedReply, ReplyGenerator, Responder};
pub use store::{ProcessedStore, StoreBackend};

// Commands module uses re-exported types, so it must be declared after the re-exports
pub mod commands;
