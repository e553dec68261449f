//! External integrations module.
//!
//! Provides clients for:
//! - Facebook Graph API (post comments, comment replies)
//! - Google Gemini (text generation)

pub mod facebook;
pub mod gemini;

pub use facebook::{Author, Comment, GraphClient};
pub use gemini::GeminiClient;
