//! Comment-processing loop and its collaborators.
//!
//! - [`generator`]: model-tier fallback chain that always yields a reply
//! - [`monitor`]: the fetch → filter → reply → record → sleep loop

pub mod generator;
pub mod monitor;

use async_trait::async_trait;

use crate::integrations::facebook::Comment;
use crate::Result;

pub use generator::{GeneratedReply, ReplyGenerator, TextModel, NO_MODEL};
pub use monitor::{CycleReport, Responder};

/// Where comments come from.
#[async_trait]
pub trait CommentSource: Send + Sync {
    /// Current top-level comments, in the order the source returns them.
    async fn fetch_comments(&self) -> Result<Vec<Comment>>;
}

/// Where replies go.
#[async_trait]
pub trait ReplyPublisher: Send + Sync {
    /// Post `message` under `comment_id`. `Ok` only on explicit success.
    async fn publish(&self, comment_id: &str, message: &str) -> Result<()>;
}
