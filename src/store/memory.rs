//! Volatile dedup store kept in process memory.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{ProcessedStore, StoreBackend};
use crate::Result;

/// In-memory stand-in for the processed-comments table. Lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    processed: RwLock<HashMap<String, DateTime<Utc>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// When `comment_id` was first recorded.
    pub async fn processed_at(&self, comment_id: &str) -> Option<DateTime<Utc>> {
        self.processed.read().await.get(comment_id).copied()
    }

    pub async fn len(&self) -> usize {
        self.processed.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.processed.read().await.is_empty()
    }
}

#[async_trait]
impl ProcessedStore for MemoryStore {
    async fn is_processed(&self, comment_id: &str) -> Result<bool> {
        Ok(self.processed.read().await.contains_key(comment_id))
    }

    async fn mark_processed(&self, comment_id: &str) -> Result<()> {
        self.processed
            .write()
            .await
            .entry(comment_id.to_string())
            .or_insert_with(Utc::now);
        Ok(())
    }

    fn backend(&self) -> StoreBackend {
        StoreBackend::Volatile
    }
}
