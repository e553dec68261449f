//! Dedup store: which comment ids have already been handled.
//!
//! Two backends share the [`ProcessedStore`] trait. The backend is chosen once
//! at startup by [`connect`]; an unreachable MySQL server degrades to the
//! in-memory store instead of stopping the process.

pub mod memory;
pub mod mysql;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::StoreSettings;
use crate::Result;

pub use memory::MemoryStore;
pub use mysql::MySqlStore;

/// Which kind of store is backing the dedup state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// Survives restarts.
    Durable,
    /// Process memory only.
    Volatile,
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreBackend::Durable => write!(f, "durable"),
            StoreBackend::Volatile => write!(f, "volatile"),
        }
    }
}

#[async_trait]
pub trait ProcessedStore: Send + Sync {
    /// True iff a record exists for `comment_id`.
    async fn is_processed(&self, comment_id: &str) -> Result<bool>;

    /// Record `comment_id`. Recording an id twice is not an error.
    async fn mark_processed(&self, comment_id: &str) -> Result<()>;

    fn backend(&self) -> StoreBackend;
}

/// Pick the dedup backend for this process.
pub async fn connect(settings: &StoreSettings) -> Arc<dyn ProcessedStore> {
    let Some(url) = settings.mysql_url.as_deref() else {
        info!("No MYSQL_URL configured, keeping processed comments in memory");
        return Arc::new(MemoryStore::new());
    };

    match MySqlStore::connect(url, &settings.table, settings.connect_timeout).await {
        Ok(store) => {
            info!(table = %settings.table, "Connected to MySQL dedup store");
            Arc::new(store)
        }
        Err(e) => {
            warn!(
                error = %e,
                "Durable store unavailable, running in volatile memory mode; \
                 replies may repeat after a restart"
            );
            Arc::new(MemoryStore::new())
        }
    }
}
