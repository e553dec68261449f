//! Durable dedup store backed by a MySQL table.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use mysql_async::{params, prelude::Queryable, Opts, Pool};
use tokio::time::timeout;

use super::{ProcessedStore, StoreBackend};
use crate::{Error, Result};

/// MySQL-backed processed-comments table.
#[derive(Clone)]
pub struct MySqlStore {
    pool: Pool,
    table: String,
    /// Deadline for each lookup or insert after startup.
    op_timeout: Duration,
}

impl std::fmt::Debug for MySqlStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlStore")
            .field("table", &self.table)
            .finish_non_exhaustive()
    }
}

impl MySqlStore {
    /// Connect, ping and create the table, all within `connect_timeout`.
    pub async fn connect(url: &str, table: &str, connect_timeout: Duration) -> Result<Self> {
        validate_table_name(table)?;

        let opts = Opts::from_url(url)
            .map_err(|e| Error::StoreUnavailable(format!("invalid MySQL URL: {}", e)))?;
        let store = Self {
            pool: Pool::new(opts),
            table: table.to_string(),
            op_timeout: connect_timeout,
        };

        match timeout(connect_timeout, store.probe()).await {
            Ok(Ok(())) => Ok(store),
            Ok(Err(e)) => {
                store.disconnect().await;
                Err(Error::StoreUnavailable(e.to_string()))
            }
            Err(_) => {
                store.disconnect().await;
                Err(Error::StoreUnavailable(format!(
                    "no response within {}s",
                    connect_timeout.as_secs()
                )))
            }
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Liveness probe plus schema setup; runs once at startup.
    async fn probe(&self) -> Result<()> {
        let mut conn = self.pool.get_conn().await?;
        conn.ping().await?;
        conn.query_drop(create_table_sql(&self.table)).await?;
        Ok(())
    }

    async fn disconnect(&self) {
        let _ = self.pool.clone().disconnect().await;
    }

    /// Run a store operation under `op_timeout`.
    async fn bounded<T, F>(&self, operation: &str, fut: F) -> Result<T>
    where
        F: std::future::Future<Output = Result<T>>,
    {
        match timeout(self.op_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(Error::StoreUnavailable(format!(
                "{} timed out after {}ms",
                operation,
                self.op_timeout.as_millis()
            ))),
        }
    }
}

#[async_trait]
impl ProcessedStore for MySqlStore {
    async fn is_processed(&self, comment_id: &str) -> Result<bool> {
        self.bounded("lookup", async {
            let mut conn = self.pool.get_conn().await?;
            let found: Option<i64> = conn
                .exec_first(
                    format!(
                        "SELECT 1 FROM {} WHERE comment_id = :comment_id LIMIT 1",
                        self.table
                    ),
                    params! { "comment_id" => comment_id },
                )
                .await?;
            Ok(found.is_some())
        })
        .await
    }

    async fn mark_processed(&self, comment_id: &str) -> Result<()> {
        self.bounded("insert", async {
            let mut conn = self.pool.get_conn().await?;
            // INSERT IGNORE swallows duplicate keys from overlapping cycles.
            conn.exec_drop(
                format!(
                    "INSERT IGNORE INTO {} (comment_id, processed_at) VALUES (:comment_id, :processed_at)",
                    self.table
                ),
                params! {
                    "comment_id" => comment_id,
                    "processed_at" => Utc::now().naive_utc(),
                },
            )
            .await?;
            Ok(())
        })
        .await
    }

    fn backend(&self) -> StoreBackend {
        StoreBackend::Durable
    }
}

fn create_table_sql(table: &str) -> String {
    format!(
        r#"
        CREATE TABLE IF NOT EXISTS {} (
            comment_id VARCHAR(191) NOT NULL PRIMARY KEY,
            processed_at DATETIME NOT NULL
        )
    "#,
        table
    )
}

/// Table names are interpolated into SQL, so only `[A-Za-z0-9_]` is allowed.
fn validate_table_name(table: &str) -> Result<()> {
    if !table.is_empty() && table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(())
    } else {
        Err(Error::InvalidArgument(format!(
            "invalid table name: {:?}",
            table
        )))
    }
}
