//! Preflight check: config, dedup store and comment source.

use crate::config::Config;
use crate::error::Result;
use crate::integrations::GraphClient;
use crate::responder::CommentSource;
use crate::store::{self, StoreBackend};

/// What `check` found.
#[derive(Debug)]
pub struct CheckSummary {
    pub post_id: String,
    pub store_backend: StoreBackend,
    pub comments: Result<usize>,
}

pub async fn run(config: &Config) -> Result<CheckSummary> {
    let store = store::connect(&config.store).await;
    let graph = GraphClient::new(config.facebook.clone(), config.schedule.http_timeout)?;
    let comments = graph.fetch_comments().await.map(|c| c.len());

    Ok(CheckSummary {
        post_id: config.facebook.full_post_id(),
        store_backend: store.backend(),
        comments,
    })
}

pub fn print_summary(config: &Config, summary: &CheckSummary) {
    println!("Post:         {}", summary.post_id);
    println!("Model tiers:  {}", config.gemini.models.join(" -> "));
    println!("Dedup store:  {}", summary.store_backend);
    if config.store.mysql_url.is_some() && summary.store_backend == StoreBackend::Volatile {
        println!("              (MYSQL_URL set but unreachable)");
    }
    match &summary.comments {
        Ok(count) => println!("Comments:     {} on first page", count),
        Err(e) => println!("Comments:     unavailable ({})", e),
    }
}
