//! Comment monitor: polls the post, replies to new comments, records them.
//!
//! One cycle is fetch → filter → (generate → publish → record)* and the loop
//! sleeps between cycles. Every failure inside a cycle is logged and the loop
//! carries on; only host termination stops it.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::time::sleep;
use tracing::{error, info, warn};

use super::generator::ReplyGenerator;
use super::{CommentSource, ReplyPublisher};
use crate::config::LoopSettings;
use crate::integrations::facebook::Comment;
use crate::metrics;
use crate::store::ProcessedStore;
use crate::Result;

/// Counters for one cycle.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub fetched: usize,
    pub skipped_own: usize,
    pub skipped_processed: usize,
    pub skipped_stale: usize,
    pub replied: usize,
    pub publish_failures: usize,
    pub store_errors: usize,
}

impl CycleReport {
    /// Comments that went through generation this cycle.
    pub fn attempted(&self) -> usize {
        self.replied + self.publish_failures
    }
}

/// Truncate text for log lines.
fn preview(text: &str) -> String {
    const MAX_CHARS: usize = 50;
    if text.chars().count() <= MAX_CHARS {
        text.to_string()
    } else {
        let head: String = text.chars().take(MAX_CHARS).collect();
        format!("{}...", head)
    }
}

pub struct Responder {
    source: Arc<dyn CommentSource>,
    publisher: Arc<dyn ReplyPublisher>,
    generator: ReplyGenerator,
    store: Arc<dyn ProcessedStore>,
    page_id: String,
    settings: LoopSettings,
}

impl Responder {
    pub fn new(
        source: Arc<dyn CommentSource>,
        publisher: Arc<dyn ReplyPublisher>,
        generator: ReplyGenerator,
        store: Arc<dyn ProcessedStore>,
        page_id: impl Into<String>,
        settings: LoopSettings,
    ) -> Self {
        Self {
            source,
            publisher,
            generator,
            store,
            page_id: page_id.into(),
            settings,
        }
    }

    pub fn store(&self) -> &Arc<dyn ProcessedStore> {
        &self.store
    }

    pub fn settings(&self) -> &LoopSettings {
        &self.settings
    }

    /// Run one full cycle.
    pub async fn run_cycle(&self) -> Result<CycleReport> {
        let mut report = CycleReport::default();

        let comments = match self.source.fetch_comments().await {
            Ok(comments) => comments,
            Err(e) => {
                warn!(error = %e, "Could not fetch comments, skipping this cycle");
                return Ok(report);
            }
        };
        report.fetched = comments.len();

        if comments.is_empty() {
            info!("No comments found");
            return Ok(report);
        }
        info!(count = comments.len(), "Fetched comments");

        let pending = self.filter_new(comments, &mut report).await;
        if pending.is_empty() {
            info!("No new comments to process");
        }

        for comment in pending {
            self.reply_to(&comment, &mut report).await;
        }

        Ok(report)
    }

    /// Drop own, stale and already-processed comments, keeping fetch order.
    async fn filter_new(&self, comments: Vec<Comment>, report: &mut CycleReport) -> Vec<Comment> {
        let now = Utc::now();
        let mut pending = Vec::new();

        for comment in comments {
            if comment.is_from(&self.page_id) {
                report.skipped_own += 1;
                metrics::record_skip("own");
                continue;
            }

            match self.store.is_processed(&comment.id).await {
                Ok(true) => {
                    report.skipped_processed += 1;
                    metrics::record_skip("processed");
                    continue;
                }
                Ok(false) => {}
                Err(e) => {
                    // Unknown state: deferred to the next cycle.
                    warn!(comment_id = %comment.id, error = %e, "Dedup lookup failed, deferring comment");
                    report.store_errors += 1;
                    continue;
                }
            }

            if let Some(max_age) = self.settings.stale_after {
                if comment.is_older_than(max_age, now) {
                    info!(comment_id = %comment.id, "Skipping stale comment without reply");
                    report.skipped_stale += 1;
                    metrics::record_skip("stale");
                    if let Err(e) = self.store.mark_processed(&comment.id).await {
                        warn!(comment_id = %comment.id, error = %e, "Failed to record stale comment");
                        report.store_errors += 1;
                    }
                    continue;
                }
            }

            pending.push(comment);
        }

        pending
    }

    async fn reply_to(&self, comment: &Comment, report: &mut CycleReport) {
        info!(
            comment_id = %comment.id,
            text = %preview(&comment.message),
            "New comment"
        );

        let reply = self.generator.generate(&comment.message).await;
        info!(
            comment_id = %comment.id,
            model = %reply.model,
            reply = %preview(&reply.text),
            "Posting reply"
        );

        match self.publisher.publish(&comment.id, &reply.text).await {
            Ok(()) => {
                info!(comment_id = %comment.id, "Replied to comment");
                report.replied += 1;
                metrics::record_reply(true);
                if let Err(e) = self.store.mark_processed(&comment.id).await {
                    warn!(comment_id = %comment.id, error = %e, "Failed to record processed comment");
                    report.store_errors += 1;
                }
                sleep(self.settings.reply_delay).await;
            }
            Err(e) => {
                // Left unmarked so the next cycle picks it up again.
                error!(comment_id = %comment.id, error = %e, "Failed to post reply");
                report.publish_failures += 1;
                metrics::record_reply(false);
            }
        }
    }

    /// Poll forever. Each cycle runs in its own task so that a panic inside it
    /// is contained; cycles never overlap.
    pub async fn run(self: Arc<Self>) {
        info!(
            poll_interval_secs = self.settings.poll_interval.as_secs(),
            store = %self.store.backend(),
            "Comment responder started"
        );

        loop {
            let started = Instant::now();
            let this = Arc::clone(&self);
            let outcome = tokio::spawn(async move { this.run_cycle().await }).await;

            match outcome {
                Ok(Ok(report)) => {
                    info!(
                        fetched = report.fetched,
                        replied = report.replied,
                        failed = report.publish_failures,
                        skipped_processed = report.skipped_processed,
                        skipped_own = report.skipped_own,
                        skipped_stale = report.skipped_stale,
                        "Cycle finished"
                    );
                    metrics::record_cycle(started.elapsed(), true);
                }
                Ok(Err(e)) => {
                    error!(error = %e, "Cycle failed");
                    metrics::record_cycle(started.elapsed(), false);
                }
                Err(join_err) => {
                    error!(error = %join_err, "Cycle aborted unexpectedly");
                    metrics::record_cycle(started.elapsed(), false);
                }
            }

            info!(
                seconds = self.settings.poll_interval.as_secs(),
                "Waiting before next check"
            );
            if !self.pause(self.settings.poll_interval).await {
                info!("Shutdown requested, stopping comment responder");
                return;
            }
        }
    }

    /// Sleep for `duration`; false when Ctrl-C arrives first.
    async fn pause(&self, duration: Duration) -> bool {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => false,
            _ = sleep(duration) => true,
        }
    }
}
