//! Prometheus metrics for the comment responder.
//!
//! Exposes:
//! - `comment_responder_cycles_total` (counter with status)
//! - `comment_responder_cycle_duration_seconds` (histogram)
//! - `comment_responder_replies_total` (counter with status)
//! - `comment_responder_generations_total` (counter with model)
//! - `comment_responder_skipped_total` (counter with reason)
//! - process metrics via `process` collector

use std::time::Duration;

use once_cell::sync::Lazy;
use prometheus::process_collector::ProcessCollector;
use prometheus::{
    default_registry, register_histogram, register_int_counter_vec, Encoder, Histogram,
    IntCounterVec, TextEncoder,
};
use tracing::warn;

static PROCESS_COLLECTOR: Lazy<()> = Lazy::new(|| {
    if let Err(err) = default_registry().register(Box::new(ProcessCollector::for_self())) {
        warn!("Failed to register process collector: {}", err);
    }
});

static CYCLE_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "comment_responder_cycles_total",
        "Polling cycles by status",
        &["status"]
    )
    .expect("failed to register cycle counter")
});

static CYCLE_DURATION: Lazy<Histogram> = Lazy::new(|| {
    // Exponential buckets from 100ms up to ~7 minutes.
    let buckets =
        prometheus::exponential_buckets(0.1, 2.0, 13).expect("failed to create histogram buckets");
    register_histogram!(
        "comment_responder_cycle_duration_seconds",
        "Polling cycle duration in seconds",
        buckets
    )
    .expect("failed to register cycle duration histogram")
});

static REPLY_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "comment_responder_replies_total",
        "Reply publish attempts by status",
        &["status"]
    )
    .expect("failed to register reply counter")
});

static GENERATION_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "comment_responder_generations_total",
        "Generated replies by the model tier that produced them",
        &["model"]
    )
    .expect("failed to register generation counter")
});

static SKIPPED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "comment_responder_skipped_total",
        "Comments skipped without a reply, by reason",
        &["reason"]
    )
    .expect("failed to register skip counter")
});

/// Ensure collectors are registered.
pub fn init_collectors() {
    Lazy::force(&PROCESS_COLLECTOR);
    Lazy::force(&CYCLE_TOTAL);
    Lazy::force(&CYCLE_DURATION);
    Lazy::force(&REPLY_TOTAL);
    Lazy::force(&GENERATION_TOTAL);
    Lazy::force(&SKIPPED_TOTAL);
}

/// Record a finished polling cycle.
pub fn record_cycle(duration: Duration, success: bool) {
    CYCLE_DURATION.observe(duration.as_secs_f64());
    CYCLE_TOTAL
        .with_label_values(&[if success { "ok" } else { "error" }])
        .inc();
}

/// Record a publish attempt.
pub fn record_reply(published: bool) {
    REPLY_TOTAL
        .with_label_values(&[if published { "published" } else { "failed" }])
        .inc();
}

/// Record which tier produced a reply (`none` for the fallback).
pub fn record_generation(model: &str) {
    GENERATION_TOTAL.with_label_values(&[model]).inc();
}

/// Record a comment skipped for `reason` (`own`, `processed`, `stale`).
pub fn record_skip(reason: &str) {
    SKIPPED_TOTAL.with_label_values(&[reason]).inc();
}

/// Render every registered metric in the Prometheus text format.
pub fn render() -> prometheus::Result<(String, Vec<u8>)> {
    init_collectors();
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&prometheus::gather(), &mut buffer)?;
    Ok((encoder.format_type().to_string(), buffer))
}
