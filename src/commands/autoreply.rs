//! Auto-reply command: wires config into a [`Responder`] and runs it.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::integrations::{GeminiClient, GraphClient};
use crate::log_buffer::LogBuffer;
use crate::prompts::ReplyPrompt;
use crate::responder::{CycleReport, ReplyGenerator, Responder};
use crate::status::{self, StatusState};
use crate::store;

/// Build the reply generator (Gemini backend + prompt + fallback).
pub fn build_generator(config: &Config) -> Result<ReplyGenerator> {
    let gemini = GeminiClient::from_settings(&config.gemini, config.schedule.http_timeout)?;
    let prompt = ReplyPrompt::from_settings(&config.reply)?;
    Ok(
        ReplyGenerator::new(Arc::new(gemini), config.gemini.models.clone(), prompt)
            .with_fallback_reply(config.reply.fallback_reply.clone()),
    )
}

/// Assemble the responder: Graph client, generator and the dedup store.
pub async fn build_responder(config: &Config) -> Result<Responder> {
    let graph = Arc::new(GraphClient::new(
        config.facebook.clone(),
        config.schedule.http_timeout,
    )?);
    let generator = build_generator(config)?;
    let store = store::connect(&config.store).await;

    Ok(Responder::new(
        graph.clone(),
        graph,
        generator,
        store,
        config.facebook.page_id.clone(),
        config.schedule.clone(),
    ))
}

/// Run the responder forever with the status endpoint alongside.
pub async fn run(config: &Config, logs: LogBuffer) -> anyhow::Result<()> {
    info!(
        post_id = %config.facebook.full_post_id(),
        models = ?config.gemini.models,
        "Starting comment responder"
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    let state = StatusState::new(logs, config.server.log_lines);
    if let Err(err) = status::spawn_status_server(addr, state).await {
        // The loop runs without the status endpoint.
        warn!(%addr, "Status endpoint unavailable: {}", err);
    }

    let responder = Arc::new(build_responder(config).await?);
    responder.run().await;
    Ok(())
}

/// Run exactly one cycle and return its report.
pub async fn once(config: &Config) -> Result<CycleReport> {
    let responder = build_responder(config).await?;
    responder.run_cycle().await
}

pub fn print_report(report: &CycleReport) {
    println!("Fetched:            {}", report.fetched);
    println!("Replied:            {}", report.replied);
    println!("Publish failures:   {}", report.publish_failures);
    println!("Already processed:  {}", report.skipped_processed);
    println!("Own comments:       {}", report.skipped_own);
    println!("Stale (no reply):   {}", report.skipped_stale);
    println!("Store errors:       {}", report.store_errors);
}
