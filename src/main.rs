//! Comment Responder CLI - main entry point
//!
//! Watches one Facebook post and answers new comments with Gemini.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use comment_responder::config::DEFAULT_LOG_LINES;
use comment_responder::{commands, metrics, Config, Error, LogBuffer};

#[derive(Parser)]
#[command(name = "comment_responder")]
#[command(about = "Facebook comment auto-responder powered by Gemini", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to a YAML config file (defaults to config.yml or ../config.yml)
    #[arg(long, env = "CONFIG_PATH")]
    config: Option<PathBuf>,

    /// Port for the status endpoint (overrides config and PORT)
    #[arg(long)]
    port: Option<u16>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll the post and reply forever (default)
    Run,

    /// Run a single polling cycle and print what happened
    Once,

    /// Generate a reply for TEXT without touching Facebook
    Reply {
        /// Comment text to answer
        text: String,
    },

    /// Validate config, probe the store and fetch comments once
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env for local development
    let _ = dotenvy::dotenv();

    let logs = LogBuffer::new(DEFAULT_LOG_LINES);
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer())
        .with(fmt::layer().with_ansi(false).with_writer(logs.clone()))
        .init();

    let cli = Cli::parse();

    let mut config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(Error::ConfigurationMissing(key)) => {
            error!("Missing required configuration: {}", key);
            anyhow::bail!("missing required configuration: {}", key);
        }
        Err(err) => return Err(err.into()),
    };
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    metrics::init_collectors();
    execute_command(cli.command.unwrap_or(Commands::Run), &config, logs).await
}

async fn execute_command(command: Commands, config: &Config, logs: LogBuffer) -> anyhow::Result<()> {
    match command {
        Commands::Run => {
            commands::autoreply::run(config, logs).await?;
        }
        Commands::Once => {
            let report = commands::autoreply::once(config).await?;
            commands::autoreply::print_report(&report);
        }
        Commands::Reply { text } => {
            let reply = commands::reply::run(config, &text).await?;
            commands::reply::print_reply(&reply);
        }
        Commands::Check => {
            let summary = commands::check::run(config).await?;
            commands::check::print_summary(config, &summary);
        }
    }
    Ok(())
}
