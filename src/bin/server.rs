//! HTTP server binary
//!
//! Run with: cargo run --bin paper-rag-server

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use paper_rag::{config::AppConfig, server::ApiServer};

#[derive(Parser)]
#[command(name = "paper-rag-server", about = "Serve the paper question-answering API")]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "paper_rag=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = AppConfig::load(args.config.as_deref())?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - Embedding model: {}", config.models.embed_model);
    tracing::info!("  - Chat model: {}", config.models.chat_model);
    tracing::info!("  - Index: {}", config.paths.index_db.display());

    let server = ApiServer::new(config)?;
    server.start().await?;

    Ok(())
}
