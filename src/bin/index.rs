//! Corpus indexing binary
//!
//! Walks the papers directory, ingests every PDF, and persists the chunk
//! index. Run with: cargo run --bin paper-rag-index

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use walkdir::WalkDir;

use paper_rag::{
    config::AppConfig,
    ingestion::Ingestor,
    providers::{EmbeddingProvider, OpenAiClient},
    retrieval::VectorIndex,
    storage::ChunkStore,
};

#[derive(Parser)]
#[command(name = "paper-rag-index", about = "Index a directory of PDF papers")]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory of PDFs, overriding the configured papers_dir
    #[arg(short, long)]
    papers: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "paper_rag=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = AppConfig::load(args.config.as_deref())?;
    let papers_dir = args.papers.unwrap_or_else(|| config.paths.papers_dir.clone());

    let mut pdfs: Vec<PathBuf> = WalkDir::new(&papers_dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension()
                .map(|ext| ext.eq_ignore_ascii_case("pdf"))
                .unwrap_or(false)
        })
        .collect();
    pdfs.sort();

    if pdfs.is_empty() {
        anyhow::bail!("no PDF files found under {}", papers_dir.display());
    }
    tracing::info!("Found {} PDFs under {}", pdfs.len(), papers_dir.display());

    let api_key = config.api_key()?;
    let store = Arc::new(ChunkStore::open(&config.paths.index_db)?);
    let index = Arc::new(VectorIndex::from_store(&store)?);
    let embedder: Arc<dyn EmbeddingProvider> =
        Arc::new(OpenAiClient::new(&config.models, api_key)?);
    let ingestor = Ingestor::new(config, embedder, Arc::clone(&store), Arc::clone(&index));

    let bar = ProgressBar::new(pdfs.len() as u64).with_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}")
            .expect("valid progress template"),
    );

    let mut failures = 0usize;
    for path in &pdfs {
        bar.set_message(
            path.file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
        );
        match ingestor.ingest_file(path).await {
            Ok(stats) => {
                tracing::info!(
                    file = stats.source_file,
                    pages = stats.pages,
                    chunks = stats.chunks,
                    "indexed"
                );
            }
            Err(e) => {
                failures += 1;
                tracing::error!("failed to index {}: {}", path.display(), e);
            }
        }
        bar.inc(1);
    }
    bar.finish_and_clear();

    println!(
        "Indexed {} of {} PDFs ({} chunks total)",
        pdfs.len() - failures,
        pdfs.len(),
        index.len()
    );

    if failures > 0 {
        anyhow::bail!("{} PDFs failed to index", failures);
    }
    Ok(())
}
