//! Offline evaluation binary
//!
//! Runs the router, retrieval, and (optionally) end-to-end grounding
//! metrics over a JSONL file of labeled queries and writes results.json.
//! Run with: cargo run --bin paper-rag-eval -- --labels data/labels.jsonl

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use paper_rag::{
    config::AppConfig,
    evaluation::{evaluate_grounding, evaluate_retrieval, evaluate_router, load_labeled_queries},
    pipeline::Pipeline,
    providers::{EmbeddingProvider, LlmProvider, OpenAiClient},
    retrieval::VectorIndex,
    storage::ChunkStore,
};

#[derive(Parser)]
#[command(name = "paper-rag-eval", about = "Evaluate routing, retrieval, and grounding")]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSONL file of labeled queries
    #[arg(short, long)]
    labels: PathBuf,

    /// Also run end-to-end grounding metrics (calls the chat model)
    #[arg(long)]
    grounding: bool,

    /// Where to write the metrics JSON
    #[arg(short, long, default_value = "results.json")]
    output: PathBuf,
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
    let queries = load_labeled_queries(&args.labels)?;
    tracing::info!("Loaded {} labeled queries", queries.len());

    let router = evaluate_router(&queries);
    println!(
        "Router accuracy: {:.3} ({}/{} labeled)",
        router.accuracy, router.correct, router.labeled
    );

    let api_key = config.api_key()?;
    let store = ChunkStore::open(&config.paths.index_db)?;
    let index = Arc::new(VectorIndex::from_store(&store)?);
    if index.is_empty() {
        anyhow::bail!(
            "index at {} is empty; run paper-rag-index first",
            config.paths.index_db.display()
        );
    }

    let client = Arc::new(OpenAiClient::new(&config.models, api_key)?);
    let embedder: Arc<dyn EmbeddingProvider> = client.clone();

    let retrieval =
        evaluate_retrieval(&queries, &embedder, &index, &config.evaluation.k_values).await?;
    for (k, recall) in &retrieval.recall_at_k {
        println!("Recall@{}: {:.3}", k, recall);
    }
    println!("MRR: {:.3} ({} labeled)", retrieval.mrr, retrieval.labeled);

    let mut results = serde_json::json!({
        "router": router,
        "retrieval": retrieval,
    });

    if args.grounding {
        let llm: Arc<dyn LlmProvider> = client;
        let pipeline = Pipeline::new(config, embedder, llm, index);
        let grounding = evaluate_grounding(&queries, &pipeline).await?;
        println!(
            "Citation coverage: {:.3}, abstention accuracy: {:.3} ({} labeled)",
            grounding.citation_coverage, grounding.abstention_accuracy, grounding.abstain_labeled
        );
        results["grounding"] = serde_json::to_value(&grounding)?;
    }

    std::fs::write(&args.output, serde_json::to_string_pretty(&results)?)?;
    println!("Wrote {}", args.output.display());

    Ok(())
}
