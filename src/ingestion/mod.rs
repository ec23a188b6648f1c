//! PDF ingestion: parse, chunk, embed, persist

pub mod chunker;
pub mod pdf;

pub use chunker::chunk_pages;
pub use pdf::extract_pages;

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;

use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::providers::EmbeddingProvider;
use crate::retrieval::VectorIndex;
use crate::storage::ChunkStore;

/// Per-file ingestion statistics
#[derive(Debug, Clone, Serialize)]
pub struct IngestStats {
    /// Basename of the ingested PDF
    pub source_file: String,
    /// Pages extracted
    pub pages: usize,
    /// Chunks created and indexed
    pub chunks: usize,
}

/// Ingestor wiring the parser, chunker, embedder, store, and index together
pub struct Ingestor {
    config: AppConfig,
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<ChunkStore>,
    index: Arc<VectorIndex>,
}

impl Ingestor {
    pub fn new(
        config: AppConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<ChunkStore>,
        index: Arc<VectorIndex>,
    ) -> Self {
        Self {
            config,
            embedder,
            store,
            index,
        }
    }

    /// Ingest a PDF from disk.
    pub async fn ingest_file(&self, path: &Path) -> Result<IngestStats> {
        let data = tokio::fs::read(path).await?;
        let source_path = path.to_string_lossy().to_string();
        self.ingest_bytes(&source_path, &data).await
    }

    /// Ingest a PDF from memory.
    ///
    /// Re-ingesting the same source path replaces its chunks; the operation
    /// is idempotent for unchanged input because chunk ids are content-stable.
    pub async fn ingest_bytes(&self, source_path: &str, data: &[u8]) -> Result<IngestStats> {
        let pages = pdf::extract_pages(source_path, data, &self.config.heading)?;
        let chunks = chunker::chunk_pages(&pages, &self.config.chunking);

        if chunks.is_empty() {
            return Err(Error::pdf_parse(source_path, "document produced no chunks"));
        }

        tracing::info!(
            source = source_path,
            pages = pages.len(),
            chunks = chunks.len(),
            "embedding chunks"
        );

        let mut embedded = Vec::with_capacity(chunks.len());
        for batch in chunks.chunks(self.config.models.embed_batch_size.max(1)) {
            let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
            let vectors = self.embedder.embed_batch(&texts).await?;
            if vectors.len() != batch.len() {
                return Err(Error::embedding(format!(
                    "expected {} embeddings, got {}",
                    batch.len(),
                    vectors.len()
                )));
            }
            for (chunk, vector) in batch.iter().zip(vectors) {
                embedded.push((chunk.clone(), vector));
            }
        }

        let source_file = embedded[0].0.source_file.clone();
        self.store
            .replace_document(&source_file, pages.len() as u32, &embedded)?;
        self.index.replace_document(&source_file, embedded);

        Ok(IngestStats {
            source_file,
            pages: pages.len(),
            chunks: chunks.len(),
        })
    }
}
