//! Shared application state

use parking_lot::RwLock;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::Result;
use crate::eventlog::EventLog;
use crate::ingestion::Ingestor;
use crate::pipeline::Pipeline;
use crate::providers::{EmbeddingProvider, LlmProvider, OpenAiClient};
use crate::retrieval::VectorIndex;
use crate::storage::ChunkStore;

/// Shared application state, cheap to clone
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    pipeline: Pipeline,
    ingestor: Ingestor,
    store: Arc<ChunkStore>,
    events: EventLog,
    ready: RwLock<bool>,
}

impl AppState {
    /// Wire up the store, index, providers, pipeline, and event log.
    pub fn new(config: AppConfig) -> Result<Self> {
        let api_key = config.api_key()?;

        let store = Arc::new(ChunkStore::open(&config.paths.index_db)?);
        let index = Arc::new(VectorIndex::from_store(&store)?);
        tracing::info!(chunks = index.len(), "vector index loaded");

        let client = Arc::new(OpenAiClient::new(&config.models, api_key)?);
        let embedder: Arc<dyn EmbeddingProvider> = client.clone();
        let llm: Arc<dyn LlmProvider> = client;

        let pipeline = Pipeline::new(
            config.clone(),
            embedder.clone(),
            llm,
            Arc::clone(&index),
        );
        let ingestor = Ingestor::new(config.clone(), embedder, Arc::clone(&store), index);
        let events = EventLog::open(&config.paths.logs_dir)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pipeline,
                ingestor,
                store,
                events,
                ready: RwLock::new(true),
            }),
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.inner.pipeline
    }

    pub fn ingestor(&self) -> &Ingestor {
        &self.inner.ingestor
    }

    pub fn store(&self) -> &Arc<ChunkStore> {
        &self.inner.store
    }

    pub fn events(&self) -> &EventLog {
        &self.inner.events
    }

    pub fn is_ready(&self) -> bool {
        *self.inner.ready.read()
    }

    pub fn set_ready(&self, ready: bool) {
        *self.inner.ready.write() = ready;
    }
}
