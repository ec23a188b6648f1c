//! Configuration for the paper-rag system

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Filesystem layout
    #[serde(default)]
    pub paths: PathsConfig,
    /// Heading-detection heuristics for PDF ingestion
    #[serde(default)]
    pub heading: HeadingConfig,
    /// Chunking configuration
    #[serde(default)]
    pub chunking: ChunkingConfig,
    /// Retrieval configuration
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    /// Embedding and chat model endpoints
    #[serde(default)]
    pub models: ModelsConfig,
    /// Prompt assembly configuration
    #[serde(default)]
    pub prompts: PromptsConfig,
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Evaluation configuration
    #[serde(default)]
    pub evaluation: EvaluationConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file, falling back to defaults when the
    /// file does not exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.unwrap_or_else(|| Path::new("paper-rag.toml"));
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Resolve the API key for the model endpoint from the environment.
    ///
    /// Checked at startup so a missing key fails early rather than on the
    /// first query.
    pub fn api_key(&self) -> Result<String> {
        std::env::var(&self.models.api_key_env).map_err(|_| {
            Error::Config(format!(
                "Missing {} in environment",
                self.models.api_key_env
            ))
        })
    }
}

/// Filesystem layout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory holding the source PDFs
    pub papers_dir: PathBuf,
    /// SQLite database with chunks and embeddings
    pub index_db: PathBuf,
    /// Directory for the query event log
    pub logs_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            papers_dir: PathBuf::from("data/papers"),
            index_db: PathBuf::from("data/index/chunks.db"),
            logs_dir: PathBuf::from("data/logs"),
        }
    }
}

/// Heading-detection heuristics applied per line of extracted page text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadingConfig {
    /// Shortest line considered a heading candidate
    pub min_len: usize,
    /// Longest line considered a heading candidate
    pub max_len: usize,
    /// Maximum word count for a heading candidate
    pub max_words: usize,
    /// Reject candidates ending with a period
    pub require_no_period: bool,
}

impl Default for HeadingConfig {
    fn default() -> Self {
        Self {
            min_len: 4,
            max_len: 80,
            max_words: 12,
            require_no_period: true,
        }
    }
}

/// Word-window chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Target chunk size in words
    pub chunk_words: usize,
    /// Overlap between consecutive chunks in words
    pub overlap_words: usize,
    /// Minimum chunk size; short non-final windows are extended to this
    pub min_chunk_words: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_words: 220,
            overlap_words: 40,
            min_chunk_words: 60,
        }
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Number of chunks to retrieve
    pub k: usize,
    /// Abstain when the best similarity proxy falls below this
    pub min_similarity: f32,
    /// Diversify results with maximal marginal relevance
    pub use_mmr: bool,
    /// MMR parameters
    #[serde(default)]
    pub mmr: MmrConfig,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            k: 6,
            min_similarity: 0.55,
            use_mmr: true,
            mmr: MmrConfig::default(),
        }
    }
}

/// Maximal marginal relevance parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MmrConfig {
    /// Candidate pool size before diversification
    pub fetch_k: usize,
    /// Relevance/diversity balance: 1.0 is pure relevance
    pub lambda_mult: f32,
}

impl Default for MmrConfig {
    fn default() -> Self {
        Self {
            fetch_k: 24,
            lambda_mult: 0.65,
        }
    }
}

/// Embedding and chat model endpoint configuration
///
/// Any OpenAI-compatible endpoint works; point `base_url` at a local server
/// to run fully offline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsConfig {
    /// Base URL of the OpenAI-compatible API
    pub base_url: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Embedding model name
    pub embed_model: String,
    /// Embedding batch size
    pub embed_batch_size: usize,
    /// Chat model name
    pub chat_model: String,
    /// Generation temperature
    pub temperature: f32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Number of retries for failed requests
    pub max_retries: u32,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            embed_model: "text-embedding-3-small".to_string(),
            embed_batch_size: 64,
            chat_model: "gpt-4o-mini".to_string(),
            temperature: 0.0,
            timeout_secs: 60,
            max_retries: 2,
        }
    }
}

/// Prompt assembly configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptsConfig {
    /// Maximum retrieved chunks placed into the context block
    pub max_context_chunks: usize,
}

impl Default for PromptsConfig {
    fn default() -> Self {
        Self {
            max_context_chunks: 6,
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
    /// Maximum upload size in bytes
    pub max_upload_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            enable_cors: true,
            max_upload_size: 50 * 1024 * 1024,
        }
    }
}

/// Evaluation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// K values for Recall@K
    pub k_values: Vec<usize>,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            k_values: vec![1, 3, 5, 10],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = AppConfig::default();
        assert!(cfg.chunking.overlap_words < cfg.chunking.chunk_words);
        assert!(cfg.chunking.min_chunk_words <= cfg.chunking.chunk_words);
        assert!(cfg.retrieval.mmr.fetch_k >= cfg.retrieval.k);
        assert!(cfg.retrieval.min_similarity > 0.0 && cfg.retrieval.min_similarity < 1.0);
    }

    #[test]
    fn partial_toml_overrides_merge_with_defaults() {
        let cfg: AppConfig = toml::from_str(
            r#"
            [retrieval]
            k = 12
            min_similarity = 0.4
            use_mmr = false
            "#,
        )
        .unwrap();
        assert_eq!(cfg.retrieval.k, 12);
        assert!(!cfg.retrieval.use_mmr);
        // Untouched sections keep their defaults
        assert_eq!(cfg.chunking.chunk_words, 220);
        assert_eq!(cfg.models.api_key_env, "OPENAI_API_KEY");
    }

    #[test]
    fn load_missing_file_yields_defaults() {
        let cfg = AppConfig::load(Some(std::path::Path::new("/nonexistent/paper-rag.toml")))
            .unwrap();
        assert_eq!(cfg.retrieval.k, AppConfig::default().retrieval.k);
    }
}
