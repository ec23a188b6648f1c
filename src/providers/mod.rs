//! Provider abstractions for embeddings and chat completion
//!
//! Trait seams keep the pipeline testable with in-process fakes and allow
//! pointing at any OpenAI-compatible endpoint, local or hosted.

pub mod embedding;
pub mod llm;
pub mod openai;

pub use embedding::EmbeddingProvider;
pub use llm::LlmProvider;
pub use openai::OpenAiClient;
