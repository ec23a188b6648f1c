//! paper-rag: citation-grounded question answering over machine-learning papers
//!
//! The pipeline ingests PDFs into page-aware chunks, retrieves evidence with
//! cosine similarity (optionally MMR-diversified), routes each query into one
//! of four interaction modes, and generates answers that cite exact chunks.
//! When the corpus holds no supporting evidence the system abstains with a
//! fixed refusal instead of fabricating an answer.

pub mod config;
pub mod error;
pub mod evaluation;
pub mod eventlog;
pub mod generation;
pub mod ingestion;
pub mod pipeline;
pub mod providers;
pub mod retrieval;
pub mod routing;
pub mod server;
pub mod storage;
pub mod types;

pub use config::AppConfig;
pub use error::{Error, Result};
pub use generation::prompt::NO_EVIDENCE_ANSWER;
pub use pipeline::Pipeline;
pub use types::{
    chunk::{Chunk, PageText},
    query::{Mode, QueryRequest},
    response::{AnswerResult, CitedChunk, RetrievedChunk, Verdict},
};
