//! Core data types: pages, chunks, queries, and answer payloads

pub mod chunk;
pub mod query;
pub mod response;

pub use chunk::{Chunk, PageText};
pub use query::{Mode, QueryRequest};
pub use response::{AnswerResult, CitedChunk, RetrievedChunk, Verdict};
