//! Vector retrieval over the chunk index

pub mod search;

pub use search::{cosine_similarity, should_abstain, Retrieved, VectorIndex};
