//! Prompt assembly, citation handling, and verdict parsing

pub mod citation;
pub mod prompt;
pub mod verdict;

pub use citation::{
    cited_chunk_ids, extract_citations, format_citation, renumber_for_display, CitationRef,
};
pub use prompt::{PromptBuilder, NO_EVIDENCE_ANSWER};
pub use verdict::parse_verdict;
