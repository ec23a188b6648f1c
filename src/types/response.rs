//! Answer payloads returned by the pipeline

use serde::{Deserialize, Serialize};

use super::chunk::Chunk;
use super::query::Mode;
use crate::generation::prompt::NO_EVIDENCE_ANSWER;

/// Verdict for claim-verification answers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Supported,
    Refuted,
    NotEnoughEvidence,
}

impl Verdict {
    /// Token used in prompts and serialized responses
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Supported => "SUPPORTED",
            Self::Refuted => "REFUTED",
            Self::NotEnoughEvidence => "NOT_ENOUGH_EVIDENCE",
        }
    }
}

/// A retrieved chunk with its similarity score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedChunk {
    pub chunk_id: String,
    pub source_file: String,
    pub page_number: u32,
    pub section_name: String,
    /// Similarity proxy in (0, 1], higher is better
    pub score: f32,
    pub text: String,
}

impl RetrievedChunk {
    /// Build the payload for a retrieved chunk
    pub fn from_chunk(chunk: &Chunk, score: f32) -> Self {
        Self {
            chunk_id: chunk.chunk_id.clone(),
            source_file: chunk.source_file.clone(),
            page_number: chunk.page_number,
            section_name: chunk.section_name.clone(),
            score,
            text: chunk.text.clone(),
        }
    }
}

/// The exact text of a chunk the answer cited
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CitedChunk {
    pub chunk_id: String,
    pub source_file: String,
    pub page_number: u32,
    pub section_name: String,
    pub text: String,
}

impl CitedChunk {
    /// Build the payload for a cited chunk
    pub fn from_chunk(chunk: &Chunk) -> Self {
        Self {
            chunk_id: chunk.chunk_id.clone(),
            source_file: chunk.source_file.clone(),
            page_number: chunk.page_number,
            section_name: chunk.section_name.clone(),
            text: chunk.text.clone(),
        }
    }
}

/// Result of answering a single question
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerResult {
    /// Interaction mode the router selected
    pub mode: Mode,
    /// True when the system refused for lack of evidence
    pub abstained: bool,
    /// Generated answer, or the fixed refusal string when abstaining
    pub answer: String,
    /// Verdict parsed from a claim-verification answer
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub verdict: Option<Verdict>,
    /// Everything retrieval returned, for debugging and evaluation
    pub retrieved: Vec<RetrievedChunk>,
    /// Exact chunks the answer cited; always empty when abstaining
    pub cited_chunks: Vec<CitedChunk>,
}

impl AnswerResult {
    /// Build the abstention result: fixed refusal, no citations.
    pub fn abstained(mode: Mode, retrieved: Vec<RetrievedChunk>) -> Self {
        Self {
            mode,
            abstained: true,
            answer: NO_EVIDENCE_ANSWER.to_string(),
            verdict: None,
            retrieved,
            cited_chunks: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verdict_serializes_to_screaming_snake_case() {
        assert_eq!(
            serde_json::to_string(&Verdict::NotEnoughEvidence).unwrap(),
            "\"NOT_ENOUGH_EVIDENCE\""
        );
        assert_eq!(serde_json::to_string(&Verdict::Supported).unwrap(), "\"SUPPORTED\"");
    }

    #[test]
    fn abstained_result_has_fixed_answer_and_no_citations() {
        let res = AnswerResult::abstained(Mode::Qa, Vec::new());
        assert!(res.abstained);
        assert_eq!(res.answer, NO_EVIDENCE_ANSWER);
        assert!(res.cited_chunks.is_empty());
        assert!(res.verdict.is_none());
    }

    #[test]
    fn verdict_field_is_omitted_when_absent() {
        let res = AnswerResult::abstained(Mode::Qa, Vec::new());
        let json = serde_json::to_string(&res).unwrap();
        assert!(!json.contains("verdict"));
    }
}
