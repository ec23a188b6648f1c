//! Citation marker extraction
//!
//! Answers cite chunks inline as `[<12-hex-id> p.<page>]`. This module
//! pulls those markers back out so they can be validated against the
//! retrieved set and rendered for display.

use once_cell::sync::Lazy;
use regex::Regex;

static CITATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([0-9a-f]{12})\s+p\.(\d+)\]").expect("valid citation regex"));

/// A single parsed citation marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CitationRef {
    pub chunk_id: String,
    pub page_number: u32,
}

/// Extract every citation marker in answer order, duplicates included.
pub fn extract_citations(text: &str) -> Vec<CitationRef> {
    CITATION_RE
        .captures_iter(text)
        .filter_map(|cap| {
            let page_number = cap[2].parse().ok()?;
            Some(CitationRef {
                chunk_id: cap[1].to_string(),
                page_number,
            })
        })
        .collect()
}

/// Chunk ids in first-appearance order with duplicates removed.
pub fn cited_chunk_ids(text: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for citation in extract_citations(text) {
        if !seen.contains(&citation.chunk_id) {
            seen.push(citation.chunk_id);
        }
    }
    seen
}

/// Render a citation marker for a chunk.
pub fn format_citation(chunk_id: &str, page_number: u32) -> String {
    format!("[{} p.{}]", chunk_id, page_number)
}

/// Replace raw citation markers with numbered display markers.
///
/// Each distinct chunk id gets one number in first-appearance order, so
/// `[a1... p.3] ... [a1... p.4]` both render as `**[1]**`.
pub fn renumber_for_display(text: &str) -> String {
    let mut ids: Vec<String> = Vec::new();
    CITATION_RE
        .replace_all(text, |cap: &regex::Captures| {
            let id = cap[1].to_string();
            let n = match ids.iter().position(|seen| seen == &id) {
                Some(pos) => pos + 1,
                None => {
                    ids.push(id);
                    ids.len()
                }
            };
            format!("**[{}]**", n)
        })
        .into_owned()
}
