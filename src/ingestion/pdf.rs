//! PDF page extraction with heading detection
//!
//! Page-level text comes from `lopdf` so citations can carry page numbers.
//! When lopdf yields nothing usable, the whole document falls back to
//! `pdf-extract` as a single page.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::HeadingConfig;
use crate::error::{Error, Result};
use crate::types::chunk::PageText;

/// Numbered headings like "3.1 Experimental Setup"
pub(crate) static HEADING_NUMBERED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d+(\.\d+)*)\s+(.+)$").expect("invalid heading regex"));

/// ALL-CAPS headings like "RELATED WORK"
static HEADING_ALLCAPS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z0-9 \-,:]{6,}$").expect("invalid all-caps regex"));

/// Extract per-page text and heading candidates from a PDF in memory.
pub fn extract_pages(
    source_path: &str,
    data: &[u8],
    heading_cfg: &HeadingConfig,
) -> Result<Vec<PageText>> {
    let doc = lopdf::Document::load_mem(data)
        .map_err(|e| Error::pdf_parse(source_path, e.to_string()))?;

    let page_count = doc.get_pages().len() as u32;
    let mut pages = Vec::with_capacity(page_count as usize);
    let mut extracted_any = false;

    for page_number in 1..=page_count {
        let text = doc
            .extract_text(&[page_number])
            .map(|t| normalize_text(&t))
            .unwrap_or_default();

        if !text.is_empty() {
            extracted_any = true;
        }

        let headings = detect_headings(&text, heading_cfg);
        pages.push(PageText {
            source_path: source_path.to_string(),
            page_number,
            text,
            headings,
        });
    }

    if extracted_any {
        return Ok(pages);
    }

    // Some PDFs defeat lopdf's text extraction entirely; fall back to
    // pdf-extract and lose per-page granularity.
    let whole = pdf_extract::extract_text_from_mem(data)
        .map_err(|e| Error::pdf_parse(source_path, e.to_string()))?;
    let text = normalize_text(&whole);
    if text.is_empty() {
        return Err(Error::pdf_parse(source_path, "no extractable text"));
    }

    tracing::warn!(source = source_path, "per-page extraction failed, using whole-document fallback");

    let headings = detect_headings(&text, heading_cfg);
    Ok(vec![PageText {
        source_path: source_path.to_string(),
        page_number: 1,
        text,
        headings,
    }])
}

/// Normalize line endings and trim surrounding whitespace.
fn normalize_text(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n").trim().to_string()
}

/// Collect heading candidates from page text, in document order.
pub fn detect_headings(text: &str, cfg: &HeadingConfig) -> Vec<String> {
    text.lines()
        .filter(|line| is_heading_candidate(line, cfg))
        .map(|line| line.trim().to_string())
        .collect()
}

/// Heuristic heading test: numbered headings, ALL-CAPS lines, or short
/// Title-Case lines with few punctuation characters.
fn is_heading_candidate(line: &str, cfg: &HeadingConfig) -> bool {
    let s = line.trim();
    if s.len() < cfg.min_len || s.len() > cfg.max_len {
        return false;
    }
    if cfg.require_no_period && s.ends_with('.') {
        return false;
    }

    let words: Vec<&str> = s.split_whitespace().collect();
    if words.len() > cfg.max_words {
        return false;
    }

    if HEADING_NUMBERED_RE.is_match(s) {
        return true;
    }
    if HEADING_ALLCAPS_RE.is_match(s) {
        return true;
    }

    // Title-Case-ish: most words capitalized, no bracket punctuation
    let upper_starts = words
        .iter()
        .filter(|w| w.chars().next().is_some_and(|c| c.is_uppercase()))
        .count();
    let ratio = upper_starts as f32 / words.len().max(1) as f32;
    let punct = s.chars().filter(|c| "[](){};".contains(*c)).count();
    ratio >= 0.6 && punct == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> HeadingConfig {
        HeadingConfig::default()
    }

    #[test]
    fn numbered_headings_are_detected() {
        assert!(is_heading_candidate("3 Method", &cfg()));
        assert!(is_heading_candidate("3.1 Experimental Setup", &cfg()));
        assert!(is_heading_candidate("  2.4.1 Ablations", &cfg()));
    }

    #[test]
    fn allcaps_headings_are_detected() {
        assert!(is_heading_candidate("RELATED WORK", &cfg()));
        assert!(is_heading_candidate("EXPERIMENTS AND RESULTS", &cfg()));
    }

    #[test]
    fn title_case_headings_are_detected() {
        assert!(is_heading_candidate("Training Details", &cfg()));
        assert!(is_heading_candidate("Broader Impact Statement", &cfg()));
    }

    #[test]
    fn body_text_is_rejected() {
        // Ends with a period
        assert!(!is_heading_candidate("We train the model for 100 epochs.", &cfg()));
        // Too many words
        assert!(!is_heading_candidate(
            "we observe that the loss decreases rapidly during the first few epochs of training",
            &cfg()
        ));
        // Mostly lowercase
        assert!(!is_heading_candidate("the quick brown fox jumps", &cfg()));
        // Bracket punctuation
        assert!(!is_heading_candidate("Adam Optimizer [12]", &cfg()));
    }

    #[test]
    fn short_and_long_lines_are_rejected() {
        assert!(!is_heading_candidate("ab", &cfg()));
        let long = "A ".repeat(60);
        assert!(!is_heading_candidate(&long, &cfg()));
    }

    #[test]
    fn detect_headings_preserves_document_order() {
        let text = "1 Introduction\nsome body text here.\nRELATED WORK\nmore body.";
        let found = detect_headings(text, &cfg());
        assert_eq!(found, vec!["1 Introduction", "RELATED WORK"]);
    }

    #[test]
    fn normalize_collapses_line_endings() {
        assert_eq!(normalize_text("a\r\nb\rc\n"), "a\nb\nc");
    }
}
