//! Word-window chunking with section tracking
//!
//! Pages are split into overlapping word windows. The section name carries
//! across pages until a new heading appears; the first heading on a page wins
//! so chunks bias toward the section that starts the page.

use unicode_segmentation::UnicodeSegmentation;

use crate::config::ChunkingConfig;
use crate::types::chunk::{Chunk, PageText};

use super::pdf::HEADING_NUMBERED_RE;

/// Section name used before any heading has been seen
const UNKNOWN_SECTION: &str = "Unknown";

/// Split extracted pages into chunks.
///
/// Chunk ids are stable across runs for identical input; the global chunk
/// index runs across the whole document, not per page.
pub fn chunk_pages(pages: &[PageText], cfg: &ChunkingConfig) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut current_section = UNKNOWN_SECTION.to_string();
    let mut global_index = 0u32;

    for page in pages {
        if let Some(heading) = page.headings.first() {
            current_section = heading.clone();
        }
        let section_name = clean_heading(&current_section);
        let source_file = basename(&page.source_path);

        for window in word_windows(&page.text, cfg) {
            let text = window.trim();
            if text.is_empty() {
                continue;
            }

            let chunk_id = Chunk::stable_id(
                &page.source_path,
                page.page_number,
                &section_name,
                global_index,
                text,
            );

            chunks.push(Chunk {
                chunk_id,
                text: text.to_string(),
                source_file: source_file.clone(),
                source_path: page.source_path.clone(),
                page_number: page.page_number,
                section_name: section_name.clone(),
                chunk_index: global_index,
            });
            global_index += 1;
        }
    }

    chunks
}

/// Strip the numeric prefix from a numbered heading ("3.1 Setup" -> "Setup").
pub fn clean_heading(heading: &str) -> String {
    let s = heading.trim();
    if let Some(caps) = HEADING_NUMBERED_RE.captures(s) {
        if let Some(title) = caps.get(3) {
            return title.as_str().trim().to_string();
        }
    }
    s.to_string()
}

/// Slice page text into overlapping word windows.
///
/// Windows shorter than `min_chunk_words` are extended unless they are the
/// final window; the final window keeps whatever is left.
fn word_windows<'a>(text: &'a str, cfg: &ChunkingConfig) -> Vec<&'a str> {
    // (byte offset, word) pairs; punctuation between words stays inside the
    // slice because windows are cut on word start/end offsets.
    let words: Vec<(usize, &str)> = text.unicode_word_indices().collect();
    if words.is_empty() {
        return Vec::new();
    }

    let mut windows = Vec::new();
    let mut start = 0usize;

    loop {
        let mut end = (start + cfg.chunk_words).min(words.len());
        if end - start < cfg.min_chunk_words && end != words.len() {
            end = (start + cfg.min_chunk_words).min(words.len());
        }

        let byte_start = words[start].0;
        let last = words[end - 1];
        let byte_end = last.0 + last.1.len();
        windows.push(&text[byte_start..byte_end]);

        if end == words.len() {
            break;
        }
        // Always advance even when overlap_words is misconfigured >= window size
        start = end.saturating_sub(cfg.overlap_words).max(start + 1);
    }

    windows
}

fn basename(path: &str) -> String {
    path.rsplit(['/', '\\']).next().unwrap_or(path).to_string()
}
