//! Page and chunk types with source tracking for citations

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Text extracted from a single PDF page
#[derive(Debug, Clone)]
pub struct PageText {
    /// Path of the source PDF
    pub source_path: String,
    /// Page number, 1-indexed
    pub page_number: u32,
    /// Normalized page text
    pub text: String,
    /// Heading candidates detected on this page, in document order
    pub headings: Vec<String>,
}

/// A chunk of paper text, the unit of retrieval and citation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Stable 12-hex-digit content id
    pub chunk_id: String,
    /// Chunk text
    pub text: String,
    /// Source filename (basename, used in citations)
    pub source_file: String,
    /// Full path of the source PDF
    pub source_path: String,
    /// Page number the chunk starts on, 1-indexed
    pub page_number: u32,
    /// Section the chunk belongs to ("Unknown" before the first heading)
    pub section_name: String,
    /// Chunk index within the document
    pub chunk_index: u32,
}

impl Chunk {
    /// Compute the stable chunk id for the given provenance and text.
    ///
    /// First 12 hex digits of SHA-256 over (path, page, section, index, text).
    /// Identical inputs always produce the same id, so re-indexing an
    /// unchanged corpus is a no-op at the id level.
    pub fn stable_id(
        source_path: &str,
        page_number: u32,
        section_name: &str,
        chunk_index: u32,
        text: &str,
    ) -> String {
        let mut hasher = Sha256::new();
        hasher.update(source_path.as_bytes());
        hasher.update(page_number.to_string().as_bytes());
        hasher.update(section_name.as_bytes());
        hasher.update(chunk_index.to_string().as_bytes());
        hasher.update(text.as_bytes());
        hex::encode(hasher.finalize())[..12].to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stable_id_is_deterministic() {
        let a = Chunk::stable_id("papers/adam.pdf", 3, "Method", 7, "some text");
        let b = Chunk::stable_id("papers/adam.pdf", 3, "Method", 7, "some text");
        assert_eq!(a, b);
        assert_eq!(a.len(), 12);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn stable_id_changes_with_any_input() {
        let base = Chunk::stable_id("papers/adam.pdf", 3, "Method", 7, "some text");
        assert_ne!(base, Chunk::stable_id("papers/sgd.pdf", 3, "Method", 7, "some text"));
        assert_ne!(base, Chunk::stable_id("papers/adam.pdf", 4, "Method", 7, "some text"));
        assert_ne!(base, Chunk::stable_id("papers/adam.pdf", 3, "Results", 7, "some text"));
        assert_ne!(base, Chunk::stable_id("papers/adam.pdf", 3, "Method", 8, "some text"));
        assert_ne!(base, Chunk::stable_id("papers/adam.pdf", 3, "Method", 7, "other text"));
    }
}
