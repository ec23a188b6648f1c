//! In-memory vector index with cosine search and MMR re-ranking
//!
//! The index holds every chunk embedding in memory and scans linearly.
//! Scores reported to callers are similarity proxies in (0, 1], computed
//! as 1 / (1 + cosine_distance), so thresholds stay comparable across
//! embedding models.

use parking_lot::RwLock;

use crate::error::Result;
use crate::storage::ChunkStore;
use crate::types::chunk::Chunk;

/// A chunk returned from search with its similarity score
#[derive(Debug, Clone)]
pub struct Retrieved {
    pub chunk: Chunk,
    pub score: f32,
}

struct IndexEntry {
    chunk: Chunk,
    embedding: Vec<f32>,
}

/// Linear-scan vector index over all indexed chunks
pub struct VectorIndex {
    entries: RwLock<Vec<IndexEntry>>,
}

impl VectorIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Build an index from everything in the store.
    pub fn from_store(store: &ChunkStore) -> Result<Self> {
        let index = Self::new();
        {
            let mut entries = index.entries.write();
            for (chunk, embedding) in store.load_all()? {
                entries.push(IndexEntry { chunk, embedding });
            }
        }
        Ok(index)
    }

    /// Number of indexed chunks
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Replace all entries belonging to one source file.
    pub fn replace_document(&self, source_file: &str, chunks: Vec<(Chunk, Vec<f32>)>) {
        let mut entries = self.entries.write();
        entries.retain(|e| e.chunk.source_file != source_file);
        for (chunk, embedding) in chunks {
            entries.push(IndexEntry { chunk, embedding });
        }
    }

    /// Search for the `k` most similar chunks.
    ///
    /// With `use_mmr` the top `fetch_k` candidates are re-ranked with
    /// maximal marginal relevance before taking `k`; reported scores stay
    /// the original query similarities.
    pub fn search(
        &self,
        query: &[f32],
        k: usize,
        use_mmr: bool,
        fetch_k: usize,
        lambda_mult: f32,
    ) -> Vec<Retrieved> {
        let entries = self.entries.read();
        if entries.is_empty() || k == 0 {
            return Vec::new();
        }

        let fetch = if use_mmr { fetch_k.max(k) } else { k };

        let mut scored: Vec<(usize, f32)> = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (i, cosine_similarity(query, &e.embedding)))
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(fetch);

        let picked: Vec<(usize, f32)> = if use_mmr && scored.len() > k {
            mmr_select(&entries, &scored, k, lambda_mult)
        } else {
            scored.into_iter().take(k).collect()
        };

        picked
            .into_iter()
            .map(|(i, sim)| Retrieved {
                chunk: entries[i].chunk.clone(),
                score: distance_to_similarity(1.0 - sim),
            })
            .collect()
    }
}

impl Default for VectorIndex {
    fn default() -> Self {
        Self::new()
    }
}

/// Greedy MMR selection over pre-scored candidates.
///
/// Each step picks the candidate maximizing
/// `lambda * sim(query, c) - (1 - lambda) * max sim(c, selected)`.
fn mmr_select(
    entries: &[IndexEntry],
    candidates: &[(usize, f32)],
    k: usize,
    lambda_mult: f32,
) -> Vec<(usize, f32)> {
    let mut selected: Vec<(usize, f32)> = Vec::with_capacity(k);
    let mut remaining: Vec<(usize, f32)> = candidates.to_vec();

    while selected.len() < k && !remaining.is_empty() {
        let mut best_pos = 0;
        let mut best_score = f32::NEG_INFINITY;

        for (pos, &(idx, query_sim)) in remaining.iter().enumerate() {
            let max_selected_sim = selected
                .iter()
                .map(|&(sel_idx, _)| {
                    cosine_similarity(&entries[idx].embedding, &entries[sel_idx].embedding)
                })
                .fold(f32::NEG_INFINITY, f32::max);
            let diversity = if selected.is_empty() {
                0.0
            } else {
                max_selected_sim
            };
            let score = lambda_mult * query_sim - (1.0 - lambda_mult) * diversity;
            if score > best_score {
                best_score = score;
                best_pos = pos;
            }
        }

        selected.push(remaining.swap_remove(best_pos));
    }

    selected
}

/// Cosine similarity of two vectors. Returns 0.0 on mismatched or zero input.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Map a cosine distance to a similarity proxy in (0, 1].
fn distance_to_similarity(distance: f32) -> f32 {
    1.0 / (1.0 + distance.max(0.0))
}

/// True when no retrieved chunk clears the similarity threshold.
pub fn should_abstain(retrieved: &[Retrieved], min_similarity: f32) -> bool {
    retrieved.iter().all(|r| r.score < min_similarity)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(id: &str, file: &str) -> Chunk {
        Chunk {
            chunk_id: id.to_string(),
            text: format!("text {}", id),
            source_file: file.to_string(),
            source_path: format!("data/papers/{}", file),
            page_number: 1,
            section_name: "Unknown".to_string(),
            chunk_index: 0,
        }
    }

    #[test]
    fn cosine_basics() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn identical_vector_scores_one() {
        // distance 0 maps to similarity 1.0
        assert_eq!(distance_to_similarity(0.0), 1.0);
        // negative distances clamp instead of exceeding 1.0
        assert_eq!(distance_to_similarity(-0.1), 1.0);
        assert!(distance_to_similarity(1.0) - 0.5 < 1e-6);
    }

    #[test]
    fn search_ranks_by_similarity() {
        let index = VectorIndex::new();
        index.replace_document(
            "a.pdf",
            vec![
                (chunk("aaaaaaaaaaaa", "a.pdf"), vec![1.0, 0.0]),
                (chunk("bbbbbbbbbbbb", "a.pdf"), vec![0.0, 1.0]),
                (chunk("cccccccccccc", "a.pdf"), vec![0.9, 0.1]),
            ],
        );

        let results = index.search(&[1.0, 0.0], 2, false, 0, 0.0);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk.chunk_id, "aaaaaaaaaaaa");
        assert_eq!(results[1].chunk.chunk_id, "cccccccccccc");
        assert!(results[0].score > results[1].score);
        assert_eq!(results[0].score, 1.0);
    }

    #[test]
    fn mmr_prefers_diverse_results() {
        let index = VectorIndex::new();
        index.replace_document(
            "a.pdf",
            vec![
                (chunk("aaaaaaaaaaaa", "a.pdf"), vec![1.0, 0.0, 0.0]),
                // near-duplicate of the first
                (chunk("bbbbbbbbbbbb", "a.pdf"), vec![0.99, 0.01, 0.0]),
                // less similar to the query but distinct
                (chunk("cccccccccccc", "a.pdf"), vec![0.6, 0.0, 0.8]),
            ],
        );

        let results = index.search(&[1.0, 0.0, 0.0], 2, true, 3, 0.5);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk.chunk_id, "aaaaaaaaaaaa");
        assert_eq!(results[1].chunk.chunk_id, "cccccccccccc");
    }

    #[test]
    fn replace_document_removes_stale_entries() {
        let index = VectorIndex::new();
        index.replace_document(
            "a.pdf",
            vec![(chunk("aaaaaaaaaaaa", "a.pdf"), vec![1.0, 0.0])],
        );
        index.replace_document(
            "b.pdf",
            vec![(chunk("bbbbbbbbbbbb", "b.pdf"), vec![0.0, 1.0])],
        );
        assert_eq!(index.len(), 2);

        index.replace_document(
            "a.pdf",
            vec![(chunk("cccccccccccc", "a.pdf"), vec![1.0, 0.0])],
        );
        assert_eq!(index.len(), 2);

        let results = index.search(&[1.0, 0.0], 1, false, 0, 0.0);
        assert_eq!(results[0].chunk.chunk_id, "cccccccccccc");
    }

    #[test]
    fn abstain_when_nothing_clears_threshold() {
        let low = vec![Retrieved {
            chunk: chunk("aaaaaaaaaaaa", "a.pdf"),
            score: 0.4,
        }];
        assert!(should_abstain(&low, 0.55));

        let high = vec![Retrieved {
            chunk: chunk("aaaaaaaaaaaa", "a.pdf"),
            score: 0.7,
        }];
        assert!(!should_abstain(&high, 0.55));

        assert!(should_abstain(&[], 0.55));
    }

    #[test]
    fn from_store_loads_persisted_chunks() {
        let store = ChunkStore::in_memory().unwrap();
        store
            .replace_document(
                "a.pdf",
                1,
                &[(chunk("aaaaaaaaaaaa", "a.pdf"), vec![1.0, 0.0])],
            )
            .unwrap();

        let index = VectorIndex::from_store(&store).unwrap();
        assert_eq!(index.len(), 1);
        let results = index.search(&[1.0, 0.0], 1, false, 0, 0.0);
        assert_eq!(results[0].chunk.chunk_id, "aaaaaaaaaaaa");
    }
}
