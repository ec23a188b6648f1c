//! Offline evaluation of routing, retrieval, and grounding
//!
//! Labeled queries come from a JSONL file, one object per line:
//! `{"query": "...", "expected_mode": "qa", "relevant_chunks": ["a1b2..."]}`.
//! Both label fields are optional; a query only contributes to the metrics
//! its labels cover.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::pipeline::Pipeline;
use crate::providers::EmbeddingProvider;
use crate::retrieval::VectorIndex;
use crate::routing::route_query;
use crate::types::query::{Mode, QueryRequest};

/// One labeled evaluation query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabeledQuery {
    /// The query text
    pub query: String,
    /// Expected router mode, if labeled
    #[serde(default)]
    pub expected_mode: Option<Mode>,
    /// Chunk ids that count as relevant, if labeled
    #[serde(default)]
    pub relevant_chunks: Vec<String>,
    /// True when the correct behavior is to abstain
    #[serde(default)]
    pub expect_abstain: bool,
}

/// Load labeled queries from a JSONL file.
pub fn load_labeled_queries(path: &Path) -> Result<Vec<LabeledQuery>> {
    let raw = std::fs::read_to_string(path)?;
    let mut queries = Vec::new();
    for (line_no, line) in raw.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let query: LabeledQuery = serde_json::from_str(line).map_err(|e| {
            crate::error::Error::Config(format!(
                "{}:{}: bad labeled query: {}",
                path.display(),
                line_no + 1,
                e
            ))
        })?;
        queries.push(query);
    }
    Ok(queries)
}

/// Fraction of relevant chunks found in the top `k` results.
pub fn recall_at_k(retrieved_ids: &[String], relevant: &[String], k: usize) -> f64 {
    if relevant.is_empty() {
        return 0.0;
    }
    let top_k = &retrieved_ids[..retrieved_ids.len().min(k)];
    let hits = relevant.iter().filter(|id| top_k.contains(id)).count();
    hits as f64 / relevant.len() as f64
}

/// Reciprocal rank of the first relevant chunk, 0.0 when none appears.
pub fn reciprocal_rank(retrieved_ids: &[String], relevant: &[String]) -> f64 {
    retrieved_ids
        .iter()
        .position(|id| relevant.contains(id))
        .map(|pos| 1.0 / (pos as f64 + 1.0))
        .unwrap_or(0.0)
}

/// Router accuracy over mode-labeled queries
#[derive(Debug, Clone, Serialize)]
pub struct RouterMetrics {
    /// Queries carrying a mode label
    pub labeled: usize,
    /// Correctly routed queries
    pub correct: usize,
    pub accuracy: f64,
}

/// Evaluate the router against mode labels. Purely local, no model calls.
pub fn evaluate_router(queries: &[LabeledQuery]) -> RouterMetrics {
    let mut labeled = 0;
    let mut correct = 0;
    for q in queries {
        if let Some(expected) = q.expected_mode {
            labeled += 1;
            if route_query(&q.query) == expected {
                correct += 1;
            }
        }
    }
    RouterMetrics {
        labeled,
        correct,
        accuracy: if labeled == 0 {
            0.0
        } else {
            correct as f64 / labeled as f64
        },
    }
}

/// Retrieval quality over chunk-labeled queries
#[derive(Debug, Clone, Serialize)]
pub struct RetrievalMetrics {
    /// Queries carrying relevant-chunk labels
    pub labeled: usize,
    /// Mean Recall@K per configured K, in the same order as `k_values`
    pub recall_at_k: Vec<(usize, f64)>,
    /// Mean reciprocal rank
    pub mrr: f64,
}

/// Evaluate retrieval: embed each labeled query and measure where the
/// relevant chunks land in the ranking.
pub async fn evaluate_retrieval(
    queries: &[LabeledQuery],
    embedder: &Arc<dyn EmbeddingProvider>,
    index: &VectorIndex,
    k_values: &[usize],
) -> Result<RetrievalMetrics> {
    let max_k = k_values.iter().copied().max().unwrap_or(10);

    let mut labeled = 0;
    let mut recall_sums = vec![0.0f64; k_values.len()];
    let mut rr_sum = 0.0f64;

    for q in queries {
        if q.relevant_chunks.is_empty() {
            continue;
        }
        labeled += 1;

        let embedding = embedder.embed(&q.query).await?;
        let retrieved_ids: Vec<String> = index
            .search(&embedding, max_k, false, 0, 0.0)
            .into_iter()
            .map(|r| r.chunk.chunk_id)
            .collect();

        for (i, &k) in k_values.iter().enumerate() {
            recall_sums[i] += recall_at_k(&retrieved_ids, &q.relevant_chunks, k);
        }
        rr_sum += reciprocal_rank(&retrieved_ids, &q.relevant_chunks);
    }

    let denom = if labeled == 0 { 1.0 } else { labeled as f64 };
    Ok(RetrievalMetrics {
        labeled,
        recall_at_k: k_values
            .iter()
            .zip(recall_sums)
            .map(|(&k, sum)| (k, sum / denom))
            .collect(),
        mrr: rr_sum / denom,
    })
}

/// End-to-end grounding quality
#[derive(Debug, Clone, Serialize)]
pub struct GroundingMetrics {
    /// Queries answered end to end
    pub total: usize,
    /// Non-abstained answers carrying at least one valid citation
    pub cited: usize,
    /// Fraction of non-abstained answers with citations
    pub citation_coverage: f64,
    /// Fraction of cited chunk ids that are labeled relevant, over answers
    /// to queries carrying relevance labels
    pub citation_precision: f64,
    /// Queries labeled with an abstention expectation
    pub abstain_labeled: usize,
    /// Correct abstain/answer decisions among those
    pub abstain_correct: usize,
    pub abstention_accuracy: f64,
}

/// Run each query through the full pipeline and measure citation coverage
/// and abstention decisions. Calls the embedding and chat endpoints.
pub async fn evaluate_grounding(
    queries: &[LabeledQuery],
    pipeline: &Pipeline,
) -> Result<GroundingMetrics> {
    let mut total = 0;
    let mut answered = 0;
    let mut cited = 0;
    let mut citations_total = 0usize;
    let mut citations_relevant = 0usize;
    let mut abstain_labeled = 0;
    let mut abstain_correct = 0;

    for q in queries {
        let result = pipeline.answer_question(&QueryRequest::new(&q.query)).await?;
        total += 1;

        if !result.abstained {
            answered += 1;
            if !result.cited_chunks.is_empty() {
                cited += 1;
            }
            if !q.relevant_chunks.is_empty() {
                for cited_chunk in &result.cited_chunks {
                    citations_total += 1;
                    if q.relevant_chunks.contains(&cited_chunk.chunk_id) {
                        citations_relevant += 1;
                    }
                }
            }
        }

        // Every labeled query counts toward abstention accuracy; unlabeled
        // queries default to expecting an answer only when they carry
        // relevance labels.
        if q.expect_abstain || !q.relevant_chunks.is_empty() {
            abstain_labeled += 1;
            if result.abstained == q.expect_abstain {
                abstain_correct += 1;
            }
        }
    }

    Ok(GroundingMetrics {
        total,
        cited,
        citation_coverage: if answered == 0 {
            0.0
        } else {
            cited as f64 / answered as f64
        },
        citation_precision: if citations_total == 0 {
            0.0
        } else {
            citations_relevant as f64 / citations_total as f64
        },
        abstain_labeled,
        abstain_correct,
        abstention_accuracy: if abstain_labeled == 0 {
            0.0
        } else {
            abstain_correct as f64 / abstain_labeled as f64
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn recall_counts_hits_in_top_k() {
        let retrieved = ids(&["a", "b", "c", "d"]);
        let relevant = ids(&["b", "d"]);
        assert_eq!(recall_at_k(&retrieved, &relevant, 1), 0.0);
        assert_eq!(recall_at_k(&retrieved, &relevant, 2), 0.5);
        assert_eq!(recall_at_k(&retrieved, &relevant, 4), 1.0);
        assert_eq!(recall_at_k(&retrieved, &ids(&[]), 4), 0.0);
    }

    #[test]
    fn reciprocal_rank_of_first_hit() {
        let retrieved = ids(&["a", "b", "c"]);
        assert_eq!(reciprocal_rank(&retrieved, &ids(&["a"])), 1.0);
        assert_eq!(reciprocal_rank(&retrieved, &ids(&["c", "b"])), 0.5);
        assert_eq!(reciprocal_rank(&retrieved, &ids(&["z"])), 0.0);
    }

    #[test]
    fn router_accuracy_ignores_unlabeled_queries() {
        let queries = vec![
            LabeledQuery {
                query: "Compare Adam and SGD".to_string(),
                expected_mode: Some(Mode::Compare),
                relevant_chunks: Vec::new(),
                expect_abstain: false,
            },
            LabeledQuery {
                query: "What is attention?".to_string(),
                expected_mode: Some(Mode::Qa),
                relevant_chunks: Vec::new(),
                expect_abstain: false,
            },
            LabeledQuery {
                query: "unlabeled".to_string(),
                expected_mode: None,
                relevant_chunks: Vec::new(),
                expect_abstain: false,
            },
        ];
        let metrics = evaluate_router(&queries);
        assert_eq!(metrics.labeled, 2);
        assert_eq!(metrics.correct, 2);
        assert_eq!(metrics.accuracy, 1.0);
    }

    #[test]
    fn loads_jsonl_and_rejects_bad_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.jsonl");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"{{"query":"Compare Adam and SGD","expected_mode":"compare"}}"#
        )
        .unwrap();
        writeln!(
            file,
            r#"{{"query":"What is Adam?","relevant_chunks":["a1b2c3d4e5f6"]}}"#
        )
        .unwrap();
        writeln!(file).unwrap();

        let queries = load_labeled_queries(&path).unwrap();
        assert_eq!(queries.len(), 2);
        assert_eq!(queries[0].expected_mode, Some(Mode::Compare));
        assert_eq!(queries[1].relevant_chunks, vec!["a1b2c3d4e5f6".to_string()]);
        assert!(!queries[1].expect_abstain);

        std::fs::write(&path, "{broken\n").unwrap();
        assert!(load_labeled_queries(&path).is_err());
    }
}
