//! End-to-end question answering
//!
//! Routes the question into a mode, retrieves evidence, abstains when
//! nothing clears the similarity floor, otherwise prompts the chat model
//! and validates its citations against the retrieved set.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::Result;
use crate::generation::{cited_chunk_ids, parse_verdict, PromptBuilder};
use crate::providers::{EmbeddingProvider, LlmProvider};
use crate::retrieval::{should_abstain, Retrieved, VectorIndex};
use crate::routing::route_query;
use crate::types::query::{Mode, QueryRequest};
use crate::types::response::{AnswerResult, CitedChunk, RetrievedChunk};

/// The query-answering pipeline
pub struct Pipeline {
    config: AppConfig,
    embedder: Arc<dyn EmbeddingProvider>,
    llm: Arc<dyn LlmProvider>,
    index: Arc<VectorIndex>,
    prompts: PromptBuilder,
}

impl Pipeline {
    pub fn new(
        config: AppConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmProvider>,
        index: Arc<VectorIndex>,
    ) -> Self {
        let prompts = PromptBuilder::new(&config.prompts);
        Self {
            config,
            embedder,
            llm,
            index,
            prompts,
        }
    }

    /// Answer a question end to end.
    pub async fn answer_question(&self, request: &QueryRequest) -> Result<AnswerResult> {
        let mode = route_query(&request.question);
        let retrieved = self.retrieve(request).await?;

        tracing::debug!(
            mode = mode.as_str(),
            retrieved = retrieved.len(),
            top_score = retrieved.first().map(|r| r.score).unwrap_or(0.0),
            "retrieval complete"
        );

        let retrieved_payload: Vec<RetrievedChunk> = retrieved
            .iter()
            .map(|r| RetrievedChunk::from_chunk(&r.chunk, r.score))
            .collect();

        if should_abstain(&retrieved, self.config.retrieval.min_similarity) {
            tracing::info!(mode = mode.as_str(), "abstaining: no evidence above threshold");
            return Ok(AnswerResult::abstained(mode, retrieved_payload));
        }

        let context = self.prompts.build_context(&retrieved);
        let prompt = self.prompts.build_prompt(mode, &request.question, &context);
        let answer = self.llm.complete(&prompt).await?;

        // Keep only citations that point at chunks we actually retrieved.
        let cited_chunks: Vec<CitedChunk> = cited_chunk_ids(&answer)
            .iter()
            .filter_map(|id| {
                retrieved
                    .iter()
                    .find(|r| &r.chunk.chunk_id == id)
                    .map(|r| CitedChunk::from_chunk(&r.chunk))
            })
            .collect();

        // A generated answer without a single valid citation is ungrounded.
        if cited_chunks.is_empty() {
            tracing::info!(mode = mode.as_str(), "abstaining: answer cited no retrieved chunk");
            return Ok(AnswerResult::abstained(mode, retrieved_payload));
        }

        let verdict = match mode {
            Mode::ClaimVerify => Some(parse_verdict(&answer)),
            _ => None,
        };

        Ok(AnswerResult {
            mode,
            abstained: false,
            answer,
            verdict,
            retrieved: retrieved_payload,
            cited_chunks,
        })
    }

    /// Embed the question and search the index with per-request overrides.
    async fn retrieve(&self, request: &QueryRequest) -> Result<Vec<Retrieved>> {
        let query_embedding = self.embedder.embed(&request.question).await?;
        let k = request.top_k.unwrap_or(self.config.retrieval.k);
        let use_mmr = request.use_mmr.unwrap_or(self.config.retrieval.use_mmr);
        Ok(self.index.search(
            &query_embedding,
            k,
            use_mmr,
            self.config.retrieval.mmr.fetch_k,
            self.config.retrieval.mmr.lambda_mult,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::generation::NO_EVIDENCE_ANSWER;
    use crate::types::chunk::Chunk;
    use crate::types::response::Verdict;
    use async_trait::async_trait;

    struct FakeEmbedder {
        vector: Vec<f32>,
    }

    #[async_trait]
    impl EmbeddingProvider for FakeEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(self.vector.clone())
        }

        fn name(&self) -> &str {
            "fake"
        }
    }

    struct FakeLlm {
        answer: String,
    }

    #[async_trait]
    impl LlmProvider for FakeLlm {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            Ok(self.answer.clone())
        }

        fn model(&self) -> &str {
            "fake-model"
        }

        fn name(&self) -> &str {
            "fake"
        }
    }

    struct FailingLlm;

    #[async_trait]
    impl LlmProvider for FailingLlm {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            Err(Error::llm("boom"))
        }

        fn model(&self) -> &str {
            "fake-model"
        }

        fn name(&self) -> &str {
            "fake"
        }
    }

    fn chunk(id: &str, page: u32) -> Chunk {
        Chunk {
            chunk_id: id.to_string(),
            text: "Adam combines momentum with adaptive step sizes.".to_string(),
            source_file: "adam.pdf".to_string(),
            source_path: "data/papers/adam.pdf".to_string(),
            page_number: page,
            section_name: "Method".to_string(),
            chunk_index: 0,
        }
    }

    fn indexed(entries: Vec<(Chunk, Vec<f32>)>) -> Arc<VectorIndex> {
        let index = VectorIndex::new();
        index.replace_document("adam.pdf", entries);
        Arc::new(index)
    }

    fn pipeline(answer: &str, index: Arc<VectorIndex>) -> Pipeline {
        Pipeline::new(
            AppConfig::default(),
            Arc::new(FakeEmbedder {
                vector: vec![1.0, 0.0],
            }),
            Arc::new(FakeLlm {
                answer: answer.to_string(),
            }),
            index,
        )
    }

    #[tokio::test]
    async fn answers_with_valid_citations() {
        let index = indexed(vec![(chunk("a1b2c3d4e5f6", 3), vec![1.0, 0.0])]);
        let p = pipeline("Adam uses momentum [a1b2c3d4e5f6 p.3].", index);

        let result = p
            .answer_question(&QueryRequest::new("What does Adam do?"))
            .await
            .unwrap();

        assert!(!result.abstained);
        assert_eq!(result.mode, Mode::Qa);
        assert_eq!(result.cited_chunks.len(), 1);
        assert_eq!(result.cited_chunks[0].chunk_id, "a1b2c3d4e5f6");
        assert_eq!(result.cited_chunks[0].page_number, 3);
        assert!(result.verdict.is_none());
    }

    #[tokio::test]
    async fn abstains_on_empty_index() {
        let p = pipeline("irrelevant", Arc::new(VectorIndex::new()));
        let result = p
            .answer_question(&QueryRequest::new("What is the capital of France?"))
            .await
            .unwrap();

        assert!(result.abstained);
        assert_eq!(result.answer, NO_EVIDENCE_ANSWER);
        assert!(result.cited_chunks.is_empty());
        assert!(result.retrieved.is_empty());
    }

    #[tokio::test]
    async fn abstains_below_similarity_floor() {
        // orthogonal to the query embedding, similarity proxy 0.5 < 0.55
        let index = indexed(vec![(chunk("a1b2c3d4e5f6", 1), vec![0.0, 1.0])]);
        let p = pipeline("should never be used", index);

        let result = p
            .answer_question(&QueryRequest::new("Who won the world cup?"))
            .await
            .unwrap();

        assert!(result.abstained);
        assert_eq!(result.answer, NO_EVIDENCE_ANSWER);
        assert!(result.cited_chunks.is_empty());
        // retrieval results still reported for debugging
        assert_eq!(result.retrieved.len(), 1);
    }

    #[tokio::test]
    async fn abstains_when_answer_has_no_valid_citation() {
        let index = indexed(vec![(chunk("a1b2c3d4e5f6", 1), vec![1.0, 0.0])]);
        // cites a chunk that was never retrieved
        let p = pipeline("Adam is great [ffffffffffff p.9].", index);

        let result = p
            .answer_question(&QueryRequest::new("What does Adam do?"))
            .await
            .unwrap();

        assert!(result.abstained);
        assert_eq!(result.answer, NO_EVIDENCE_ANSWER);
        assert!(result.cited_chunks.is_empty());
    }

    #[tokio::test]
    async fn unknown_citations_are_dropped_not_fatal() {
        let index = indexed(vec![(chunk("a1b2c3d4e5f6", 1), vec![1.0, 0.0])]);
        let p = pipeline(
            "Adam uses momentum [a1b2c3d4e5f6 p.1] and more [ffffffffffff p.9].",
            index,
        );

        let result = p
            .answer_question(&QueryRequest::new("What does Adam do?"))
            .await
            .unwrap();

        assert!(!result.abstained);
        assert_eq!(result.cited_chunks.len(), 1);
        assert_eq!(result.cited_chunks[0].chunk_id, "a1b2c3d4e5f6");
    }

    #[tokio::test]
    async fn claim_verify_parses_verdict() {
        let index = indexed(vec![(chunk("a1b2c3d4e5f6", 2), vec![1.0, 0.0])]);
        let p = pipeline(
            "Verdict: SUPPORTED\nReasoning: stated directly [a1b2c3d4e5f6 p.2].",
            index,
        );

        let result = p
            .answer_question(&QueryRequest::new(
                "Verify that Adam uses adaptive step sizes",
            ))
            .await
            .unwrap();

        assert!(!result.abstained);
        assert_eq!(result.mode, Mode::ClaimVerify);
        assert_eq!(result.verdict, Some(Verdict::Supported));
    }

    #[tokio::test]
    async fn llm_errors_propagate() {
        let index = indexed(vec![(chunk("a1b2c3d4e5f6", 1), vec![1.0, 0.0])]);
        let p = Pipeline::new(
            AppConfig::default(),
            Arc::new(FakeEmbedder {
                vector: vec![1.0, 0.0],
            }),
            Arc::new(FailingLlm),
            index,
        );

        let err = p
            .answer_question(&QueryRequest::new("What does Adam do?"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Llm(_)));
    }

    #[tokio::test]
    async fn top_k_override_limits_retrieval() {
        let index = indexed(vec![
            (chunk("aaaaaaaaaaaa", 1), vec![1.0, 0.0]),
            (chunk("bbbbbbbbbbbb", 2), vec![0.9, 0.1]),
            (chunk("cccccccccccc", 3), vec![0.8, 0.2]),
        ]);
        let p = pipeline("ok [aaaaaaaaaaaa p.1]", index);

        let mut request = QueryRequest::new("What does Adam do?");
        request.top_k = Some(1);
        request.use_mmr = Some(false);
        let result = p.answer_question(&request).await.unwrap();
        assert_eq!(result.retrieved.len(), 1);
    }
}
