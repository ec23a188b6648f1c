//! Prompt templates for each answer mode
//!
//! Every template carries the same grounding rules: cite every claim with
//! the chunk id and page marker, and refuse with the fixed no-evidence
//! sentence when the context does not answer the question.

use crate::config::PromptsConfig;
use crate::retrieval::Retrieved;
use crate::types::query::Mode;

/// Fixed refusal sentence. Byte-exact everywhere it appears.
pub const NO_EVIDENCE_ANSWER: &str =
    "I cannot find evidence in the provided papers to answer that.";

const SYSTEM_RULES: &str = "\
You are a research assistant answering questions about machine learning papers.
Rules:
- Use ONLY the provided context chunks. Do not use outside knowledge.
- Cite every factual claim with the chunk marker in the form [<chunk_id> p.<page>], \
e.g. [a1b2c3d4e5f6 p.3]. The chunk_id and page must come from the context headers.
- Wrap mathematical notation in $...$.
- If the context does not contain the answer, reply with exactly: \
I cannot find evidence in the provided papers to answer that.";

/// Builds context blocks and mode-specific prompts
pub struct PromptBuilder {
    max_context_chunks: usize,
}

impl PromptBuilder {
    pub fn new(config: &PromptsConfig) -> Self {
        Self {
            max_context_chunks: config.max_context_chunks,
        }
    }

    /// Render retrieved chunks into the context block, capped at the
    /// configured limit.
    pub fn build_context(&self, retrieved: &[Retrieved]) -> String {
        retrieved
            .iter()
            .take(self.max_context_chunks)
            .map(|r| {
                format!(
                    "CHUNK {} | file={} | page={} | section={}\n{}",
                    r.chunk.chunk_id,
                    r.chunk.source_file,
                    r.chunk.page_number,
                    r.chunk.section_name,
                    r.chunk.text
                )
            })
            .collect::<Vec<_>>()
            .join("\n---\n")
    }

    /// Assemble the full prompt for a mode.
    pub fn build_prompt(&self, mode: Mode, question: &str, context: &str) -> String {
        let task = match mode {
            Mode::Qa => format!(
                "Answer the question below using only the context.\n\nQuestion: {}",
                question
            ),
            Mode::Compare => format!(
                "Compare the approaches relevant to the question below. Structure the \
                 answer with these sections, each with cited bullet points:\n\
                 ## Similarities\n## Differences\n## When to prefer each\n\n\
                 If the context covers only one side, say which side is missing and \
                 summarize what is present.\n\nQuestion: {}",
                question
            ),
            Mode::MethodCard => format!(
                "Produce a method card for the method in the question below. Respond \
                 with a JSON object with exactly these keys:\n\
                 \"paper_title\", \"problem\", \"key_idea\", \"model_or_algorithm\", \
                 \"training_objective\", \"data\", \"evaluation_metrics\", \
                 \"limitations\", \"notable_hyperparams\", \"citations\"\n\
                 Each field value must be grounded in the context; use \"unknown\" for \
                 fields the context does not cover. \"citations\" maps each filled \
                 field name to a list of chunk markers like [a1b2c3d4e5f6 p.3].\n\n\
                 Question: {}",
                question
            ),
            Mode::ClaimVerify => format!(
                "Decide whether the context supports the claim below. Respond in this \
                 format:\n\
                 Verdict: SUPPORTED | REFUTED | NOT_ENOUGH_EVIDENCE\n\
                 Reasoning: 2-4 sentences, each citing chunk markers.\n\n\
                 Claim: {}",
                question
            ),
        };

        format!("{}\n\nContext:\n{}\n\n{}", SYSTEM_RULES, context, task)
    }
}
