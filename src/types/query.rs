//! Query request types and interaction modes

use serde::{Deserialize, Serialize};

/// Interaction mode a query is routed into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Free-form question answering
    Qa,
    /// Structured comparison of two papers or approaches
    Compare,
    /// Method-card summary of a paper's approach
    MethodCard,
    /// Claim verification with a verdict
    ClaimVerify,
}

impl Mode {
    /// Snake-case tag used in serialized responses and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Qa => "qa",
            Self::Compare => "compare",
            Self::MethodCard => "method_card",
            Self::ClaimVerify => "claim_verify",
        }
    }
}

/// Query request accepted by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    /// The natural-language question
    pub question: String,

    /// Override the configured number of retrieved chunks
    #[serde(default)]
    pub top_k: Option<usize>,

    /// Override the configured MMR setting
    #[serde(default)]
    pub use_mmr: Option<bool>,
}

impl QueryRequest {
    /// Create a request with default retrieval settings
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            top_k: None,
            use_mmr: None,
        }
    }
}
