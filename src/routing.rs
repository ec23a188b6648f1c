//! Deterministic keyword router for interaction modes
//!
//! Claim verification outranks comparison, which outranks method cards;
//! anything else is plain QA. Matching is case-insensitive and word-bounded.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::query::Mode;

static COMPARE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(compare|vs\.?|versus|difference|differences|similarities)\b")
        .expect("invalid compare regex")
});

static METHOD_CARD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(method card|summarize method|architecture|pipeline|training objective)\b")
        .expect("invalid method-card regex")
});

static CLAIM_VERIFY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(verify|is it true|does the paper claim|evidence for|support the claim|refute)\b")
        .expect("invalid claim-verify regex")
});

/// Route a query into an interaction mode.
pub fn route_query(question: &str) -> Mode {
    let q = question.trim();
    if CLAIM_VERIFY_RE.is_match(q) {
        return Mode::ClaimVerify;
    }
    if COMPARE_RE.is_match(q) {
        return Mode::Compare;
    }
    if METHOD_CARD_RE.is_match(q) {
        return Mode::MethodCard;
    }
    Mode::Qa
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generic_questions_default_to_qa() {
        assert_eq!(route_query("What is machine learning?"), Mode::Qa);
        assert_eq!(route_query("Explain the algorithm"), Mode::Qa);
        assert_eq!(route_query("How does it work?"), Mode::Qa);
    }

    #[test]
    fn comparison_keywords_route_to_compare() {
        assert_eq!(route_query("Compare Adam vs SGD"), Mode::Compare);
        assert_eq!(
            route_query("What are the differences between method A and B?"),
            Mode::Compare
        );
        assert_eq!(route_query("Similarities between the approaches"), Mode::Compare);
        assert_eq!(route_query("Paper A versus Paper B"), Mode::Compare);
    }

    #[test]
    fn method_keywords_route_to_method_card() {
        assert_eq!(route_query("Summarize method card"), Mode::MethodCard);
        assert_eq!(route_query("Describe the architecture"), Mode::MethodCard);
        assert_eq!(route_query("What is the training objective?"), Mode::MethodCard);
        assert_eq!(route_query("Explain the pipeline"), Mode::MethodCard);
    }

    #[test]
    fn verification_keywords_route_to_claim_verify() {
        assert_eq!(
            route_query("Is it true that Adam converges faster?"),
            Mode::ClaimVerify
        );
        assert_eq!(route_query("Verify: the model uses attention"), Mode::ClaimVerify);
        assert_eq!(route_query("Does the paper claim X?"), Mode::ClaimVerify);
        assert_eq!(route_query("Evidence for the hypothesis"), Mode::ClaimVerify);
        assert_eq!(route_query("Can you refute this claim?"), Mode::ClaimVerify);
    }

    #[test]
    fn claim_verify_outranks_compare() {
        assert_eq!(
            route_query("Verify the comparison between A and B"),
            Mode::ClaimVerify
        );
    }

    #[test]
    fn routing_is_case_insensitive() {
        assert_eq!(route_query("COMPARE these methods"), Mode::Compare);
        assert_eq!(route_query("Is It True that..."), Mode::ClaimVerify);
        assert_eq!(route_query("SUMMARIZE METHOD"), Mode::MethodCard);
    }

    #[test]
    fn keywords_are_word_bounded() {
        // "pipelines" contains "pipeline" but word boundaries still match it;
        // what must NOT match is a keyword embedded inside another word.
        assert_eq!(route_query("The universe is vast"), Mode::Qa);
        assert_eq!(route_query("Discuss the diversity of datasets"), Mode::Qa);
    }
}
