//! Verdict parsing for claim verification answers

use crate::types::response::Verdict;

/// Parse the verdict out of a claim-verification answer.
///
/// Looks for the `Verdict:` line first, then falls back to scanning the
/// whole text. NOT_ENOUGH_EVIDENCE is checked before the other labels
/// because it contains neither as a substring hazard, while "REFUTED"
/// answers often also mention "SUPPORTED" in the reasoning.
pub fn parse_verdict(text: &str) -> Verdict {
    let verdict_line = text
        .lines()
        .find(|line| line.trim_start().to_ascii_uppercase().starts_with("VERDICT:"));

    let haystack = verdict_line.unwrap_or(text).to_ascii_uppercase();

    if haystack.contains("NOT_ENOUGH_EVIDENCE") || haystack.contains("NOT ENOUGH EVIDENCE") {
        Verdict::NotEnoughEvidence
    } else if haystack.contains("REFUTED") {
        Verdict::Refuted
    } else if haystack.contains("SUPPORTED") {
        Verdict::Supported
    } else {
        Verdict::NotEnoughEvidence
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_verdict_line() {
        let text = "Verdict: SUPPORTED\nReasoning: the paper states this directly \
                    [a1b2c3d4e5f6 p.2].";
        assert_eq!(parse_verdict(text), Verdict::Supported);
    }

    #[test]
    fn verdict_line_wins_over_body_mentions() {
        let text = "Verdict: REFUTED\nReasoning: the claim of improvement is not \
                    SUPPORTED by table 2 [a1b2c3d4e5f6 p.4].";
        assert_eq!(parse_verdict(text), Verdict::Refuted);
    }

    #[test]
    fn not_enough_evidence_variants() {
        assert_eq!(
            parse_verdict("Verdict: NOT_ENOUGH_EVIDENCE"),
            Verdict::NotEnoughEvidence
        );
        assert_eq!(
            parse_verdict("Verdict: not enough evidence here"),
            Verdict::NotEnoughEvidence
        );
    }

    #[test]
    fn missing_verdict_defaults_to_not_enough_evidence() {
        assert_eq!(parse_verdict("The model said nothing useful."), Verdict::NotEnoughEvidence);
    }

    #[test]
    fn falls_back_to_full_text_scan() {
        assert_eq!(parse_verdict("The claim is REFUTED by the results."), Verdict::Refuted);
    }
}
