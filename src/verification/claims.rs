//! Claim extraction from generated answers
//!
//! A claim is a sentence carrying an independently checkable fact: a numeric
//! limit, amount, or duration, or a coverage inclusion/exclusion statement.

use regex::Regex;
use std::sync::OnceLock;
use unicode_segmentation::UnicodeSegmentation;

use crate::types::{Answer, Claim, ClaimOutcome};

fn numeric_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // Amounts (₹/Rs/%), durations (months/days/years), or bare limits
        Regex::new(
            r"(?i)(₹|rs\.?\s*\d|%|\d+[\s-]*(month|months|day|days|year|years|hour|hours)|\d[\d,]*[\s-]*(lakh|crore))",
        )
        .expect("invalid numeric claim pattern")
    })
}

fn coverage_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"(?i)\b(is|are|am)?\s*(not\s+)?(covered|excluded|included|payable|reimbursed)\b|waiting\s+period|sum\s+insured",
        )
        .expect("invalid coverage claim pattern")
    })
}

/// Extract checkable claims from an answer, capped at `max_claims`
///
/// Each claim carries the answer's citation chunk ids.
pub fn extract_claims(answer: &Answer, max_claims: usize) -> Vec<Claim> {
    let citations: Vec<uuid::Uuid> = answer.citations.iter().map(|c| c.chunk_id).collect();

    answer
        .text
        .split_sentence_bounds()
        .map(str::trim)
        .filter(|sentence| sentence.len() >= 15)
        .filter(|sentence| is_checkable(sentence))
        .take(max_claims)
        .map(|sentence| Claim {
            text: sentence.to_string(),
            citations: citations.clone(),
            outcome: ClaimOutcome::Inconclusive,
            evidence_refs: Vec::new(),
        })
        .collect()
}

/// Whether a sentence states an independently checkable fact
fn is_checkable(sentence: &str) -> bool {
    numeric_pattern().is_match(sentence) || coverage_pattern().is_match(sentence)
}
