//! Answer, citation, and claim types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::document::{Chunk, Language, SectionLabel};

/// Verification status of an answer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    /// No checkable claims, or verification not yet run
    #[default]
    Unverified,
    /// Every extracted claim was supported by an external source
    Verified,
    /// At least one claim was contradicted
    Contradicted,
    /// Claims could not be resolved (timeout or unavailable lookup)
    Inconclusive,
}

/// Citation pointing at a supporting chunk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Citation {
    /// Chunk ID
    pub chunk_id: Uuid,
    /// Document ID
    pub document_id: Uuid,
    /// Section the evidence came from
    pub section: SectionLabel,
    /// Exact snippet from the source
    pub snippet: String,
    /// Relevance score assigned by the retriever (0.0-1.0)
    pub relevance_score: f32,
}

impl Citation {
    /// Create a citation from a chunk and its retrieval score
    pub fn from_chunk(chunk: &Chunk, relevance_score: f32) -> Self {
        Self {
            chunk_id: chunk.id,
            document_id: chunk.document_id,
            section: chunk.section,
            snippet: chunk.content.clone(),
            relevance_score,
        }
    }

    /// Format citation for inline display
    pub fn format_inline(&self) -> String {
        format!(
            "[Source: {}, {}]",
            self.document_id,
            self.section.display_name()
        )
    }
}

/// Outcome of checking one claim against external sources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimOutcome {
    /// An authoritative source supports the claim
    Supported,
    /// An authoritative source contradicts the claim
    Contradicted,
    /// No evidence either way, or the lookup did not complete
    Inconclusive,
}

/// An atomic, independently checkable factual assertion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claim {
    /// Claim text
    pub text: String,
    /// Citations carried from the answer
    pub citations: Vec<Uuid>,
    /// Verification outcome
    pub outcome: ClaimOutcome,
    /// References returned by the external lookup
    #[serde(default)]
    pub evidence_refs: Vec<String>,
}

/// A generated, confidence-scored answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    /// Generated text in the target language
    pub text: String,
    /// Language the answer is written in
    pub language: Language,
    /// Confidence score (0.0-1.0)
    pub confidence: f32,
    /// Supporting citations
    pub citations: Vec<Citation>,
    /// Verification status
    pub verification_status: VerificationStatus,
    /// Claims examined by the verifier
    #[serde(default)]
    pub claims: Vec<Claim>,
    /// Set when the lookup capability was down and verification degraded
    #[serde(default)]
    pub verification_degraded: bool,
}

impl Answer {
    /// Clamp confidence into [0, 1]
    pub fn clamp_confidence(&mut self) {
        self.confidence = self.confidence.clamp(0.0, 1.0);
    }
}
