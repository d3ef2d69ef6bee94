//! Hybrid retrieval: scoring strategies and the three-tier retriever

pub mod retriever;
pub mod scoring;

use serde::{Deserialize, Serialize};

use crate::types::Chunk;

pub use retriever::HybridRetriever;
pub use scoring::{
    FuzzyScorer, KeywordScorer, ScoredQuery, ScoringStrategy, SemanticScorer, WeightedScorer,
};

/// Granularity level a match was retrieved at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// Whole-document summary match (coarse pass)
    Document,
    /// Section-level match
    Section,
    /// Passage-level match (final context)
    Passage,
}

/// A retrieved chunk with its relevance score
#[derive(Debug, Clone)]
pub struct RankedPassage {
    /// The retrieved chunk
    pub chunk: Chunk,
    /// Relevance score (0.0-1.0), non-increasing by rank
    pub score: f32,
    /// Granularity the match was made at
    pub granularity: Granularity,
}

/// Ranked retrieval context handed to the generator
#[derive(Debug, Clone, Default)]
pub struct RetrievalResult {
    /// Passages ordered by non-increasing score
    pub passages: Vec<RankedPassage>,
}

impl RetrievalResult {
    /// Highest relevance score, 0.0 when empty
    pub fn top_score(&self) -> f32 {
        self.passages.first().map(|p| p.score).unwrap_or(0.0)
    }

    /// Whether any passage was retrieved
    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }
}
