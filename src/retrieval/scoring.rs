//! Composable scoring strategies for hybrid retrieval
//!
//! Each strategy scores a (query, chunk) pair into [0, 1]; the retriever
//! combines them by weighted aggregation with weights from configuration.

use std::collections::HashSet;

use crate::config::ScoreWeights;
use crate::index::cosine_similarity;
use crate::types::Chunk;

/// Insurance vocabulary for fuzzy matching; a typo like "premum" still
/// reaches premium clauses.
const DOMAIN_TERMS: &[&str] = &[
    "premium",
    "coverage",
    "covered",
    "exclusion",
    "excluded",
    "claim",
    "claims",
    "waiting",
    "period",
    "hospitalization",
    "deductible",
    "cashless",
    "existing",
    "policy",
    "renewal",
    "maternity",
    "ambulance",
    "reimbursement",
    "insured",
    "nominee",
];

/// A query preprocessed for scoring: raw text, lowercase terms, embedding
#[derive(Debug, Clone)]
pub struct ScoredQuery {
    pub text: String,
    pub terms: Vec<String>,
    pub embedding: Vec<f32>,
}

impl ScoredQuery {
    /// Build a scored query from text and its embedding
    pub fn new(text: impl Into<String>, embedding: Vec<f32>) -> Self {
        let text = text.into();
        let terms = tokenize(&text);
        Self {
            text,
            terms,
            embedding,
        }
    }
}

/// Lowercase tokens split on whitespace and ASCII punctuation
///
/// Devanagari combining marks are not token boundaries; splitting on every
/// non-alphanumeric char would cut Hindi/Marathi words apart.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| c.is_whitespace() || c.is_ascii_punctuation())
        .filter(|t| t.len() >= 2)
        .map(str::to_string)
        .collect()
}

/// A single scoring strategy
pub trait ScoringStrategy: Send + Sync {
    /// Strategy name for logging
    fn name(&self) -> &'static str;

    /// Score a chunk against the query, in [0, 1]
    fn score(&self, query: &ScoredQuery, chunk: &Chunk) -> f32;
}

/// Embedding similarity in the shared multilingual space
pub struct SemanticScorer;

impl ScoringStrategy for SemanticScorer {
    fn name(&self) -> &'static str {
        "semantic"
    }

    fn score(&self, query: &ScoredQuery, chunk: &Chunk) -> f32 {
        match &chunk.embedding {
            Some(embedding) => cosine_similarity(&query.embedding, embedding).max(0.0),
            None => 0.0,
        }
    }
}

/// Exact keyword overlap: fraction of query terms present in the chunk
pub struct KeywordScorer;

impl ScoringStrategy for KeywordScorer {
    fn name(&self) -> &'static str {
        "keyword"
    }

    fn score(&self, query: &ScoredQuery, chunk: &Chunk) -> f32 {
        if query.terms.is_empty() {
            return 0.0;
        }
        let chunk_terms: HashSet<String> = tokenize(&chunk.content).into_iter().collect();
        let hits = query
            .terms
            .iter()
            .filter(|term| chunk_terms.contains(*term))
            .count();
        hits as f32 / query.terms.len() as f32
    }
}

/// Edit-distance-bounded matching of query terms against domain vocabulary
pub struct FuzzyScorer {
    max_edits: usize,
}

impl FuzzyScorer {
    /// Create a fuzzy scorer with the given edit bound
    pub fn new(max_edits: usize) -> Self {
        Self { max_edits }
    }

    /// Canonical domain term within the edit bound, if any
    fn canonicalize(&self, term: &str) -> Option<&'static str> {
        DOMAIN_TERMS
            .iter()
            .find(|candidate| {
                bounded_levenshtein(term, candidate, self.max_edits).is_some()
            })
            .copied()
    }
}

impl ScoringStrategy for FuzzyScorer {
    fn name(&self) -> &'static str {
        "fuzzy"
    }

    fn score(&self, query: &ScoredQuery, chunk: &Chunk) -> f32 {
        let candidates: Vec<&String> =
            query.terms.iter().filter(|t| t.len() >= 4).collect();
        if candidates.is_empty() {
            return 0.0;
        }

        let chunk_terms: HashSet<String> = tokenize(&chunk.content).into_iter().collect();
        let hits = candidates
            .iter()
            .filter(|term| {
                self.canonicalize(term)
                    .is_some_and(|canonical| chunk_terms.contains(canonical))
            })
            .count();

        hits as f32 / candidates.len() as f32
    }
}

/// Weighted aggregation over the configured strategies
pub struct WeightedScorer {
    strategies: Vec<(Box<dyn ScoringStrategy>, f32)>,
    total_weight: f32,
}

impl WeightedScorer {
    /// The standard hybrid: semantic + keyword + fuzzy with config weights
    pub fn hybrid(weights: ScoreWeights, fuzzy_max_edits: usize) -> Self {
        Self::new(vec![
            (Box::new(SemanticScorer), weights.semantic),
            (Box::new(KeywordScorer), weights.keyword),
            (Box::new(FuzzyScorer::new(fuzzy_max_edits)), weights.fuzzy),
        ])
    }

    /// Aggregate arbitrary strategies; weights validated upstream
    pub fn new(strategies: Vec<(Box<dyn ScoringStrategy>, f32)>) -> Self {
        let total_weight = strategies.iter().map(|(_, w)| w).sum();
        Self {
            strategies,
            total_weight,
        }
    }

    /// Weighted score in [0, 1]
    pub fn score(&self, query: &ScoredQuery, chunk: &Chunk) -> f32 {
        if self.total_weight <= 0.0 {
            return 0.0;
        }
        let sum: f32 = self
            .strategies
            .iter()
            .map(|(strategy, weight)| weight * strategy.score(query, chunk))
            .sum();
        sum / self.total_weight
    }
}

/// Levenshtein distance if within `max_edits`, None otherwise
fn bounded_levenshtein(a: &str, b: &str, max_edits: usize) -> Option<usize> {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.len().abs_diff(b.len()) > max_edits {
        return None;
    }

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        let mut row_min = current[0];

        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            current[j + 1] = (previous[j] + cost)
                .min(previous[j + 1] + 1)
                .min(current[j] + 1);
            row_min = row_min.min(current[j + 1]);
        }

        if row_min > max_edits {
            return None;
        }
        std::mem::swap(&mut previous, &mut current);
    }

    (previous[b.len()] <= max_edits).then_some(previous[b.len()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Language, SectionLabel};
    use uuid::Uuid;

    fn chunk(content: &str, embedding: Option<Vec<f32>>) -> Chunk {
        let mut c = Chunk::new(
            Uuid::new_v4(),
            content.to_string(),
            SectionLabel::General,
            Language::En,
            0,
            content.len(),
            0,
        );
        c.embedding = embedding;
        c
    }

    #[test]
    fn keyword_scorer_counts_exact_overlap() {
        let query = ScoredQuery::new("waiting period exclusions", vec![]);
        let hit = chunk("The waiting period for exclusions is listed below.", None);
        let miss = chunk("Premium payment schedule.", None);

        assert!(KeywordScorer.score(&query, &hit) > 0.9);
        assert_eq!(KeywordScorer.score(&query, &miss), 0.0);
    }

    #[test]
    fn fuzzy_scorer_catches_typos_in_domain_terms() {
        let query = ScoredQuery::new("what is my premum amount", vec![]);
        let c = chunk("The annual premium is Rs 15,000.", None);

        let scorer = FuzzyScorer::new(2);
        assert!(scorer.score(&query, &c) > 0.0);

        // A tighter bound stops matching the same typo
        let strict = FuzzyScorer::new(0);
        assert_eq!(strict.score(&query, &c), 0.0);
    }

    #[test]
    fn semantic_scorer_uses_embeddings() {
        let query = ScoredQuery::new("anything", vec![1.0, 0.0]);
        let aligned = chunk("a", Some(vec![1.0, 0.0]));
        let orthogonal = chunk("b", Some(vec![0.0, 1.0]));
        let unindexed = chunk("c", None);

        assert!(SemanticScorer.score(&query, &aligned) > 0.99);
        assert_eq!(SemanticScorer.score(&query, &orthogonal), 0.0);
        assert_eq!(SemanticScorer.score(&query, &unindexed), 0.0);
    }

    #[test]
    fn weighted_scorer_respects_weights() {
        let query = ScoredQuery::new("waiting period", vec![0.0, 1.0]);
        // Keyword hit, semantic miss
        let c = chunk("waiting period details", Some(vec![1.0, 0.0]));

        let keyword_only = WeightedScorer::hybrid(
            ScoreWeights {
                semantic: 0.0,
                keyword: 1.0,
                fuzzy: 0.0,
            },
            2,
        );
        let semantic_only = WeightedScorer::hybrid(
            ScoreWeights {
                semantic: 1.0,
                keyword: 0.0,
                fuzzy: 0.0,
            },
            2,
        );

        assert!(keyword_only.score(&query, &c) > 0.9);
        assert_eq!(semantic_only.score(&query, &c), 0.0);
    }

    #[test]
    fn bounded_levenshtein_respects_bound() {
        assert_eq!(bounded_levenshtein("premum", "premium", 2), Some(1));
        assert_eq!(bounded_levenshtein("claim", "claim", 2), Some(0));
        assert!(bounded_levenshtein("contact", "coverage", 2).is_none());
    }
}
