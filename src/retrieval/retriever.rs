//! Three-tier hybrid retriever: document → section → passage

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use uuid::Uuid;

use crate::config::RetrievalConfig;
use crate::error::{Error, Result};
use crate::index::EmbeddingIndex;
use crate::store::ChunkStore;
use crate::types::{Chunk, Language, SectionLabel};

use super::scoring::{ScoredQuery, WeightedScorer};
use super::{Granularity, RankedPassage, RetrievalResult};

/// Hybrid retriever over the chunk store and document-level index
pub struct HybridRetriever {
    store: Arc<ChunkStore>,
    doc_index: Arc<EmbeddingIndex>,
    config: RetrievalConfig,
}

impl HybridRetriever {
    /// Create a retriever; config must already be validated
    pub fn new(
        store: Arc<ChunkStore>,
        doc_index: Arc<EmbeddingIndex>,
        config: RetrievalConfig,
    ) -> Self {
        Self {
            store,
            doc_index,
            config,
        }
    }

    /// Retrieve ranked passages for a query
    ///
    /// Coarse pass shortlists documents by summary embedding; the section
    /// pass gates (document, section) groups by hybrid score; the passage
    /// pass ranks surviving chunks. An empty coarse pass is a `NoMatch`
    /// error, never a context fabricated from unrelated documents.
    pub fn retrieve(&self, query: &ScoredQuery, language: Language) -> Result<RetrievalResult> {
        // Tier 1: coarse document shortlist
        let coarse = self
            .doc_index
            .search(&query.embedding, self.config.coarse_top_n)?;
        let shortlisted: Vec<Uuid> = coarse
            .iter()
            .filter(|(_, score)| *score >= self.config.coarse_threshold)
            .map(|(id, _)| *id)
            .collect();

        if shortlisted.is_empty() {
            tracing::debug!("coarse pass found no document above threshold");
            return Err(Error::NoMatch);
        }

        let scorer = WeightedScorer::hybrid(
            self.config.weights_for(language),
            self.config.fuzzy_max_edits,
        );

        // Tier 2: hybrid scoring of section-labeled chunks
        let chunks = self.store.chunks_of(&shortlisted);
        let mut scored: Vec<(Chunk, f32)> = Vec::with_capacity(chunks.len());
        let mut section_best: HashMap<(Uuid, SectionLabel), f32> = HashMap::new();

        for chunk in chunks {
            let score = scorer.score(query, &chunk);
            let key = (chunk.document_id, chunk.section);
            let best = section_best.entry(key).or_insert(score);
            if score > *best {
                *best = score;
            }
            scored.push((chunk, score));
        }

        let surviving: HashSet<(Uuid, SectionLabel)> = section_best
            .into_iter()
            .filter(|(_, best)| *best >= self.config.section_threshold)
            .map(|(key, _)| key)
            .collect();

        if surviving.is_empty() {
            tracing::debug!("section pass found no section above threshold");
            return Err(Error::NoMatch);
        }

        // Tier 3: rank passages within surviving sections
        let mut ingested_at: HashMap<Uuid, chrono::DateTime<chrono::Utc>> = HashMap::new();
        for id in &shortlisted {
            if let Some(at) = self.store.ingested_at(id) {
                ingested_at.insert(*id, at);
            }
        }

        scored.retain(|(chunk, _)| surviving.contains(&(chunk.document_id, chunk.section)));
        scored.sort_by(|(a, score_a), (b, score_b)| {
            // Equal scores: newer document first, then lower offset, then id
            score_b
                .partial_cmp(score_a)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| {
                    let at_a = ingested_at.get(&a.document_id);
                    let at_b = ingested_at.get(&b.document_id);
                    at_b.cmp(&at_a)
                })
                .then_with(|| a.char_start.cmp(&b.char_start))
                .then_with(|| a.id.cmp(&b.id))
        });

        let mut per_document: HashMap<Uuid, usize> = HashMap::new();
        let mut passages = Vec::with_capacity(self.config.passage_top_k);

        for (chunk, score) in scored {
            let seen = per_document.entry(chunk.document_id).or_insert(0);
            if *seen >= self.config.max_passages_per_document {
                continue;
            }
            *seen += 1;

            passages.push(RankedPassage {
                chunk,
                score,
                granularity: Granularity::Passage,
            });
            if passages.len() >= self.config.passage_top_k {
                break;
            }
        }

        tracing::debug!(
            passages = passages.len(),
            top_score = passages.first().map(|p| p.score).unwrap_or(0.0),
            "retrieval complete"
        );

        Ok(RetrievalResult { passages })
    }
}
