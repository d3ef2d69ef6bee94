//! Shared multilingual embedding index
//!
//! One id→vector table per granularity (document summaries, chunks), cosine
//! similarity search. All supported languages live in the same space, which
//! is what makes cross-lingual retrieval work: a Marathi query vector lands
//! near English chunk vectors with the same meaning.

use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::{Error, Result};

/// In-memory embedding index with idempotent insertion
///
/// Exact cosine search over a linear scan; sized for ≤100k vectors with
/// k ≤ 50.
pub struct EmbeddingIndex {
    dimensions: usize,
    vectors: RwLock<HashMap<Uuid, Vec<f32>>>,
}

impl EmbeddingIndex {
    /// Create an index for the configured embedding space
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            vectors: RwLock::new(HashMap::new()),
        }
    }

    /// Configured dimensionality
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Insert or overwrite a vector
    ///
    /// Indexing the same id twice replaces the previous vector; searches
    /// never see the stale one.
    pub fn index(&self, id: Uuid, vector: Vec<f32>) -> Result<()> {
        if vector.len() != self.dimensions {
            return Err(Error::InvalidVector {
                expected: self.dimensions,
                actual: vector.len(),
            });
        }
        self.vectors.write().insert(id, vector);
        Ok(())
    }

    /// Remove a vector by id, returning whether it existed
    pub fn remove(&self, id: &Uuid) -> bool {
        self.vectors.write().remove(id).is_some()
    }

    /// Remove many vectors at once (document deletion)
    pub fn remove_many(&self, ids: &[Uuid]) -> usize {
        let mut vectors = self.vectors.write();
        ids.iter().filter(|id| vectors.remove(id).is_some()).count()
    }

    /// Nearest neighbors by cosine similarity
    ///
    /// Returns at most `k` `(id, score)` pairs with non-increasing scores.
    /// Ties break by id; repeated searches return identical orderings.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(Uuid, f32)>> {
        if query.len() != self.dimensions {
            return Err(Error::InvalidVector {
                expected: self.dimensions,
                actual: query.len(),
            });
        }
        if k == 0 {
            return Ok(Vec::new());
        }

        let vectors = self.vectors.read();
        let mut scored: Vec<(Uuid, f32)> = vectors
            .iter()
            .map(|(id, vector)| (*id, cosine_similarity(query, vector)))
            .collect();

        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        scored.truncate(k);

        Ok(scored)
    }

    /// Number of indexed vectors
    pub fn len(&self) -> usize {
        self.vectors.read().len()
    }

    /// Whether the index is empty
    pub fn is_empty(&self) -> bool {
        self.vectors.read().is_empty()
    }
}

/// Cosine similarity between two equal-length vectors
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Element-wise mean of a set of vectors (document summary embedding)
pub fn centroid(vectors: &[Vec<f32>], dimensions: usize) -> Vec<f32> {
    let mut sum = vec![0.0f32; dimensions];
    if vectors.is_empty() {
        return sum;
    }

    for vector in vectors {
        for (acc, value) in sum.iter_mut().zip(vector.iter()) {
            *acc += value;
        }
    }
    let n = vectors.len() as f32;
    for value in &mut sum {
        *value /= n;
    }
    sum
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(direction: usize, dimensions: usize) -> Vec<f32> {
        let mut v = vec![0.0; dimensions];
        v[direction] = 1.0;
        v
    }

    #[test]
    fn search_scores_are_non_increasing_and_bounded_by_k() {
        let index = EmbeddingIndex::new(4);
        for i in 0..4 {
            index.index(Uuid::new_v4(), unit(i, 4)).unwrap();
        }

        let results = index.search(&[0.9, 0.3, 0.1, 0.0], 3).unwrap();
        assert_eq!(results.len(), 3);
        for pair in results.windows(2) {
            assert!(pair[0].1 >= pair[1].1);
        }
    }

    #[test]
    fn reindexing_overwrites_instead_of_duplicating() {
        let index = EmbeddingIndex::new(2);
        let id = Uuid::new_v4();

        index.index(id, vec![1.0, 0.0]).unwrap();
        index.index(id, vec![0.0, 1.0]).unwrap();
        assert_eq!(index.len(), 1);

        // The stale vector must never come back: the old direction now
        // scores zero.
        let results = index.search(&[1.0, 0.0], 1).unwrap();
        assert_eq!(results[0].0, id);
        assert!(results[0].1.abs() < 1e-6);
    }

    #[test]
    fn dimension_mismatch_is_rejected() {
        let index = EmbeddingIndex::new(3);
        let err = index.index(Uuid::new_v4(), vec![1.0, 2.0]).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidVector { expected: 3, actual: 2 }
        ));

        index.index(Uuid::new_v4(), vec![1.0, 0.0, 0.0]).unwrap();
        assert!(index.search(&[1.0], 5).is_err());
    }

    #[test]
    fn centroid_averages_components() {
        let c = centroid(&[vec![1.0, 0.0], vec![0.0, 1.0]], 2);
        assert_eq!(c, vec![0.5, 0.5]);
    }
}
