//! In-memory chunk store and document registry
//!
//! Durability belongs to the ingestion collaborator; this store holds the
//! indexed working set and enforces the chunk invariants at insert time.

pub mod chunker;

use dashmap::DashMap;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::types::{Chunk, Document};

pub use chunker::TextChunker;

/// Read-mostly store of documents and their chunks
#[derive(Default)]
pub struct ChunkStore {
    /// Document registry, chunks owned by their document
    documents: DashMap<Uuid, Document>,
    /// chunk id → parent document id
    chunk_parents: DashMap<Uuid, Uuid>,
}

impl ChunkStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a document, replacing any previous version with the same id
    ///
    /// Validates that chunk offsets are monotonic and disjoint and that every
    /// chunk carries the document's id. Returns the ids of replaced chunks so
    /// the caller can evict them from the embedding index.
    pub fn insert(&self, document: Document) -> Result<Vec<Uuid>> {
        validate_chunks(&document)?;

        let removed = self
            .remove(&document.id)
            .map(|old| old.chunks.iter().map(|c| c.id).collect())
            .unwrap_or_default();

        for chunk in &document.chunks {
            self.chunk_parents.insert(chunk.id, document.id);
        }
        self.documents.insert(document.id, document);

        Ok(removed)
    }

    /// Remove a document and its chunk mappings
    pub fn remove(&self, document_id: &Uuid) -> Option<Document> {
        let (_, document) = self.documents.remove(document_id)?;
        for chunk in &document.chunks {
            self.chunk_parents.remove(&chunk.id);
        }
        Some(document)
    }

    /// Get a document by id
    pub fn get(&self, document_id: &Uuid) -> Option<Document> {
        self.documents.get(document_id).map(|d| d.clone())
    }

    /// Ingestion timestamp of a document
    pub fn ingested_at(&self, document_id: &Uuid) -> Option<chrono::DateTime<chrono::Utc>> {
        self.documents.get(document_id).map(|d| d.ingested_at)
    }

    /// Look up a chunk by id
    pub fn get_chunk(&self, chunk_id: &Uuid) -> Option<Chunk> {
        let parent = self.chunk_parents.get(chunk_id)?;
        let document = self.documents.get(parent.value())?;
        document.chunks.iter().find(|c| c.id == *chunk_id).cloned()
    }

    /// All chunks of the given documents
    pub fn chunks_of(&self, document_ids: &[Uuid]) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        for id in document_ids {
            if let Some(document) = self.documents.get(id) {
                chunks.extend(document.chunks.iter().cloned());
            }
        }
        chunks
    }

    /// Number of stored documents
    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// Number of stored chunks
    pub fn chunk_count(&self) -> usize {
        self.chunk_parents.len()
    }
}

/// Enforce chunk invariants: parent ids match, offsets monotonic and disjoint
fn validate_chunks(document: &Document) -> Result<()> {
    let mut previous_end = 0usize;

    for (i, chunk) in document.chunks.iter().enumerate() {
        if chunk.document_id != document.id {
            return Err(Error::invalid_document(
                document.id,
                format!("chunk {} belongs to a different document", chunk.id),
            ));
        }
        if chunk.char_end < chunk.char_start {
            return Err(Error::invalid_document(
                document.id,
                format!("chunk {} has an inverted span", chunk.id),
            ));
        }
        if i > 0 && chunk.char_start < previous_end {
            return Err(Error::invalid_document(
                document.id,
                format!("chunk {} overlaps the previous chunk", chunk.id),
            ));
        }
        previous_end = chunk.char_end;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Language, SectionLabel};

    fn doc_with_spans(spans: &[(usize, usize)]) -> Document {
        let id = Uuid::new_v4();
        let chunks = spans
            .iter()
            .enumerate()
            .map(|(i, (start, end))| {
                Chunk::new(
                    id,
                    format!("chunk {}", i),
                    SectionLabel::General,
                    Language::En,
                    *start,
                    *end,
                    i as u32,
                )
            })
            .collect();

        Document {
            id,
            language: Language::En,
            chunks,
            ingested_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn overlapping_offsets_are_rejected() {
        let store = ChunkStore::new();
        let err = store.insert(doc_with_spans(&[(0, 100), (50, 150)])).unwrap_err();
        assert!(matches!(err, Error::InvalidDocument { .. }));
    }

    #[test]
    fn reingest_replaces_and_reports_old_chunks() {
        let store = ChunkStore::new();
        let mut first = doc_with_spans(&[(0, 100), (100, 200)]);
        let old_ids: Vec<Uuid> = first.chunks.iter().map(|c| c.id).collect();
        store.insert(first.clone()).unwrap();

        first.chunks = doc_with_spans(&[(0, 50)])
            .chunks
            .into_iter()
            .map(|mut c| {
                c.document_id = first.id;
                c
            })
            .collect();
        let replaced = store.insert(first.clone()).unwrap();

        assert_eq!(replaced, old_ids);
        assert_eq!(store.document_count(), 1);
        assert_eq!(store.chunk_count(), 1);
        for id in &old_ids {
            assert!(store.get_chunk(id).is_none());
        }
    }

    #[test]
    fn chunk_lookup_roundtrip() {
        let store = ChunkStore::new();
        let document = doc_with_spans(&[(0, 40)]);
        let chunk_id = document.chunks[0].id;
        store.insert(document.clone()).unwrap();

        let chunk = store.get_chunk(&chunk_id).unwrap();
        assert_eq!(chunk.document_id, document.id);
    }
}
