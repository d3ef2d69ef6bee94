//! Query pipeline: retrieve → generate → verify
//!
//! Each query is a stateless, read-only pass over the shared store and
//! indexes; any number may run concurrently. Writes (ingest/delete) are
//! serialized per document id and parallel across documents.

use std::sync::Arc;
use std::time::Instant;

use dashmap::DashMap;
use uuid::Uuid;

use crate::audit::{AuditRecord, AuditSink};
use crate::config::RagConfig;
use crate::error::{Error, Result};
use crate::generation::{followup_questions, AnswerGenerator};
use crate::index::{centroid, EmbeddingIndex};
use crate::providers::{EmbeddingProvider, FactLookup, LlmProvider};
use crate::retrieval::{HybridRetriever, ScoredQuery};
use crate::store::{ChunkStore, TextChunker};
use crate::types::{Answer, Chunk, Document, IngestRequest, QueryRequest};
use crate::verification::FactVerifier;

/// Result of ingesting one document
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct IngestSummary {
    /// Document ID
    pub document_id: Uuid,
    /// Chunks indexed for this document
    pub chunks_indexed: usize,
    /// Whether a previous version of the document was replaced
    pub replaced: bool,
}

/// Final outcome of one answered query
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct QueryOutcome {
    /// Query ID (also used in the audit record)
    pub query_id: Uuid,
    /// The verified answer
    pub answer: Answer,
    /// Suggested follow-up questions
    pub suggested_questions: Vec<String>,
    /// End-to-end processing time in milliseconds
    pub processing_time_ms: u64,
}

/// The policy Q&A engine
pub struct PolicyQaEngine {
    config: RagConfig,
    store: Arc<ChunkStore>,
    doc_index: Arc<EmbeddingIndex>,
    chunk_index: Arc<EmbeddingIndex>,
    retriever: HybridRetriever,
    generator: AnswerGenerator,
    verifier: FactVerifier,
    embedder: Arc<dyn EmbeddingProvider>,
    llm: Arc<dyn LlmProvider>,
    audit: Option<Arc<dyn AuditSink>>,
    ingest_locks: DashMap<Uuid, Arc<tokio::sync::Mutex<()>>>,
}

impl PolicyQaEngine {
    /// Wire up the engine from config and injected providers
    pub fn new(
        config: RagConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmProvider>,
        lookup: Arc<dyn FactLookup>,
        audit: Option<Arc<dyn AuditSink>>,
    ) -> Result<Self> {
        config.validate()?;

        let dimensions = embedder.dimensions();
        let store = Arc::new(ChunkStore::new());
        let doc_index = Arc::new(EmbeddingIndex::new(dimensions));
        let chunk_index = Arc::new(EmbeddingIndex::new(dimensions));

        let retriever = HybridRetriever::new(
            Arc::clone(&store),
            Arc::clone(&doc_index),
            config.retrieval.clone(),
        );
        let generator = AnswerGenerator::new(Arc::clone(&llm), config.generation.clone());
        let verifier = FactVerifier::new(lookup, config.verification.clone());

        Ok(Self {
            config,
            store,
            doc_index,
            chunk_index,
            retriever,
            generator,
            verifier,
            embedder,
            llm,
            audit,
            ingest_locks: DashMap::new(),
        })
    }

    /// Ingest a document, replacing any previous version with the same id
    ///
    /// Writes for one document id are serialized; different documents may
    /// ingest in parallel.
    pub async fn ingest(&self, request: IngestRequest) -> Result<IngestSummary> {
        let lock = self
            .ingest_locks
            .entry(request.document_id)
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone();
        let _guard = lock.lock().await;

        let chunks = self.build_chunks(&request)?;
        if chunks.is_empty() {
            return Err(Error::invalid_document(
                request.document_id,
                "no chunks could be produced from the request",
            ));
        }

        // Embed everything before touching shared state
        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        let dimensions = self.chunk_index.dimensions();
        for embedding in &embeddings {
            if embedding.len() != dimensions {
                return Err(Error::InvalidVector {
                    expected: dimensions,
                    actual: embedding.len(),
                });
            }
        }

        let chunks: Vec<Chunk> = chunks
            .into_iter()
            .zip(embeddings.iter())
            .map(|(mut chunk, embedding)| {
                chunk.embedding = Some(embedding.clone());
                chunk
            })
            .collect();
        let summary_embedding = centroid(&embeddings, dimensions);

        let document = Document {
            id: request.document_id,
            language: request.language,
            chunks,
            ingested_at: chrono::Utc::now(),
        };
        let chunk_count = document.chunks.len();

        let replaced = self.store.insert(document.clone())?;
        self.chunk_index.remove_many(&replaced);

        for (chunk, embedding) in document.chunks.iter().zip(embeddings.iter()) {
            self.chunk_index.index(chunk.id, embedding.clone())?;
        }
        self.doc_index.index(document.id, summary_embedding)?;

        tracing::info!(
            document_id = %request.document_id,
            chunks = chunk_count,
            replaced = !replaced.is_empty(),
            "document ingested"
        );

        Ok(IngestSummary {
            document_id: request.document_id,
            chunks_indexed: chunk_count,
            replaced: !replaced.is_empty(),
        })
    }

    /// Delete a document and all of its indexed chunks
    pub async fn delete_document(&self, document_id: Uuid) -> Result<usize> {
        let lock = self
            .ingest_locks
            .entry(document_id)
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone();
        let _guard = lock.lock().await;

        let document = self
            .store
            .remove(&document_id)
            .ok_or_else(|| Error::DocumentNotFound(document_id.to_string()))?;

        let chunk_ids: Vec<Uuid> = document.chunks.iter().map(|c| c.id).collect();
        let removed = self.chunk_index.remove_many(&chunk_ids);
        self.doc_index.remove(&document_id);

        tracing::info!(document_id = %document_id, chunks = removed, "document deleted");
        Ok(removed)
    }

    /// Answer a query end to end
    ///
    /// Retrieval and generation errors are terminal for the query;
    /// verification is best-effort and only adjusts status and confidence.
    pub async fn answer(&self, request: QueryRequest) -> Result<QueryOutcome> {
        let started = Instant::now();
        let query_id = Uuid::new_v4();
        let language = request.resolved_language();

        tracing::debug!(%query_id, ?language, "processing query");

        let query_embedding = self.embedder.embed(&request.question).await?;
        let scored = ScoredQuery::new(request.question.clone(), query_embedding);

        let retrieval = self.retriever.retrieve(&scored, language)?;
        let draft = self.generator.generate(&request, &retrieval).await?;
        let answer = self.verifier.verify(draft).await;

        if let Some(sink) = &self.audit {
            sink.record(AuditRecord {
                query_id,
                timestamp: chrono::Utc::now(),
                answer: answer.text.clone(),
                confidence: answer.confidence,
                verification_status: answer.verification_status,
                language: answer.language,
            });
        }

        let outcome = QueryOutcome {
            query_id,
            suggested_questions: followup_questions(&request.question),
            processing_time_ms: started.elapsed().as_millis() as u64,
            answer,
        };

        tracing::info!(
            %query_id,
            confidence = outcome.answer.confidence,
            status = ?outcome.answer.verification_status,
            elapsed_ms = outcome.processing_time_ms,
            "query answered"
        );

        Ok(outcome)
    }

    /// Direct nearest-neighbor search over indexed chunks
    pub async fn search_chunks(&self, query: &str, k: usize) -> Result<Vec<(Chunk, f32)>> {
        let embedding = self.embedder.embed(query).await?;
        let hits = self.chunk_index.search(&embedding, k)?;

        Ok(hits
            .into_iter()
            .filter_map(|(id, score)| self.store.get_chunk(&id).map(|chunk| (chunk, score)))
            .collect())
    }

    /// Providers reachable and ready
    pub async fn health_check(&self) -> Result<bool> {
        Ok(self.embedder.health_check().await? && self.llm.health_check().await?)
    }

    /// Engine configuration
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Number of indexed documents
    pub fn document_count(&self) -> usize {
        self.store.document_count()
    }

    /// Number of indexed chunks
    pub fn chunk_count(&self) -> usize {
        self.store.chunk_count()
    }

    /// Build chunks from a request: pre-chunked input wins, raw text is
    /// chunked by the engine
    fn build_chunks(&self, request: &IngestRequest) -> Result<Vec<Chunk>> {
        if !request.chunks.is_empty() {
            let mut offset = 0usize;
            let chunks = request
                .chunks
                .iter()
                .enumerate()
                .map(|(i, ingest)| {
                    let start = offset;
                    let end = start + ingest.text.len();
                    offset = end + 1;
                    Chunk::new(
                        request.document_id,
                        ingest.text.clone(),
                        ingest
                            .section
                            .unwrap_or_else(|| crate::types::SectionLabel::detect(&ingest.text)),
                        ingest.language.unwrap_or(request.language),
                        start,
                        end,
                        i as u32,
                    )
                })
                .collect();
            return Ok(chunks);
        }

        if let Some(text) = &request.raw_text {
            let chunker = TextChunker::new(&self.config.chunking);
            return Ok(chunker.chunk_text(request.document_id, text, request.language));
        }

        Err(Error::invalid_document(
            request.document_id,
            "request carries neither chunks nor raw_text",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::LookupResult;
    use crate::types::{ClaimOutcome, IngestChunk, Language, SectionLabel, VerificationStatus};
    use async_trait::async_trait;
    use parking_lot::Mutex;

    /// Concept vocabulary shared by every language in the fake space; one
    /// dimension per concept.
    const CONCEPTS: &[&str] = &[
        "waiting",
        "period",
        "pre",
        "existing",
        "conditions",
        "exclusions",
        "48",
        "24",
        "month",
        "hospitalization",
        "expenses",
        "covered",
        "policy",
        "year",
        "cosmetic",
        "surgery",
        "dental",
        "treatment",
        "claim",
        "premium",
    ];

    const TRANSLATIONS: &[(&str, &str)] = &[
        ("पूर्व", "pre"),
        ("विद्यमान", "existing"),
        ("आजार", "conditions"),
        ("प्रतीक्षा", "waiting"),
        ("कालावधी", "period"),
        ("अवधि", "period"),
        ("विमा", "policy"),
        ("दावा", "claim"),
    ];

    const DIM: usize = CONCEPTS.len();

    /// Deterministic concept-bag embedder emulating a shared multilingual
    /// space: Marathi/Hindi terms land in the same dimension as their
    /// English counterpart, everything outside the vocabulary contributes
    /// nothing.
    struct FakeEmbedder;

    fn embed_text(text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; DIM];
        for token in crate::retrieval::scoring::tokenize(text) {
            let token = TRANSLATIONS
                .iter()
                .find(|(src, _)| *src == token)
                .map(|(_, dst)| dst.to_string())
                .unwrap_or(token);
            if let Some(dim) = CONCEPTS.iter().position(|c| *c == token) {
                vector[dim] += 1.0;
            }
        }
        let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        vector
    }

    #[async_trait]
    impl EmbeddingProvider for FakeEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            Ok(embed_text(text))
        }

        fn dimensions(&self) -> usize {
            DIM
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        fn name(&self) -> &str {
            "fake-embedder"
        }
    }

    /// Fake LLM answering from the prompt language directive
    struct FakeLlm;

    #[async_trait]
    impl LlmProvider for FakeLlm {
        async fn generate(&self, prompt: &str) -> Result<String> {
            if prompt.contains("Answer in Marathi") {
                Ok("पूर्व-विद्यमान आजारांसाठी प्रतीक्षा कालावधी ४८ महिने (48 months) आहे [1].".to_string())
            } else {
                Ok("The waiting period for pre-existing conditions is 48 months [1].".to_string())
            }
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        fn name(&self) -> &str {
            "fake-llm"
        }

        fn model(&self) -> &str {
            "fake"
        }
    }

    struct SupportiveLookup;

    #[async_trait]
    impl FactLookup for SupportiveLookup {
        async fn lookup(&self, _claim_text: &str) -> Result<LookupResult> {
            Ok(LookupResult {
                outcome: ClaimOutcome::Supported,
                evidence_refs: vec!["policy:clause-4.2".to_string()],
            })
        }

        fn name(&self) -> &str {
            "supportive"
        }
    }

    /// Audit sink capturing records for assertions
    #[derive(Default)]
    struct RecordingSink {
        records: Mutex<Vec<AuditRecord>>,
    }

    impl AuditSink for RecordingSink {
        fn record(&self, record: AuditRecord) {
            self.records.lock().push(record);
        }
    }

    fn engine_with_audit() -> (PolicyQaEngine, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::default());
        let engine = PolicyQaEngine::new(
            RagConfig::default(),
            Arc::new(FakeEmbedder),
            Arc::new(FakeLlm),
            Arc::new(SupportiveLookup),
            Some(sink.clone() as Arc<dyn AuditSink>),
        )
        .unwrap();
        (engine, sink)
    }

    fn policy_request(document_id: Uuid) -> IngestRequest {
        IngestRequest {
            document_id,
            language: Language::En,
            chunks: vec![
                IngestChunk {
                    text: "Hospitalization expenses are covered up to Rs 5,00,000 per policy year."
                        .to_string(),
                    section: Some(SectionLabel::Coverage),
                    language: None,
                },
                IngestChunk {
                    text: "Exclusions: pre-existing conditions: 48-month waiting period applies."
                        .to_string(),
                    section: Some(SectionLabel::Exclusions),
                    language: None,
                },
            ],
            raw_text: None,
        }
    }

    #[tokio::test]
    async fn waiting_period_scenario_end_to_end() {
        let (engine, sink) = engine_with_audit();
        let doc_id = Uuid::new_v4();
        engine.ingest(policy_request(doc_id)).await.unwrap();

        let outcome = engine
            .answer(QueryRequest::new(
                "What is the waiting period for pre-existing conditions?",
            ))
            .await
            .unwrap();

        assert!(outcome.answer.text.contains("48"));
        assert_eq!(outcome.answer.verification_status, VerificationStatus::Verified);
        assert!(outcome
            .answer
            .citations
            .iter()
            .any(|c| c.snippet.contains("48-month")));
        assert!(!outcome.suggested_questions.is_empty());

        // Audit record emitted for the compliance collaborator
        let records = sink.records.lock();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].query_id, outcome.query_id);
    }

    #[tokio::test]
    async fn marathi_query_over_english_corpus_answers_in_marathi() {
        let (engine, _) = engine_with_audit();
        engine.ingest(policy_request(Uuid::new_v4())).await.unwrap();

        let outcome = engine
            .answer(
                QueryRequest::new("पूर्व-विद्यमान आजार प्रतीक्षा कालावधी?")
                    .with_language(Language::Mr)
                    .with_target_language(Language::Mr),
            )
            .await
            .unwrap();

        assert_eq!(outcome.answer.language, Language::Mr);
        assert!(outcome.answer.text.contains("४८") || outcome.answer.text.contains("48"));
        // Evidence is English even though the answer is Marathi
        assert!(outcome
            .answer
            .citations
            .iter()
            .any(|c| c.snippet.contains("waiting period")));
    }

    #[tokio::test]
    async fn unrelated_query_is_no_match_not_a_fabricated_answer() {
        let (engine, sink) = engine_with_audit();
        engine.ingest(policy_request(Uuid::new_v4())).await.unwrap();

        let err = engine
            .answer(QueryRequest::new("zzzqq xxyyk wwvvb"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::NoMatch));
        assert!(sink.records.lock().is_empty());
    }

    #[tokio::test]
    async fn reingest_replaces_stale_chunks() {
        let (engine, _) = engine_with_audit();
        let doc_id = Uuid::new_v4();

        let mut first = policy_request(doc_id);
        first.chunks[1].text =
            "Exclusions: pre-existing conditions: 24-month waiting period applies.".to_string();
        engine.ingest(first).await.unwrap();

        let summary = engine.ingest(policy_request(doc_id)).await.unwrap();
        assert!(summary.replaced);
        assert_eq!(engine.document_count(), 1);

        let outcome = engine
            .answer(QueryRequest::new(
                "What is the waiting period for pre-existing conditions?",
            ))
            .await
            .unwrap();

        assert!(outcome
            .answer
            .citations
            .iter()
            .all(|c| !c.snippet.contains("24-month")));
    }

    #[tokio::test]
    async fn deleted_document_is_unreachable() {
        let (engine, _) = engine_with_audit();
        let doc_id = Uuid::new_v4();
        engine.ingest(policy_request(doc_id)).await.unwrap();

        let removed = engine.delete_document(doc_id).await.unwrap();
        assert_eq!(removed, 2);
        assert_eq!(engine.chunk_count(), 0);

        let err = engine
            .answer(QueryRequest::new("What is the waiting period?"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NoMatch));

        let err = engine.delete_document(doc_id).await.unwrap_err();
        assert!(matches!(err, Error::DocumentNotFound(_)));
    }

    #[tokio::test]
    async fn raw_text_ingest_detects_sections() {
        let (engine, _) = engine_with_audit();
        let doc_id = Uuid::new_v4();

        engine
            .ingest(IngestRequest {
                document_id: doc_id,
                language: Language::En,
                chunks: Vec::new(),
                raw_text: Some(
                    "Exclusions: cosmetic surgery and dental treatment are not covered, \
                     and pre-existing conditions carry a 48-month waiting period."
                        .to_string(),
                ),
            })
            .await
            .unwrap();

        let hits = engine.search_chunks("waiting period exclusions", 5).await.unwrap();
        assert!(!hits.is_empty());
        assert_eq!(hits[0].0.section, SectionLabel::Exclusions);
    }

    #[tokio::test]
    async fn concurrent_queries_share_the_engine() {
        let (engine, _) = engine_with_audit();
        engine.ingest(policy_request(Uuid::new_v4())).await.unwrap();
        let engine = Arc::new(engine);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let engine = Arc::clone(&engine);
                tokio::spawn(async move {
                    engine
                        .answer(QueryRequest::new(
                            "What is the waiting period for pre-existing conditions?",
                        ))
                        .await
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.await.unwrap().is_ok());
        }
    }
}
