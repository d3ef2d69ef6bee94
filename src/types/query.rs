//! Query and ingest request types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::document::{Language, SectionLabel};

/// A prior conversation turn supplied by the front-end collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// Who spoke: "user" or "assistant"
    pub role: String,
    /// Turn content
    pub content: String,
}

/// Query request for the Q&A pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    /// The question to answer
    pub question: String,

    /// Declared question language; detected from the text when absent
    #[serde(default)]
    pub language: Option<Language>,

    /// Language the answer must be written in (defaults to the question language)
    #[serde(default)]
    pub target_language: Option<Language>,

    /// Prior turns for conversational context
    #[serde(default)]
    pub conversation: Vec<ConversationTurn>,

    /// Generation deadline override in milliseconds
    #[serde(default)]
    pub deadline_ms: Option<u64>,
}

impl QueryRequest {
    /// Create a new query
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            language: None,
            target_language: None,
            conversation: Vec::new(),
            deadline_ms: None,
        }
    }

    /// Set the question language
    pub fn with_language(mut self, language: Language) -> Self {
        self.language = Some(language);
        self
    }

    /// Set the answer language
    pub fn with_target_language(mut self, language: Language) -> Self {
        self.target_language = Some(language);
        self
    }

    /// Resolved question language: declared wins, else detected
    pub fn resolved_language(&self) -> Language {
        self.language.unwrap_or_else(|| Language::detect(&self.question))
    }

    /// Resolved answer language
    pub fn resolved_target_language(&self) -> Language {
        self.target_language.unwrap_or_else(|| self.resolved_language())
    }
}

/// A chunk supplied by the ingestion collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestChunk {
    /// Normalized text
    pub text: String,
    /// Section label; detected from the text when absent
    #[serde(default)]
    pub section: Option<SectionLabel>,
    /// Chunk language; defaults to the document language
    #[serde(default)]
    pub language: Option<Language>,
}

/// Document ingest request
///
/// Pre-chunked input is used as-is; `raw_text` is chunked by the engine.
/// Exactly one of `chunks` / `raw_text` must be non-empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestRequest {
    /// Document ID; re-ingesting an existing ID replaces the document
    pub document_id: Uuid,
    /// Source language
    #[serde(default)]
    pub language: Language,
    /// Ordered, pre-extracted chunks
    #[serde(default)]
    pub chunks: Vec<IngestChunk>,
    /// Raw policy text for engine-side chunking
    #[serde(default)]
    pub raw_text: Option<String>,
}
