//! Document and chunk types with section and language metadata

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Supported languages, all mapped into one shared embedding space
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English
    #[default]
    En,
    /// Hindi
    Hi,
    /// Marathi
    Mr,
}

impl Language {
    /// Detect language from text by script
    ///
    /// Hindi and Marathi share Devanagari; a declared language always wins
    /// over detection, so Devanagari resolves to Hindi here.
    pub fn detect(text: &str) -> Self {
        let devanagari = text
            .chars()
            .filter(|c| ('\u{0900}'..='\u{097F}').contains(c))
            .count();
        let letters = text.chars().filter(|c| c.is_alphabetic()).count();

        if letters > 0 && devanagari * 2 > letters {
            Self::Hi
        } else {
            Self::En
        }
    }

    /// Display name in English
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::En => "English",
            Self::Hi => "Hindi",
            Self::Mr => "Marathi",
        }
    }
}

/// Policy document section labels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionLabel {
    /// What the policy covers
    Coverage,
    /// What the policy excludes
    Exclusions,
    /// How to file and track a claim
    ClaimsProcedure,
    /// Premium amounts and payment terms
    Premium,
    /// Insurer contact details
    Contact,
    /// Unlabeled or miscellaneous text
    #[default]
    General,
}

impl SectionLabel {
    /// Detect a section label from a heading or leading text
    pub fn detect(text: &str) -> Self {
        let lower = text.to_lowercase();

        if lower.contains("exclusion") || lower.contains("not covered") {
            Self::Exclusions
        } else if lower.contains("claim") || lower.contains("दावा") {
            Self::ClaimsProcedure
        } else if lower.contains("coverage")
            || lower.contains("benefits")
            || lower.contains("sum insured")
        {
            Self::Coverage
        } else if lower.contains("premium") {
            Self::Premium
        } else if lower.contains("contact") || lower.contains("helpline") {
            Self::Contact
        } else {
            Self::General
        }
    }

    /// Display name for prompts and citations
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Coverage => "Coverage",
            Self::Exclusions => "Exclusions",
            Self::ClaimsProcedure => "Claims Procedure",
            Self::Premium => "Premium",
            Self::Contact => "Contact",
            Self::General => "General",
        }
    }
}

/// An ingested policy document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique document ID
    pub id: Uuid,
    /// Source language
    pub language: Language,
    /// Ordered chunks, offsets monotonic and disjoint
    pub chunks: Vec<Chunk>,
    /// Ingestion timestamp
    pub ingested_at: chrono::DateTime<chrono::Utc>,
}

/// A contiguous span of normalized policy text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Unique chunk ID
    pub id: Uuid,
    /// Parent document ID
    pub document_id: Uuid,
    /// Normalized text content
    pub content: String,
    /// Section label
    pub section: SectionLabel,
    /// Language of this chunk (may differ from the document language)
    pub language: Language,
    /// Character span in the original document
    pub char_start: usize,
    pub char_end: usize,
    /// Chunk index within the document
    pub chunk_index: u32,
    /// Embedding vector, None until indexed
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub embedding: Option<Vec<f32>>,
}

impl Chunk {
    /// Create a new, not-yet-indexed chunk
    pub fn new(
        document_id: Uuid,
        content: String,
        section: SectionLabel,
        language: Language,
        char_start: usize,
        char_end: usize,
        chunk_index: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            document_id,
            content,
            section,
            language,
            char_start,
            char_end,
            chunk_index,
            embedding: None,
        }
    }
}
