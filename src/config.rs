//! Configuration for the policy Q&A engine

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::{Error, Result};
use crate::types::Language;

/// Main engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RagConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Embedding configuration
    #[serde(default)]
    pub embeddings: EmbeddingConfig,
    /// Chunking configuration (raw-text ingests only)
    #[serde(default)]
    pub chunking: ChunkingConfig,
    /// Ollama/LLM configuration
    #[serde(default)]
    pub llm: LlmConfig,
    /// Retrieval configuration
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    /// Generation configuration
    #[serde(default)]
    pub generation: GenerationConfig,
    /// Verification configuration
    #[serde(default)]
    pub verification: VerificationConfig,
}

impl RagConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self =
            toml::from_str(&content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the whole configuration
    pub fn validate(&self) -> Result<()> {
        self.retrieval.validate()?;
        self.generation.validate()?;
        self.verification.validate()
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
    /// Maximum request body size in bytes
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            enable_cors: true,
            max_body_size: 16 * 1024 * 1024, // 16MB of pre-extracted text
        }
    }
}

/// Embedding space configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Embedding model name (must map all supported languages into one space)
    pub model: String,
    /// Embedding dimensions
    pub dimensions: usize,
    /// Batch size for embedding generation
    pub batch_size: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "paraphrase-multilingual-MiniLM-L12-v2".to_string(),
            dimensions: 384,
            batch_size: 32,
        }
    }
}

/// Text chunking configuration for raw-text ingests
///
/// Chunks are non-overlapping; chunk offsets must stay disjoint within a
/// document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Target chunk size in characters
    pub chunk_size: usize,
    /// Minimum chunk size (skip smaller chunks)
    pub min_chunk_size: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 512,
            min_chunk_size: 40,
        }
    }
}

/// LLM (Ollama) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Ollama base URL
    pub base_url: String,
    /// Embedding model name
    pub embed_model: String,
    /// Generation model name
    pub generate_model: String,
    /// Temperature for generation
    pub temperature: f32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Number of retries for failed requests
    pub max_retries: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            embed_model: "nomic-embed-text".to_string(),
            generate_model: "phi3".to_string(),
            temperature: 0.3,
            timeout_secs: 120,
            max_retries: 2,
        }
    }
}

/// Relative weights for the hybrid scoring strategies
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScoreWeights {
    /// Weight of the semantic (embedding similarity) strategy
    pub semantic: f32,
    /// Weight of the exact keyword strategy
    pub keyword: f32,
    /// Weight of the fuzzy (edit-distance-bounded) strategy
    pub fuzzy: f32,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            semantic: 0.65,
            keyword: 0.25,
            fuzzy: 0.10,
        }
    }
}

impl ScoreWeights {
    /// Reject negative or degenerate weight combinations
    pub fn validate(&self) -> Result<()> {
        if self.semantic < 0.0 || self.keyword < 0.0 || self.fuzzy < 0.0 {
            return Err(Error::Config("score weights must be non-negative".to_string()));
        }
        if self.semantic + self.keyword + self.fuzzy <= 0.0 {
            return Err(Error::Config("at least one score weight must be positive".to_string()));
        }
        Ok(())
    }

    /// Sum of all weights (used to normalize combined scores)
    pub fn total(&self) -> f32 {
        self.semantic + self.keyword + self.fuzzy
    }
}

/// Hybrid retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Documents shortlisted by the coarse pass
    pub coarse_top_n: usize,
    /// Minimum document-level similarity for the coarse pass
    pub coarse_threshold: f32,
    /// Minimum hybrid score for a section to survive the section pass
    pub section_threshold: f32,
    /// Passages returned by the final pass
    pub passage_top_k: usize,
    /// Maximum passages kept per source document
    pub max_passages_per_document: usize,
    /// Maximum edit distance for fuzzy domain-term matching
    pub fuzzy_max_edits: usize,
    /// Default strategy weights
    #[serde(default)]
    pub weights: ScoreWeights,
    /// Per-language weight overrides (sparser embedding coverage benefits
    /// from a higher keyword weight, e.g. Marathi)
    #[serde(default)]
    pub language_weights: HashMap<Language, ScoreWeights>,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        let mut language_weights = HashMap::new();
        language_weights.insert(
            Language::Mr,
            ScoreWeights {
                semantic: 0.45,
                keyword: 0.40,
                fuzzy: 0.15,
            },
        );

        Self {
            coarse_top_n: 10,
            coarse_threshold: 0.25,
            section_threshold: 0.30,
            passage_top_k: 5,
            max_passages_per_document: 2,
            fuzzy_max_edits: 2,
            weights: ScoreWeights::default(),
            language_weights,
        }
    }
}

impl RetrievalConfig {
    /// Validate thresholds and weight combinations
    pub fn validate(&self) -> Result<()> {
        if self.coarse_top_n == 0 {
            return Err(Error::Config("coarse_top_n must be at least 1".to_string()));
        }
        if self.passage_top_k == 0 {
            return Err(Error::Config("passage_top_k must be at least 1".to_string()));
        }
        if self.max_passages_per_document == 0 {
            return Err(Error::Config(
                "max_passages_per_document must be at least 1".to_string(),
            ));
        }
        for (name, value) in [
            ("coarse_threshold", self.coarse_threshold),
            ("section_threshold", self.section_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::Config(format!("{} must be within [0, 1]", name)));
            }
        }
        self.weights.validate()?;
        for weights in self.language_weights.values() {
            weights.validate()?;
        }
        Ok(())
    }

    /// Strategy weights for a query language
    pub fn weights_for(&self, language: Language) -> ScoreWeights {
        self.language_weights
            .get(&language)
            .copied()
            .unwrap_or(self.weights)
    }
}

/// Answer generation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Maximum characters of evidence placed in the prompt
    pub max_context_chars: usize,
    /// Independent generations sampled for self-consistency
    pub consistency_samples: usize,
    /// Confidence below this floor triggers a disclaimer on the answer
    pub disclaimer_floor: f32,
    /// Default generation deadline in milliseconds (overridable per query)
    pub deadline_ms: u64,
    /// Confidence weight of the top retrieval score
    pub retrieval_weight: f32,
    /// Confidence weight of self-consistency agreement
    pub consistency_weight: f32,
    /// Confidence weight of the hedging-language factor
    pub hedging_weight: f32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_context_chars: 6000,
            consistency_samples: 3,
            disclaimer_floor: 0.5,
            deadline_ms: 30_000,
            retrieval_weight: 0.5,
            consistency_weight: 0.3,
            hedging_weight: 0.2,
        }
    }
}

impl GenerationConfig {
    /// Validate sample counts and confidence weights
    pub fn validate(&self) -> Result<()> {
        if self.consistency_samples == 0 {
            return Err(Error::Config("consistency_samples must be at least 1".to_string()));
        }
        if !(0.0..=1.0).contains(&self.disclaimer_floor) {
            return Err(Error::Config("disclaimer_floor must be within [0, 1]".to_string()));
        }
        let weights = [
            self.retrieval_weight,
            self.consistency_weight,
            self.hedging_weight,
        ];
        if weights.iter().any(|w| *w < 0.0) {
            return Err(Error::Config("confidence weights must be non-negative".to_string()));
        }
        if weights.iter().sum::<f32>() <= 0.0 {
            return Err(Error::Config(
                "at least one confidence weight must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Fact verification configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationConfig {
    /// Fact-lookup collaborator endpoint; verification degrades to
    /// inconclusive when unset
    #[serde(default)]
    pub lookup_endpoint: Option<String>,
    /// Per-request timeout of the lookup HTTP client in seconds
    pub lookup_timeout_secs: u64,
    /// Overall deadline for the verification stage in milliseconds
    pub stage_deadline_ms: u64,
    /// Confidence ceiling applied when any claim is contradicted
    pub contradiction_cap: f32,
    /// Confidence bonus when every claim is supported
    pub support_boost: f32,
    /// Maximum claims checked per answer
    pub max_claims: usize,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            lookup_endpoint: None,
            lookup_timeout_secs: 10,
            stage_deadline_ms: 5_000,
            contradiction_cap: 0.3,
            support_boost: 0.1,
            max_claims: 8,
        }
    }
}

impl VerificationConfig {
    /// Validate caps and deadlines
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.contradiction_cap) {
            return Err(Error::Config("contradiction_cap must be within [0, 1]".to_string()));
        }
        if self.support_boost < 0.0 {
            return Err(Error::Config("support_boost must be non-negative".to_string()));
        }
        if self.stage_deadline_ms == 0 {
            return Err(Error::Config("stage_deadline_ms must be positive".to_string()));
        }
        if self.max_claims == 0 {
            return Err(Error::Config("max_claims must be at least 1".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(RagConfig::default().validate().is_ok());
    }

    #[test]
    fn negative_weights_rejected() {
        let mut config = RetrievalConfig::default();
        config.weights.keyword = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn all_zero_weights_rejected() {
        let mut config = RetrievalConfig::default();
        config.weights = ScoreWeights {
            semantic: 0.0,
            keyword: 0.0,
            fuzzy: 0.0,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn invalid_language_override_rejected() {
        let mut config = RetrievalConfig::default();
        config.language_weights.insert(
            Language::Hi,
            ScoreWeights {
                semantic: -1.0,
                keyword: 0.5,
                fuzzy: 0.0,
            },
        );
        assert!(config.validate().is_err());
    }

    #[test]
    fn marathi_defaults_boost_keyword_weight() {
        let config = RetrievalConfig::default();
        let mr = config.weights_for(Language::Mr);
        let en = config.weights_for(Language::En);
        assert!(mr.keyword > en.keyword);
    }
}
