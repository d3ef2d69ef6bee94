//! Provider abstractions for embeddings, LLM generation, and fact lookups
//!
//! Trait-based injection points; the engine only sees `Arc<dyn …>`, so
//! tests run against fakes and deployments pick concrete backends.

pub mod embedding;
pub mod llm;
pub mod lookup;
pub mod ollama;

pub use embedding::EmbeddingProvider;
pub use llm::LlmProvider;
pub use lookup::{FactLookup, HttpFactLookup, LookupResult};
pub use ollama::{OllamaClient, OllamaEmbedder, OllamaLlm};
