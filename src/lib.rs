//! policy-rag: insurance policy Q&A with hybrid retrieval and fact verification
//!
//! Turns pre-extracted policy documents into a queryable knowledge base and
//! answers questions with confidence-scored, citation-backed, multilingual
//! answers. Retrieval runs coarse-to-fine (document → section → passage)
//! over a shared multilingual embedding space combined with keyword and
//! fuzzy matching; generated answers are cross-checked against external
//! authoritative sources before they reach the user.

pub mod audit;
pub mod config;
pub mod error;
pub mod generation;
pub mod index;
pub mod pipeline;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod store;
pub mod types;
pub mod verification;

pub use config::RagConfig;
pub use error::{Error, Result};
pub use pipeline::{IngestSummary, PolicyQaEngine, QueryOutcome};
pub use types::{
    Answer, Chunk, Citation, Claim, ClaimOutcome, Document, IngestRequest, Language,
    QueryRequest, SectionLabel, VerificationStatus,
};
