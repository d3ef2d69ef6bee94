//! Core data types: documents, chunks, queries, answers, claims

pub mod answer;
pub mod document;
pub mod query;

pub use answer::{Answer, Citation, Claim, ClaimOutcome, VerificationStatus};
pub use document::{Chunk, Document, Language, SectionLabel};
pub use query::{ConversationTurn, IngestChunk, IngestRequest, QueryRequest};
