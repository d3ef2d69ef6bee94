//! Error types for the policy Q&A engine

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Policy Q&A engine errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Vector dimensionality does not match the configured embedding space
    #[error("Invalid vector: expected {expected} dimensions, got {actual}")]
    InvalidVector { expected: usize, actual: usize },

    /// Ingested document violates the chunk invariants
    #[error("Invalid document '{document_id}': {message}")]
    InvalidDocument { document_id: String, message: String },

    /// Document not found
    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    /// Retrieval found nothing above threshold
    #[error("No document matched the query above the relevance threshold")]
    NoMatch,

    /// Answer generation exceeded the caller-specified deadline
    #[error("Answer generation timed out after {0}ms")]
    GenerationTimeout(u64),

    /// External fact-lookup capability is unavailable
    ///
    /// Never escapes the verifier; `verify` absorbs it into an
    /// `Inconclusive` status with the degraded flag set.
    #[error("Fact verification unavailable: {0}")]
    VerificationUnavailable(String),

    /// Embedding error
    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    /// LLM error
    #[error("LLM error: {0}")]
    Llm(String),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an invalid-document error
    pub fn invalid_document(document_id: impl ToString, message: impl Into<String>) -> Self {
        Self::InvalidDocument {
            document_id: document_id.to_string(),
            message: message.into(),
        }
    }

    /// Create an embedding error
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding(message.into())
    }

    /// Create an LLM error
    pub fn llm(message: impl Into<String>) -> Self {
        Self::Llm(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            Error::Config(msg) => (StatusCode::BAD_REQUEST, "config_error", msg.clone()),
            Error::InvalidVector { .. } => {
                (StatusCode::BAD_REQUEST, "invalid_vector", self.to_string())
            }
            Error::InvalidDocument { .. } => {
                (StatusCode::BAD_REQUEST, "invalid_document", self.to_string())
            }
            Error::DocumentNotFound(id) => (
                StatusCode::NOT_FOUND,
                "not_found",
                format!("Document not found: {}", id),
            ),
            Error::NoMatch => (
                StatusCode::NOT_FOUND,
                "no_match",
                "Insufficient information in the indexed documents".to_string(),
            ),
            Error::GenerationTimeout(_) => {
                (StatusCode::GATEWAY_TIMEOUT, "generation_timeout", self.to_string())
            }
            Error::VerificationUnavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "verification_unavailable", msg.clone())
            }
            Error::Embedding(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "embedding_error", msg.clone())
            }
            Error::Llm(msg) => (StatusCode::SERVICE_UNAVAILABLE, "llm_error", msg.clone()),
            Error::Http(err) => (StatusCode::BAD_GATEWAY, "http_error", err.to_string()),
            Error::Json(err) => (StatusCode::BAD_REQUEST, "json_error", err.to_string()),
            Error::Io(err) => (StatusCode::INTERNAL_SERVER_ERROR, "io_error", err.to_string()),
            Error::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg.clone())
            }
        };

        let body = Json(json!({
            "error": {
                "type": error_type,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}
