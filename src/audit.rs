//! Audit records for the compliance collaborator
//!
//! The engine emits one record per answered query; retention and purging
//! (e.g. a 30-day rule) are enforced entirely by the external collaborator.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{Language, VerificationStatus};

/// One audit record per answered query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Query ID assigned by the pipeline
    pub query_id: Uuid,
    /// When the answer was produced
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// Final answer text
    pub answer: String,
    /// Final confidence after verification
    pub confidence: f32,
    /// Final verification status
    pub verification_status: VerificationStatus,
    /// Language the answer was delivered in
    pub language: Language,
}

/// Injected audit sink
pub trait AuditSink: Send + Sync {
    /// Record an answered query; must not block the response path
    fn record(&self, record: AuditRecord);
}

/// Default sink that emits audit records as structured log events
#[derive(Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, record: AuditRecord) {
        tracing::info!(
            query_id = %record.query_id,
            confidence = record.confidence,
            status = ?record.verification_status,
            language = ?record.language,
            "audit"
        );
    }
}
