//! Query routes

use axum::extract::{Query as QueryParams, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::pipeline::QueryOutcome;
use crate::types::{Citation, Language, QueryRequest, VerificationStatus};

use super::super::state::AppState;

/// Response payload for `/query`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    /// Query ID (matches the audit record)
    pub query_id: Uuid,
    /// Answer text
    pub answer: String,
    /// Answer language
    pub language: Language,
    /// Confidence score (0.0-1.0)
    pub confidence: f32,
    /// Verification status
    pub verification_status: VerificationStatus,
    /// True when the lookup capability was down during verification
    pub verification_degraded: bool,
    /// Supporting citations
    pub citations: Vec<Citation>,
    /// Suggested follow-up questions
    pub suggested_questions: Vec<String>,
    /// End-to-end processing time in milliseconds
    pub processing_time_ms: u64,
}

impl QueryResponse {
    fn from_outcome(outcome: QueryOutcome) -> Self {
        Self {
            query_id: outcome.query_id,
            answer: outcome.answer.text,
            language: outcome.answer.language,
            confidence: outcome.answer.confidence,
            verification_status: outcome.answer.verification_status,
            verification_degraded: outcome.answer.verification_degraded,
            citations: outcome.answer.citations,
            suggested_questions: outcome.suggested_questions,
            processing_time_ms: outcome.processing_time_ms,
        }
    }

    /// Explicit "insufficient information" response for a NoMatch
    fn insufficient_information(language: Language) -> Self {
        let answer = match language {
            Language::En => {
                "I couldn't find relevant information in the indexed policy documents \
                 to answer this question."
            }
            Language::Hi => {
                "इस प्रश्न का उत्तर देने के लिए मुझे पॉलिसी दस्तावेज़ों में प्रासंगिक जानकारी नहीं मिली।"
            }
            Language::Mr => {
                "या प्रश्नाचे उत्तर देण्यासाठी मला पॉलिसी दस्तऐवजांमध्ये संबंधित माहिती सापडली नाही."
            }
        };

        Self {
            query_id: Uuid::new_v4(),
            answer: answer.to_string(),
            language,
            confidence: 0.0,
            verification_status: VerificationStatus::Unverified,
            verification_degraded: false,
            citations: Vec::new(),
            suggested_questions: Vec::new(),
            processing_time_ms: 0,
        }
    }
}

/// POST /api/query
pub async fn query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>> {
    let target = request.resolved_target_language();

    match state.engine().answer(request).await {
        Ok(outcome) => Ok(Json(QueryResponse::from_outcome(outcome))),
        Err(Error::NoMatch) => Ok(Json(QueryResponse::insufficient_information(target))),
        Err(e) => Err(e),
    }
}

/// Query string for `/search`
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    /// Search text
    pub q: String,
    /// Maximum results (default 5)
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    5
}

/// One `/search` hit
#[derive(Debug, Serialize)]
pub struct SearchHit {
    pub chunk_id: Uuid,
    pub document_id: Uuid,
    pub section: crate::types::SectionLabel,
    pub snippet: String,
    pub score: f32,
}

/// GET /api/search: direct nearest-neighbor lookup, no generation
pub async fn search(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<SearchParams>,
) -> Result<Json<Vec<SearchHit>>> {
    let hits = state.engine().search_chunks(&params.q, params.limit).await?;

    Ok(Json(
        hits.into_iter()
            .map(|(chunk, score)| SearchHit {
                chunk_id: chunk.id,
                document_id: chunk.document_id,
                section: chunk.section,
                snippet: chunk.content,
                score,
            })
            .collect(),
    ))
}
