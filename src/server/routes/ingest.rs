//! Ingestion and document management routes

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use crate::error::Result;
use crate::pipeline::IngestSummary;
use crate::types::IngestRequest;

use super::super::state::AppState;

/// POST /api/ingest
pub async fn ingest(
    State(state): State<AppState>,
    Json(request): Json<IngestRequest>,
) -> Result<Json<IngestSummary>> {
    let summary = state.engine().ingest(request).await?;
    Ok(Json(summary))
}

/// Response for document deletion
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub document_id: Uuid,
    pub chunks_deleted: usize,
}

/// DELETE /api/documents/:id
pub async fn delete_document(
    State(state): State<AppState>,
    Path(document_id): Path<Uuid>,
) -> Result<Json<DeleteResponse>> {
    let chunks_deleted = state.engine().delete_document(document_id).await?;
    Ok(Json(DeleteResponse {
        document_id,
        chunks_deleted,
    }))
}
