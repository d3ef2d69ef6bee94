//! API routes for the Q&A server

pub mod ingest;
pub mod query;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};

use super::state::AppState;

/// Build all API routes
pub fn api_routes(max_body_size: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/ingest",
            post(ingest::ingest).layer(DefaultBodyLimit::max(max_body_size)),
        )
        .route("/documents/:id", delete(ingest::delete_document))
        .route("/query", post(query::query))
        .route("/search", get(query::search))
        .route("/info", get(info))
}

/// API info endpoint
async fn info() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "name": "policy-rag",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Insurance policy Q&A with hybrid retrieval and fact verification",
        "supported_languages": ["en", "hi", "mr"],
        "endpoints": {
            "POST /api/ingest": "Ingest a policy document (pre-chunked or raw text)",
            "DELETE /api/documents/:id": "Delete a document and its chunks",
            "POST /api/query": "Ask a question, get a verified answer with citations",
            "GET /api/search": "Direct chunk search without generation",
        }
    }))
}
