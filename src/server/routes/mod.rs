//! API routes

pub mod documents;
pub mod ingest;
pub mod query;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::server::state::AppState;

/// Build all API routes.
pub fn api_routes(max_upload_size: usize) -> Router<AppState> {
    Router::new()
        .route("/query", post(query::answer_query))
        .route(
            "/ingest",
            post(ingest::ingest_pdfs).layer(DefaultBodyLimit::max(max_upload_size)),
        )
        .route("/documents", get(documents::list_documents))
        .route("/events", get(query::list_events))
        .route("/info", get(info))
}

/// API info endpoint
async fn info() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "name": "paper-rag",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Citation-grounded question answering over machine-learning papers",
        "endpoints": {
            "POST /api/query": "Answer a question with citations",
            "POST /api/ingest": "Upload and index PDF papers",
            "GET /api/documents": "List indexed papers",
            "GET /api/events": "List logged query events",
        },
        "modes": ["qa", "compare", "method_card", "claim_verify"],
    }))
}
