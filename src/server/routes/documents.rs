//! Document listing endpoint

use axum::{extract::State, Json};
use serde::Serialize;

use crate::error::Result;
use crate::server::state::AppState;
use crate::storage::DocumentInfo;

/// Response for the document listing
#[derive(Debug, Serialize)]
pub struct DocumentsResponse {
    pub documents: Vec<DocumentInfo>,
    pub total_chunks: usize,
}

/// GET /api/documents - list indexed papers
pub async fn list_documents(State(state): State<AppState>) -> Result<Json<DocumentsResponse>> {
    let documents = state.store().list_documents()?;
    let total_chunks = state.store().chunk_count()?;
    Ok(Json(DocumentsResponse {
        documents,
        total_chunks,
    }))
}
