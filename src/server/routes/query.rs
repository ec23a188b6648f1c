//! Query answering endpoint

use axum::{extract::State, Json};

use crate::error::{Error, Result};
use crate::eventlog::QueryEvent;
use crate::server::state::AppState;
use crate::types::query::QueryRequest;
use crate::types::response::AnswerResult;

/// POST /api/query - answer a question with citations
pub async fn answer_query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<AnswerResult>> {
    if request.question.trim().is_empty() {
        return Err(Error::Config("question must not be empty".to_string()));
    }

    let result = state.pipeline().answer_question(&request).await?;

    if let Err(e) = state.events().record(&request.question, &result) {
        tracing::warn!("failed to log query event: {}", e);
    }

    Ok(Json(result))
}

/// GET /api/events - logged query events, oldest first
pub async fn list_events(State(state): State<AppState>) -> Result<Json<Vec<QueryEvent>>> {
    Ok(Json(state.events().read_all()?))
}
