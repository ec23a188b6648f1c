//! PDF upload endpoint

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::ingestion::IngestStats;
use crate::server::state::AppState;

/// Outcome of one uploaded file
#[derive(Debug, Serialize)]
pub struct IngestFileError {
    pub filename: String,
    pub error: String,
}

/// Response for a multipart ingest request
#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub ingested: Vec<IngestStats>,
    pub errors: Vec<IngestFileError>,
}

/// POST /api/ingest - upload one or more PDFs
///
/// Files that fail to parse are reported per file; one bad upload does not
/// fail the batch.
pub async fn ingest_pdfs(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<IngestResponse>> {
    let mut ingested = Vec::new();
    let mut errors = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::Ingest(format!("failed to read multipart field: {}", e)))?
    {
        let Some(filename) = field.file_name().map(|s| s.to_string()) else {
            continue;
        };

        if !filename.to_ascii_lowercase().ends_with(".pdf") {
            errors.push(IngestFileError {
                filename,
                error: "only PDF files are accepted".to_string(),
            });
            continue;
        }

        let data = match field.bytes().await {
            Ok(d) => d,
            Err(e) => {
                errors.push(IngestFileError {
                    filename,
                    error: format!("failed to read upload: {}", e),
                });
                continue;
            }
        };

        tracing::info!(file = %filename, bytes = data.len(), "ingesting upload");

        match state.ingestor().ingest_bytes(&filename, &data).await {
            Ok(stats) => {
                // Keep the original alongside the index so reindexing works
                if let Err(e) = save_upload(&state, &filename, &data).await {
                    tracing::warn!(file = %filename, "failed to save upload: {}", e);
                }
                ingested.push(stats);
            }
            Err(e) => errors.push(IngestFileError {
                filename,
                error: e.to_string(),
            }),
        }
    }

    if ingested.is_empty() && errors.is_empty() {
        return Err(Error::Ingest("no files in upload".to_string()));
    }

    Ok(Json(IngestResponse { ingested, errors }))
}

/// Write an uploaded PDF into the configured papers directory.
///
/// Only the basename is kept so uploads cannot escape the directory.
async fn save_upload(state: &AppState, filename: &str, data: &[u8]) -> Result<()> {
    let basename = std::path::Path::new(filename)
        .file_name()
        .ok_or_else(|| Error::Ingest(format!("bad filename: {}", filename)))?;

    let papers_dir = &state.config().paths.papers_dir;
    tokio::fs::create_dir_all(papers_dir).await?;
    tokio::fs::write(papers_dir.join(basename), data).await?;
    Ok(())
}
