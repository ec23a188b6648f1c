//! SQLite database for chunks and their embeddings
//!
//! One row per chunk with the embedding stored as a little-endian f32 blob.
//! Re-ingesting a document replaces its rows inside a single transaction.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::types::chunk::Chunk;

/// Summary of an indexed document
#[derive(Debug, Clone, Serialize)]
pub struct DocumentInfo {
    /// Basename of the source PDF
    pub source_file: String,
    /// Pages extracted at ingest time
    pub pages: u32,
    /// Chunks currently indexed
    pub chunks: u32,
    /// Last ingestion timestamp
    pub indexed_at: DateTime<Utc>,
}

/// SQLite-backed chunk store
pub struct ChunkStore {
    conn: Arc<Mutex<Connection>>,
}

impl ChunkStore {
    /// Create or open the database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)
            .map_err(|e| Error::Storage(format!("Failed to open database: {}", e)))?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.migrate()?;
        Ok(store)
    }

    /// Create an in-memory store (tests, scratch indexing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::Storage(format!("Failed to open in-memory database: {}", e)))?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock();

        conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;
            "#,
        )
        .map_err(|e| Error::Storage(format!("Failed to set pragmas: {}", e)))?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                source_file TEXT PRIMARY KEY,
                pages INTEGER NOT NULL,
                chunks INTEGER NOT NULL,
                indexed_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS chunks (
                chunk_id TEXT PRIMARY KEY,
                source_file TEXT NOT NULL,
                source_path TEXT NOT NULL,
                page_number INTEGER NOT NULL,
                section_name TEXT NOT NULL,
                chunk_index INTEGER NOT NULL,
                text TEXT NOT NULL,
                embedding BLOB NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_chunks_source_file ON chunks(source_file);
            "#,
        )
        .map_err(|e| Error::Storage(format!("Migration failed: {}", e)))?;

        Ok(())
    }

    /// Replace all chunks for a document in one transaction.
    pub fn replace_document(
        &self,
        source_file: &str,
        pages: u32,
        chunks: &[(Chunk, Vec<f32>)],
    ) -> Result<()> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM chunks WHERE source_file = ?1", params![source_file])?;
        tx.execute(
            r#"
            INSERT INTO documents (source_file, pages, chunks, indexed_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(source_file) DO UPDATE SET
                pages = excluded.pages,
                chunks = excluded.chunks,
                indexed_at = excluded.indexed_at
            "#,
            params![source_file, pages, chunks.len() as u32, Utc::now().to_rfc3339()],
        )?;

        {
            let mut stmt = tx.prepare(
                r#"
                INSERT OR REPLACE INTO chunks
                    (chunk_id, source_file, source_path, page_number,
                     section_name, chunk_index, text, embedding)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )?;
            for (chunk, embedding) in chunks {
                stmt.execute(params![
                    chunk.chunk_id,
                    chunk.source_file,
                    chunk.source_path,
                    chunk.page_number,
                    chunk.section_name,
                    chunk.chunk_index,
                    chunk.text,
                    embedding_to_blob(embedding),
                ])?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    /// Load every chunk with its embedding, ordered by file and chunk index.
    pub fn load_all(&self) -> Result<Vec<(Chunk, Vec<f32>)>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            r#"
            SELECT chunk_id, source_file, source_path, page_number,
                   section_name, chunk_index, text, embedding
            FROM chunks
            ORDER BY source_file, chunk_index
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            let blob: Vec<u8> = row.get(7)?;
            Ok((
                Chunk {
                    chunk_id: row.get(0)?,
                    source_file: row.get(1)?,
                    source_path: row.get(2)?,
                    page_number: row.get(3)?,
                    section_name: row.get(4)?,
                    chunk_index: row.get(5)?,
                    text: row.get(6)?,
                },
                blob_to_embedding(&blob),
            ))
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// List all indexed documents.
    pub fn list_documents(&self) -> Result<Vec<DocumentInfo>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT source_file, pages, chunks, indexed_at FROM documents ORDER BY source_file",
        )?;

        let rows = stmt.query_map([], |row| {
            let indexed_at: String = row.get(3)?;
            Ok(DocumentInfo {
                source_file: row.get(0)?,
                pages: row.get(1)?,
                chunks: row.get(2)?,
                indexed_at: DateTime::parse_from_rfc3339(&indexed_at)
                    .map(|t| t.with_timezone(&Utc))
                    .unwrap_or_else(|_| Utc::now()),
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Total number of indexed chunks.
    pub fn chunk_count(&self) -> Result<usize> {
        let conn = self.conn.lock();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM chunks", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

/// Serialize an embedding to a little-endian f32 blob.
fn embedding_to_blob(embedding: &[f32]) -> Vec<u8> {
    let mut blob = Vec::with_capacity(embedding.len() * 4);
    for value in embedding {
        blob.extend_from_slice(&value.to_le_bytes());
    }
    blob
}

/// Deserialize a little-endian f32 blob back into an embedding.
fn blob_to_embedding(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}
