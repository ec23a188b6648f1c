//! Append-only JSONL log of answered queries
//!
//! One line per event, written synchronously under a mutex. The log feeds
//! offline evaluation and debugging; it is not a durability mechanism.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::types::response::AnswerResult;

/// One logged query event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryEvent {
    /// Unique event id
    pub event_id: Uuid,
    /// Event timestamp
    pub timestamp: DateTime<Utc>,
    /// The question as asked
    pub question: String,
    /// The full answer payload
    #[serde(flatten)]
    pub result: AnswerResult,
}

/// JSONL event log
pub struct EventLog {
    path: PathBuf,
    file: Mutex<File>,
}

impl EventLog {
    /// Open (or create) the log at `<logs_dir>/events.jsonl`.
    pub fn open(logs_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(logs_dir)?;
        let path = logs_dir.join("events.jsonl");
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    /// Append one event.
    pub fn record(&self, question: &str, result: &AnswerResult) -> Result<QueryEvent> {
        let event = QueryEvent {
            event_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            question: question.to_string(),
            result: result.clone(),
        };
        let line = serde_json::to_string(&event)?;

        let mut file = self.file.lock();
        writeln!(file, "{}", line)?;
        Ok(event)
    }

    /// Read all events back, skipping lines that fail to parse.
    pub fn read_all(&self) -> Result<Vec<QueryEvent>> {
        let raw = std::fs::read_to_string(&self.path)?;
        Ok(raw
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
