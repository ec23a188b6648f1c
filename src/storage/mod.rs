//! Persistent chunk storage

pub mod database;

pub use database::{ChunkStore, DocumentInfo};
