//! SQLite persistence for similarity indexes.
//!
//! Each collection lives in `<root>/<collection>_index/index.db`. A build is
//! written to a temporary file in that directory and renamed into place, so a
//! reader either sees the previous complete index or the new one.

use super::{Document, DocumentMetadata, IndexEntry, SimilarityIndex};
use crate::error::{AssistantError, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OpenFlags};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// File name of the persisted index inside a collection directory.
pub const INDEX_FILE: &str = "index.db";

const SCHEMA: &str = r#"
    CREATE TABLE meta (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE chunks (
        position INTEGER PRIMARY KEY,
        source TEXT NOT NULL,
        chunk_index INTEGER,
        content TEXT NOT NULL,
        embedding BLOB NOT NULL
    );
"#;

/// Summary of a persisted index.
#[derive(Debug, Clone)]
pub struct IndexInfo {
    pub model: String,
    pub dimensions: usize,
    pub chunk_count: usize,
    pub built_at: Option<DateTime<Utc>>,
}

/// Stores one SQLite index file per collection under a root directory.
#[derive(Debug, Clone)]
pub struct SqliteIndexStore {
    root: PathBuf,
}

impl SqliteIndexStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding the index for `collection`.
    pub fn dir_for(&self, collection: &str) -> PathBuf {
        self.root.join(format!("{}_index", collection))
    }

    fn file_for(&self, collection: &str) -> PathBuf {
        self.dir_for(collection).join(INDEX_FILE)
    }

    pub fn exists(&self, collection: &str) -> bool {
        self.file_for(collection).exists()
    }

    /// Persist `index` for `collection`, replacing any previous index.
    #[instrument(skip(self, index), fields(chunks = index.len()))]
    pub fn save(&self, collection: &str, index: &SimilarityIndex) -> Result<()> {
        let dir = self.dir_for(collection);
        std::fs::create_dir_all(&dir)?;

        let staging = tempfile::Builder::new()
            .prefix(".index-")
            .suffix(".db.tmp")
            .tempfile_in(&dir)?;

        {
            let mut conn = Connection::open(staging.path())?;
            conn.execute_batch(SCHEMA)?;

            let tx = conn.transaction()?;
            {
                let mut meta = tx.prepare("INSERT INTO meta (key, value) VALUES (?1, ?2)")?;
                meta.execute(params!["model", index.model()])?;
                meta.execute(params!["dimensions", index.dimensions().to_string()])?;
                meta.execute(params!["chunk_count", index.len().to_string()])?;
                meta.execute(params!["built_at", Utc::now().to_rfc3339()])?;

                let mut insert = tx.prepare(
                    "INSERT INTO chunks (position, source, chunk_index, content, embedding)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                )?;
                for (position, entry) in index.entries().iter().enumerate() {
                    insert.execute(params![
                        position as i64,
                        entry.document.metadata.source,
                        entry.document.metadata.chunk_index.map(|i| i as i64),
                        entry.document.content,
                        embedding_to_bytes(&entry.embedding),
                    ])?;
                }
            }
            tx.commit()?;
        }

        let target = dir.join(INDEX_FILE);
        staging
            .persist(&target)
            .map_err(|e| AssistantError::Index(format!("Failed to persist index: {}", e)))?;

        info!("Saved {} chunks to {}", index.len(), target.display());
        Ok(())
    }

    /// Load the persisted index for `collection`.
    #[instrument(skip(self))]
    pub fn load(&self, collection: &str) -> Result<SimilarityIndex> {
        let path = self.file_for(collection);
        let conn = open_read_only(&path)?;
        let info = read_info(&conn)?;

        let mut stmt = conn.prepare(
            "SELECT source, chunk_index, content, embedding FROM chunks ORDER BY position",
        )?;
        let rows = stmt.query_map([], |row| {
            let chunk_index: Option<i64> = row.get(1)?;
            let embedding: Vec<u8> = row.get(3)?;
            Ok(IndexEntry {
                document: Document {
                    content: row.get(2)?,
                    metadata: DocumentMetadata {
                        source: row.get(0)?,
                        chunk_index: chunk_index.map(|i| i as usize),
                    },
                },
                embedding: bytes_to_embedding(&embedding),
            })
        })?;

        let entries = rows.collect::<std::result::Result<Vec<_>, _>>()?;
        if entries.len() != info.chunk_count {
            return Err(AssistantError::Index(format!(
                "{} holds {} chunks but records {}",
                path.display(),
                entries.len(),
                info.chunk_count
            )));
        }

        debug!("Loaded {} chunks from {}", entries.len(), path.display());
        SimilarityIndex::from_entries(info.model, info.dimensions, entries)
    }

    /// Read the metadata of the persisted index for `collection`.
    pub fn info(&self, collection: &str) -> Result<IndexInfo> {
        let conn = open_read_only(&self.file_for(collection))?;
        read_info(&conn)
    }
}

fn open_read_only(path: &Path) -> Result<Connection> {
    if !path.exists() {
        return Err(AssistantError::Index(format!(
            "No persisted index at {}",
            path.display()
        )));
    }
    Ok(Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?)
}

fn read_info(conn: &Connection) -> Result<IndexInfo> {
    let meta = |key: &str| -> Result<String> {
        conn.query_row("SELECT value FROM meta WHERE key = ?1", params![key], |row| {
            row.get(0)
        })
        .map_err(|e| AssistantError::Index(format!("Missing index metadata '{}': {}", key, e)))
    };

    let parse = |key: &str| -> Result<usize> {
        meta(key)?
            .parse()
            .map_err(|e| AssistantError::Index(format!("Invalid index metadata '{}': {}", key, e)))
    };

    Ok(IndexInfo {
        model: meta("model")?,
        dimensions: parse("dimensions")?,
        chunk_count: parse("chunk_count")?,
        built_at: meta("built_at")
            .ok()
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|dt| dt.with_timezone(&Utc)),
    })
}

/// Serialize embedding to bytes.
fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// Deserialize embedding from bytes.
fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|chunk| {
            let arr: [u8; 4] = chunk.try_into().unwrap_or_default();
            f32::from_le_bytes(arr)
        })
        .collect()
}
