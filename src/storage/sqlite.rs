use rusqlite::{params, Connection};
use serde::Serialize;
use std::path::Path;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// A persisted review: id, filename, review text, creation time.
///
/// Records are only ever inserted or deleted, never updated. The id is
/// assigned by SQLite on insert and never reused; the timestamp is the
/// store's insert-time default.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewRecord {
    pub id: i64,
    pub filename: String,
    pub review_content: String,
    pub timestamp: String,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to open database: {0}")]
    Open(#[source] rusqlite::Error),
    #[error("failed to create database directory: {0}")]
    Io(#[from] std::io::Error),
    #[error("database operation failed: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("storage worker failed: {0}")]
    Background(#[from] tokio::task::JoinError),
}

/// SQLite-backed review history.
///
/// The connection lives behind a mutex and every operation runs on the
/// blocking pool so rusqlite never stalls the async runtime. Writes are
/// serialized by the single connection; no transaction spans more than one
/// operation.
pub struct ReviewStore {
    conn: Arc<Mutex<Connection>>,
}

impl ReviewStore {
    /// Open (or create) the review database at `path` and make sure the
    /// `reviews` table exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path).map_err(StoreError::Open)?;
        Self::from_connection(conn)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(StoreError::Open)?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        // AUTOINCREMENT keeps deleted ids retired instead of recycling them.
        conn.execute(
            "CREATE TABLE IF NOT EXISTS reviews (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                filename TEXT NOT NULL,
                review_content TEXT NOT NULL,
                timestamp DATETIME DEFAULT CURRENT_TIMESTAMP
            )",
            [],
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Insert a review and return its server-assigned id.
    pub async fn insert(&self, filename: &str, review_content: &str) -> Result<i64, StoreError> {
        let conn = self.conn.clone();
        let filename = filename.to_string();
        let review_content = review_content.to_string();

        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().unwrap();
            conn.execute(
                "INSERT INTO reviews (filename, review_content) VALUES (?1, ?2)",
                params![filename, review_content],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await?
    }

    /// Every review, newest first. The id tiebreak keeps same-second inserts
    /// in a stable order (the timestamp column has second resolution).
    pub async fn list_all(&self) -> Result<Vec<ReviewRecord>, StoreError> {
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().unwrap();
            let mut stmt = conn.prepare(
                "SELECT id, filename, review_content, timestamp FROM reviews
                 ORDER BY timestamp DESC, id DESC",
            )?;
            let records = stmt
                .query_map([], |row| {
                    Ok(ReviewRecord {
                        id: row.get(0)?,
                        filename: row.get(1)?,
                        review_content: row.get(2)?,
                        timestamp: row.get(3)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(records)
        })
        .await?
    }

    /// Delete the review with the given id. Succeeds whether or not a
    /// matching row existed.
    pub async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().unwrap();
            conn.execute("DELETE FROM reviews WHERE id = ?1", params![id])?;
            Ok(())
        })
        .await?
    }

    /// Number of stored reviews.
    pub async fn count(&self) -> Result<usize, StoreError> {
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().unwrap();
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM reviews", [], |row| row.get(0))?;
            Ok(count as usize)
        })
        .await?
    }
}
