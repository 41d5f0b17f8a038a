// Survey store persistence
// Loads and saves the full record list as one JSON array

use crate::survey::SurveyRecord;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// File name of the store inside the data directory
pub const RESPONSES_FILE: &str = "responses.json";

/// Error types for persistence operations
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// File I/O error
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        /// File or directory being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PersistenceError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        PersistenceError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Backing storage for the ordered record list
///
/// The store is read and written as a whole; there is no per-record access.
#[async_trait]
pub trait SurveyStore: Send + Sync {
    /// Load every record in insertion order
    ///
    /// An absent store is empty. An unreadable or corrupt store is logged
    /// and also treated as empty. Individual records that cannot be decoded
    /// are logged and skipped.
    async fn load_all(&self) -> Vec<SurveyRecord>;

    /// Replace the stored records with `records`
    async fn save_all(&self, records: &[SurveyRecord]) -> Result<(), PersistenceError>;
}

/// Store backed by a single pretty-printed JSON file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Create a store at `path`; nothing is touched until first use
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// Create a store at `<data_dir>/responses.json`
    pub fn in_dir<P: AsRef<Path>>(data_dir: P) -> Self {
        Self::new(data_dir.as_ref().join(RESPONSES_FILE))
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<Vec<SurveyRecord>, PersistenceError> {
        let json = match fs::read_to_string(&self.path).await {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(PersistenceError::io(&self.path, e)),
        };

        let entries: Vec<Value> = serde_json::from_str(&json)?;
        let total = entries.len();
        let mut records = Vec::with_capacity(total);
        for (index, entry) in entries.into_iter().enumerate() {
            match serde_json::from_value::<SurveyRecord>(entry) {
                Ok(record) => records.push(record),
                Err(e) => warn!(
                    path = %self.path.display(),
                    index,
                    error = %e,
                    "Skipping unreadable survey record"
                ),
            }
        }

        if records.len() < total {
            self.preserve_unreadable().await;
        }
        Ok(records)
    }

    /// Copy the current file aside before a later save replaces it
    ///
    /// The copy is named after the file's modification time, so repeated
    /// loads of the same content keep a single copy.
    async fn preserve_unreadable(&self) {
        let backup = match fs::metadata(&self.path).await.and_then(|m| m.modified()) {
            Ok(modified) => self.backup_path(DateTime::<Utc>::from(modified)),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Cannot stat survey store for backup");
                return;
            }
        };
        if fs::try_exists(&backup).await.unwrap_or(false) {
            return;
        }
        match fs::copy(&self.path, &backup).await {
            Ok(_) => warn!(backup = %backup.display(), "Kept a copy of the unreadable survey store"),
            Err(e) => warn!(backup = %backup.display(), error = %e, "Failed to back up survey store"),
        }
    }

    /// `<file>.<mtime>.bak` next to the store
    fn backup_path(&self, modified: DateTime<Utc>) -> PathBuf {
        let stamp = modified.format("%Y%m%dT%H%M%S%.3fZ");
        self.path.with_file_name(format!("{}.{stamp}.bak", self.file_name()))
    }

    fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| RESPONSES_FILE.to_string())
    }

    /// Temp file next to the store, renamed over it once fully written
    fn temp_path(&self) -> PathBuf {
        self.path.with_file_name(format!(".{}.tmp", self.file_name()))
    }
}

#[async_trait]
impl SurveyStore for JsonFileStore {
    async fn load_all(&self) -> Vec<SurveyRecord> {
        match self.read().await {
            Ok(records) => records,
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to read survey store, treating it as empty"
                );
                if matches!(e, PersistenceError::Json(_)) {
                    self.preserve_unreadable().await;
                }
                Vec::new()
            }
        }
    }

    async fn save_all(&self, records: &[SurveyRecord]) -> Result<(), PersistenceError> {
        let json = serde_json::to_string_pretty(records)?;

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .await
                .map_err(|e| PersistenceError::io(dir, e))?;
        }

        let tmp = self.temp_path();
        fs::write(&tmp, json)
            .await
            .map_err(|e| PersistenceError::io(&tmp, e))?;
        fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| PersistenceError::io(&self.path, e))?;

        debug!(path = %self.path.display(), count = records.len(), "Survey store saved");
        Ok(())
    }
}

/// Store kept in process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<Vec<SurveyRecord>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-filled with `records`
    pub fn with_records(records: Vec<SurveyRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }
}

#[async_trait]
impl SurveyStore for MemoryStore {
    async fn load_all(&self) -> Vec<SurveyRecord> {
        self.records.read().await.clone()
    }

    async fn save_all(&self, records: &[SurveyRecord]) -> Result<(), PersistenceError> {
        *self.records.write().await = records.to_vec();
        Ok(())
    }
}
