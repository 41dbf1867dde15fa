use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::models::{DocumentHistory, HistoryEntry, ToolResult};

const HISTORY_ROOT: &str = "userHistory";
const DOCUMENTS_DIR: &str = "documents";
const RECORD_EXTENSION: &str = "json";

#[derive(Debug, Error)]
pub enum StoreFailure {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("failed to {operation} history at {}", .path.display())]
    PersistenceFailed {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: StoreFailure,
    },

    #[error("invalid {kind} name \"{name}\"")]
    InvalidName { kind: &'static str, name: String },
}

pub type HistoryResult<T> = Result<T, HistoryError>;

/// On-disk record for one document.
#[derive(Debug, Default, Serialize, Deserialize)]
struct HistoryRecord {
    #[serde(default)]
    history: Vec<HistoryEntry>,
}

/// File names cannot contain `/`, so document names swap it for `_`.
pub fn sanitize_document_name(name: &str) -> String {
    name.replace('/', "_")
}

/// Best-effort inverse of [`sanitize_document_name`]. Names that already
/// contained `_` come back with `/` in its place.
pub fn unsanitize_document_name(name: &str) -> String {
    name.replace('_', "/")
}

/// The path component for `name`. Names that would be empty or resolve to
/// `.` or `..` are refused so every record stays inside its user's folder.
fn path_component(kind: &'static str, name: &str) -> HistoryResult<String> {
    let sanitized = sanitize_document_name(name);
    match sanitized.as_str() {
        "" | "." | ".." => Err(HistoryError::InvalidName {
            kind,
            name: name.to_string(),
        }),
        _ => Ok(sanitized),
    }
}

/// Stores each document's history as one JSON file under
/// `<root>/userHistory/<user>/documents/`.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    root: PathBuf,
}

impl HistoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn documents_dir(&self, user: &str) -> HistoryResult<PathBuf> {
        Ok(self
            .root
            .join(HISTORY_ROOT)
            .join(path_component("user", user)?)
            .join(DOCUMENTS_DIR))
    }

    /// Path of the record for `document`.
    pub fn record_path(&self, user: &str, document: &str) -> HistoryResult<PathBuf> {
        let file_name = format!("{}.{}", path_component("document", document)?, RECORD_EXTENSION);
        Ok(self.documents_dir(user)?.join(file_name))
    }

    /// Replace the whole history of `document`.
    pub fn save(&self, user: &str, document: &str, history: &[HistoryEntry]) -> HistoryResult<()> {
        if user.is_empty() {
            return Ok(());
        }
        let path = self.record_path(user, document)?;
        write_record(&path, history).map_err(|source| HistoryError::PersistenceFailed {
            operation: "save",
            path: path.clone(),
            source,
        })?;
        debug!(user, document, entries = history.len(), "history saved");
        Ok(())
    }

    /// Entries for `document`, oldest first. Missing records read as empty.
    pub fn get(&self, user: &str, document: &str) -> HistoryResult<Vec<HistoryEntry>> {
        if user.is_empty() {
            return Ok(Vec::new());
        }
        let path = self.record_path(user, document)?;
        read_record(&path)
            .map(|record| record.history)
            .map_err(|source| HistoryError::PersistenceFailed {
                operation: "read",
                path,
                source,
            })
    }

    /// Add `result` to the end of the document's history, stamped now.
    pub fn append(&self, user: &str, document: &str, result: ToolResult) -> HistoryResult<HistoryEntry> {
        let mut history = self.get(user, document)?;
        let entry = HistoryEntry::new(result);
        history.push(entry.clone());
        self.save(user, document, &history)?;
        info!(user, document, tool = %entry.result.kind(), "result recorded");
        Ok(entry)
    }

    /// Every document with a record for `user`, sorted by name.
    pub fn get_all(&self, user: &str) -> HistoryResult<Vec<DocumentHistory>> {
        if user.is_empty() {
            return Ok(Vec::new());
        }
        let dir = self.documents_dir(user)?;
        let failed = |source: StoreFailure| HistoryError::PersistenceFailed {
            operation: "list",
            path: dir.clone(),
            source,
        };

        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(failed(e.into())),
        };

        let mut documents = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| failed(e.into()))?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            let record = read_record(&path).map_err(|source| HistoryError::PersistenceFailed {
                operation: "read",
                path: path.clone(),
                source,
            })?;
            documents.push(DocumentHistory {
                document: unsanitize_document_name(stem),
                history: record.history,
            });
        }

        documents.sort_by(|a, b| a.document.cmp(&b.document));
        Ok(documents)
    }

    /// Delete the document's history. Clearing a missing record succeeds.
    pub fn clear(&self, user: &str, document: &str) -> HistoryResult<()> {
        if user.is_empty() {
            return Ok(());
        }
        let path = self.record_path(user, document)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                info!(user, document, "history cleared");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(HistoryError::PersistenceFailed {
                operation: "clear",
                path,
                source: e.into(),
            }),
        }
    }
}

fn read_record(path: &Path) -> Result<HistoryRecord, StoreFailure> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(serde_json::from_str(&content)?),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(HistoryRecord::default()),
        Err(e) => Err(e.into()),
    }
}

fn write_record(path: &Path, history: &[HistoryEntry]) -> Result<(), StoreFailure> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let record = HistoryRecord {
        history: history.to_vec(),
    };
    let json = serde_json::to_string_pretty(&record)?;

    // Readers only ever see a complete record.
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
