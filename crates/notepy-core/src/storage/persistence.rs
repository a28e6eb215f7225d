//! Notes document persistence
//!
//! Handles saving and loading the notes document to/from the filesystem.
//! Uses atomic writes (write to temp file, then rename) to prevent corruption.
//!
//! Storage location: `<resource dir>/notes/notes.json`

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use super::error::{StorageError, StorageResult};
use super::schema::{self, NotesDocument};
use crate::models::Note;

/// Persistence layer for the notes document
///
/// Provides atomic file operations for saving/loading the whole store.
#[derive(Debug, Clone)]
pub struct JsonPersistence {
    path: PathBuf,
}

impl JsonPersistence {
    /// Create a persistence handler for the given document path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the notes document
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path the document is copied to when it cannot be parsed
    pub fn backup_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".corrupt.backup");
        PathBuf::from(name)
    }

    /// Save all notes using an atomic write
    pub fn save<'a>(&self, notes: impl IntoIterator<Item = &'a Note>) -> StorageResult<()> {
        let doc = schema::to_document(notes);
        let bytes = serde_json::to_vec_pretty(&doc)?;
        atomic_write(&self.path, &bytes)?;
        tracing::debug!(path = %self.path.display(), count = doc.len(), "notes document saved");
        Ok(())
    }

    /// Load all notes from disk
    ///
    /// Returns an empty map if the document doesn't exist. A document that is
    /// not valid JSON is copied to [`backup_path`](Self::backup_path) and
    /// reported as corrupt.
    pub fn load(&self) -> StorageResult<BTreeMap<Uuid, Note>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let bytes = fs::read(&self.path).map_err(|source| match source.kind() {
            std::io::ErrorKind::PermissionDenied => StorageError::PermissionDenied {
                path: self.path.clone(),
                source,
            },
            _ => StorageError::ReadError {
                path: self.path.clone(),
                source,
            },
        })?;

        let doc: NotesDocument = match serde_json::from_slice(&bytes) {
            Ok(doc) => doc,
            Err(e) if e.is_syntax() || e.is_eof() => return Err(self.quarantine(e.to_string())),
            Err(e) => {
                return Err(StorageError::InvalidFormat {
                    path: self.path.clone(),
                    details: e.to_string(),
                })
            }
        };

        schema::from_document(doc).map_err(|details| StorageError::InvalidFormat {
            path: self.path.clone(),
            details,
        })
    }

    /// Copy an unreadable document aside and build the error describing it
    fn quarantine(&self, details: String) -> StorageError {
        let backup_path = self.backup_path();
        if let Err(e) = fs::copy(&self.path, &backup_path) {
            tracing::error!(path = %self.path.display(), error = %e, "failed to back up corrupt notes document");
        } else {
            tracing::warn!(path = %self.path.display(), backup = %backup_path.display(), "notes document is corrupt");
        }
        StorageError::CorruptDocument {
            path: self.path.clone(),
            backup_path,
            details,
        }
    }
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
///
/// This ensures the target file is never left in a partially-written state.
pub(crate) fn atomic_write(path: &Path, data: &[u8]) -> StorageResult<()> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| match source.kind() {
            std::io::ErrorKind::PermissionDenied => StorageError::PermissionDenied {
                path: parent.to_path_buf(),
                source,
            },
            _ => StorageError::CreateDirectory {
                path: parent.to_path_buf(),
                source,
            },
        })?;
    }

    // Create temp file in the same directory (for atomic rename)
    let temp_path = path.with_extension("tmp");

    let write_temp = || -> std::io::Result<()> {
        let mut file = File::create(&temp_path)?;
        file.write_all(data)?;
        // Sync to disk before rename
        file.sync_all()
    };
    if let Err(e) = write_temp() {
        let _ = fs::remove_file(&temp_path);
        return Err(StorageError::from_io(e, temp_path));
    }

    fs::rename(&temp_path, path).map_err(|source| {
        let _ = fs::remove_file(&temp_path);
        StorageError::AtomicWriteFailed {
            from: temp_path.clone(),
            to: path.to_path_buf(),
            source,
        }
    })?;

    Ok(())
}
