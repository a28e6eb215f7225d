//! Errors raised while reading or writing `notes.json`
//!
//! Each variant carries the path involved. [`StorageError::recovery_suggestion`]
//! gives the CLI a one-line hint to print under the error.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    /// The notes directory could not be created
    #[error("Failed to create notes directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Permission denied on '{path}'")]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("No space left while writing '{path}'")]
    DiskFull {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read notes from '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write notes to '{path}': {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// `notes.json` is not JSON at all; a copy sits at `backup_path`
    #[error("Notes document '{path}' is not valid JSON ({details}); copied to '{backup_path}'")]
    CorruptDocument {
        path: PathBuf,
        backup_path: PathBuf,
        details: String,
    },

    /// Valid JSON, but not an object of notes keyed by id
    #[error("Notes document '{path}' has an unexpected shape: {details}")]
    InvalidFormat { path: PathBuf, details: String },

    #[error("Failed to encode notes as JSON: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("No such file or directory: '{path}'")]
    NotFound { path: PathBuf },

    /// The temp file was written but could not replace `to`
    #[error("Failed to replace '{to}' with '{from}': {source}")]
    AtomicWriteFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StorageError {
    /// Classify an I/O failure on `path` by its kind
    pub fn from_io(error: io::Error, path: PathBuf) -> Self {
        match error.kind() {
            io::ErrorKind::PermissionDenied => StorageError::PermissionDenied {
                path,
                source: error,
            },
            io::ErrorKind::NotFound => StorageError::NotFound { path },
            _ if is_out_of_space(&error) => StorageError::DiskFull {
                path,
                source: error,
            },
            _ => StorageError::WriteError {
                path,
                source: error,
            },
        }
    }

    pub fn is_not_found(&self) -> bool {
        match self {
            StorageError::NotFound { .. } => true,
            StorageError::ReadError { source, .. } | StorageError::WriteError { source, .. } => {
                source.kind() == io::ErrorKind::NotFound
            }
            _ => false,
        }
    }

    /// What the user can do about it, when there is something
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            StorageError::DiskFull { .. } => Some("Free some disk space and retry."),
            StorageError::PermissionDenied { .. } => {
                Some("Make the resource directory writable by the current user.")
            }
            StorageError::CorruptDocument { .. } => Some(
                "Recover notes from the copied file, or move notes.json aside to start empty.",
            ),
            StorageError::CreateDirectory { .. } | StorageError::NotFound { .. } => {
                Some("Run 'notepy bootstrap init' to create the resource directory.")
            }
            _ => None,
        }
    }
}

fn is_out_of_space(error: &io::Error) -> bool {
    let msg = error.to_string().to_lowercase();
    ["no space left", "disk full", "quota exceeded", "not enough space"]
        .iter()
        .any(|needle| msg.contains(needle))
}

pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn io_err(kind: io::ErrorKind, msg: &str) -> io::Error {
        io::Error::new(kind, msg.to_string())
    }

    #[test]
    fn test_from_io_classifies_by_kind() {
        let denied = StorageError::from_io(
            io_err(io::ErrorKind::PermissionDenied, "denied"),
            PathBuf::from("/notes/notes.json"),
        );
        assert!(matches!(denied, StorageError::PermissionDenied { .. }));
        assert!(denied.to_string().contains("/notes/notes.json"));

        let missing = StorageError::from_io(
            io_err(io::ErrorKind::NotFound, "gone"),
            PathBuf::from("/missing"),
        );
        assert!(matches!(missing, StorageError::NotFound { .. }));
        assert!(missing.is_not_found());

        let busy = StorageError::from_io(
            io_err(io::ErrorKind::Other, "device busy"),
            PathBuf::from("/busy"),
        );
        assert!(matches!(busy, StorageError::WriteError { .. }));
        assert!(!busy.is_not_found());
    }

    #[test]
    fn test_out_of_space_detection() {
        let err = StorageError::from_io(
            io_err(io::ErrorKind::Other, "No space left on device"),
            PathBuf::from("/full"),
        );
        assert!(matches!(err, StorageError::DiskFull { .. }));
    }

    #[test]
    fn test_recovery_suggestions() {
        let denied = StorageError::from_io(
            io_err(io::ErrorKind::PermissionDenied, "denied"),
            PathBuf::from("/notes.json"),
        );
        assert!(denied.recovery_suggestion().unwrap().contains("writable"));

        let missing = StorageError::NotFound {
            path: PathBuf::from("/notes"),
        };
        assert!(missing
            .recovery_suggestion()
            .unwrap()
            .contains("bootstrap init"));

        let shape = StorageError::InvalidFormat {
            path: PathBuf::from("/notes.json"),
            details: "expected an object".into(),
        };
        assert!(shape.recovery_suggestion().is_none());
    }

    #[test]
    fn test_corrupt_document_names_the_copy() {
        let err = StorageError::CorruptDocument {
            path: PathBuf::from("/data/notes.json"),
            backup_path: PathBuf::from("/data/notes.json.corrupt.backup"),
            details: "expected value at line 1 column 1".to_string(),
        };

        let msg = err.to_string();
        assert!(msg.contains("not valid JSON"));
        assert!(msg.contains("notes.json.corrupt.backup"));
    }
}
