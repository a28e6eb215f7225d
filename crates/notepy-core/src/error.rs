//! Note store errors

use thiserror::Error;
use uuid::Uuid;

use crate::storage::StorageError;

/// Errors returned by [`NoteStore`](crate::NoteStore) operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Input failed a shape or length check
    #[error("Validation failed: {0}")]
    Validation(String),

    /// No note with the given id
    #[error("Note not found: {0}")]
    NotFound(String),

    /// The tag is already on the note
    #[error("Tag '{tag}' is already on note {id}")]
    DuplicateTag { id: Uuid, tag: String },

    /// The tag is not on the note
    #[error("Tag '{tag}' not found on note {id}")]
    TagNotFound { id: Uuid, tag: String },

    /// Persisting or loading the notes document failed
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl StoreError {
    /// Stable machine-readable code used by the API envelope
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::Validation(_) => "VALIDATION_ERROR",
            StoreError::NotFound(_) => "NOT_FOUND",
            StoreError::DuplicateTag { .. } => "DUPLICATE_TAG",
            StoreError::TagNotFound { .. } => "TAG_NOT_FOUND",
            StoreError::Storage(_) => "IO_ERROR",
        }
    }

    pub(crate) fn not_found(id: Uuid) -> Self {
        StoreError::NotFound(id.to_string())
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
