//! Storage layer
//!
//! The whole store is one JSON document written atomically on every
//! mutation. There is no index and no write-ahead log; the in-memory map in
//! [`NoteStore`](crate::NoteStore) is the only query path.

pub mod error;
pub mod persistence;
pub mod schema;

pub use error::{StorageError, StorageResult};
pub use persistence::JsonPersistence;
pub use schema::{NotesDocument, StoredNote};
